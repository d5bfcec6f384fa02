//! Textual path containment. No filesystem access, no symlink resolution.

/// True when `descendant` equals `parent` or sits beneath it.
///
/// Pure string-prefix test: the parent is normalized to end with exactly
/// one separator, then checked as a prefix of the descendant. Paths with
/// a drive-letter prefix (`C:\`) use `\` and compare case-insensitively;
/// everything else uses `/` and compares case-sensitively.
pub fn is_descendant(parent: &str, descendant: &str) -> bool {
    if parent == descendant {
        return true;
    }

    if is_drive_path(parent) {
        let mut prefix = parent.trim_end_matches('\\').to_lowercase();
        prefix.push('\\');
        descendant.to_lowercase().starts_with(&prefix)
    } else {
        let mut prefix = parent.trim_end_matches('/').to_owned();
        prefix.push('/');
        descendant.starts_with(&prefix)
    }
}

/// Drive-letter prefix check (`C:\`, `d:\`, ...).
fn is_drive_path(path: &str) -> bool {
    matches!(path.as_bytes(), [letter, b':', b'\\', ..] if letter.is_ascii_alphabetic())
}
