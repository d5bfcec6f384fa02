//! Relative-date rendering with calendar month/year boundaries.

use chrono::{DateTime, Months, Utc};

/// Relative-time string for `date` against the current instant.
///
/// Under one calendar month: a short relative phrase ("3 days ago").
/// Under one calendar year: `"on <Mon D>"`. Older: `"on <Mon D, YYYY>"`.
pub fn date_from_now(date: DateTime<Utc>) -> String {
    date_from(date, Utc::now())
}

/// Deterministic form of [`date_from_now`] for rendering at a fixed instant.
pub fn date_from(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let within = |months: u32| {
        now.checked_sub_months(Months::new(months))
            .is_none_or(|cutoff| date > cutoff)
    };

    if within(1) {
        relative_phrase(date, now)
    } else if within(12) {
        format!("on {}", date.format("%b %-d"))
    } else {
        format!("on {}", date.format("%b %-d, %Y"))
    }
}

fn relative_phrase(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    // Future dates clamp to "just now" rather than counting backwards.
    let secs = now.signed_duration_since(date).num_seconds().max(0);
    if secs < 60 {
        "just now".to_owned()
    } else if secs < 3_600 {
        unit_phrase(secs / 60, "minute")
    } else if secs < 86_400 {
        unit_phrase(secs / 3_600, "hour")
    } else {
        unit_phrase(secs / 86_400, "day")
    }
}

fn unit_phrase(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
