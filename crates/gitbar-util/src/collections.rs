//! Keyed deduplication and grouping over arbitrary sequences.

use std::collections::HashSet;
use std::hash::Hash;

use indexmap::IndexMap;

/// Deduplicate by derived key, keeping the first occurrence of each key.
///
/// Output order follows input order; later elements whose key was already
/// seen are dropped.
pub fn uniq_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key_fn: F) -> Vec<T>
where
    K: Hash + Eq,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for item in items {
        if seen.insert(key_fn(&item)) {
            unique.push(item);
        }
    }
    unique
}

/// Group elements by derived key, preserving input order within each group.
///
/// Key order happens to be first-seen order; callers must not rely on it.
pub fn group_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key_fn: F) -> IndexMap<K, Vec<T>>
where
    K: Hash + Eq,
    F: FnMut(&T) -> K,
{
    let mut groups: IndexMap<K, Vec<T>> = IndexMap::new();
    for item in items {
        groups.entry(key_fn(&item)).or_default().push(item);
    }
    groups
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn uniq_by_keeps_first_occurrence_per_key() {
        let input = vec!["apple", "avocado", "banana", "blueberry", "cherry"];
        let unique = uniq_by(input, |s| s.as_bytes()[0]);
        assert_eq!(unique, vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn uniq_by_is_order_stable_and_never_grows() {
        let input = vec![3, 1, 4, 1, 5, 9, 2, 6, 5, 3];
        let unique = uniq_by(input.clone(), |n| *n);
        assert_eq!(unique, vec![3, 1, 4, 5, 9, 2, 6]);
        assert!(unique.len() <= input.len());
    }

    #[test]
    fn uniq_by_on_empty_input() {
        let unique = uniq_by(Vec::<i32>::new(), |n| *n);
        assert!(unique.is_empty());
    }

    #[test]
    fn group_by_preserves_order_within_groups() {
        let input = vec![1, 2, 3, 4, 5, 6];
        let groups = group_by(input, |n| n % 2);
        assert_eq!(groups[&1], vec![1, 3, 5]);
        assert_eq!(groups[&0], vec![2, 4, 6]);
    }

    #[test]
    fn group_by_union_reproduces_the_input_multiset() {
        let input = vec!["ant", "bee", "asp", "cow", "bat", "ant"];
        let groups = group_by(input.clone(), |s| s.as_bytes()[0]);

        let mut recovered: Vec<&str> = groups.values().flatten().copied().collect();
        let mut expected = input;
        recovered.sort_unstable();
        expected.sort_unstable();
        assert_eq!(recovered, expected);
    }

    #[test]
    fn group_by_singleton_groups() {
        let groups = group_by(vec![10, 20], |n| *n);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&10], vec![10]);
        assert_eq!(groups[&20], vec![20]);
    }
}
