//! Structural difference between two flat variables documents.
//!
//! The diff is read as "the edits that turn `local` into `remote`". Which of
//! those edits are actually applied, and in which direction, is decided by the
//! resolver, not here.

use std::collections::BTreeSet;

use crate::sync::types::{ConfigDocument, DiffEntry};

/// Compute the difference between `local` and `remote`.
///
/// Returns one entry per key that is missing on one side or whose values are
/// not structurally equal, sorted by key. Keys with equal values are omitted.
/// Callers that distinguish an absent document from an empty one must do so
/// before calling; both are an empty map here.
#[must_use]
pub fn diff(local: &ConfigDocument, remote: &ConfigDocument) -> Vec<DiffEntry> {
    let keys: BTreeSet<&String> = local.keys().chain(remote.keys()).collect();

    keys.into_iter()
        .filter_map(|key| match (local.get(key), remote.get(key)) {
            (Some(old), Some(new)) if old != new => Some(DiffEntry::Changed {
                key: key.clone(),
                old: old.clone(),
                new: new.clone(),
            }),
            (None, Some(value)) => Some(DiffEntry::Added {
                key: key.clone(),
                value: value.clone(),
            }),
            (Some(value), None) => Some(DiffEntry::Deleted {
                key: key.clone(),
                value: value.clone(),
            }),
            _ => None,
        })
        .collect()
}

/// Whether both documents hold the same keys with structurally equal values.
#[must_use]
pub fn equals(local: &ConfigDocument, remote: &ConfigDocument) -> bool {
    diff(local, remote).is_empty()
}

/// Apply one entry onto a working copy, moving it toward the remote side.
///
/// `Added` and `Changed` set the key to the remote value; `Deleted` removes it.
pub fn apply(doc: &mut ConfigDocument, entry: &DiffEntry) {
    match entry {
        DiffEntry::Added { key, value } | DiffEntry::Changed { key, new: value, .. } => {
            doc.insert(key.clone(), value.clone());
        }
        DiffEntry::Deleted { key, .. } => {
            doc.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> ConfigDocument {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_diff_identical_is_empty() {
        let a = doc(json!({"a": 1, "b": {"nested": [1, 2]}, "c": null}));
        assert!(diff(&a, &a).is_empty());
        assert!(equals(&a, &a));
    }

    #[test]
    fn test_diff_ignores_insertion_order() {
        let a = doc(json!({"x": 1, "y": 2}));
        let b = doc(json!({"y": 2, "x": 1}));
        assert!(equals(&a, &b));
    }

    #[test]
    fn test_diff_changed_and_added() {
        let local = doc(json!({"a": 1, "b": 2}));
        let remote = doc(json!({"a": 1, "b": 3, "c": 4}));

        let entries = diff(&local, &remote);
        assert_eq!(
            entries,
            vec![
                DiffEntry::Changed {
                    key: "b".into(),
                    old: json!(2),
                    new: json!(3)
                },
                DiffEntry::Added {
                    key: "c".into(),
                    value: json!(4)
                },
            ]
        );
    }

    #[test]
    fn test_diff_local_only_key_is_deleted() {
        let local = doc(json!({"only_here": "v"}));
        let remote = ConfigDocument::new();

        assert_eq!(
            diff(&local, &remote),
            vec![DiffEntry::Deleted {
                key: "only_here".into(),
                value: json!("v")
            }]
        );
    }

    #[test]
    fn test_diff_uses_structural_equality() {
        let local = doc(json!({"k": {"a": [1, 2], "b": true}}));
        let same = doc(json!({"k": {"b": true, "a": [1, 2]}}));
        let other = doc(json!({"k": {"a": [2, 1], "b": true}}));

        assert!(equals(&local, &same));
        assert_eq!(diff(&local, &other).len(), 1);
    }

    #[test]
    fn test_diff_type_change_is_a_change() {
        let local = doc(json!({"port": 8080}));
        let remote = doc(json!({"port": "8080"}));
        assert!(matches!(diff(&local, &remote)[0], DiffEntry::Changed { .. }));
    }

    #[test]
    fn test_diff_is_sorted_by_key() {
        let local = doc(json!({"z": 1, "m": 1, "a": 1}));
        let remote = doc(json!({"b": 2}));
        let keys: Vec<_> = diff(&local, &remote)
            .iter()
            .map(|e| e.key().to_string())
            .collect();
        assert_eq!(keys, vec!["a", "b", "m", "z"]);
    }

    #[test]
    fn test_diff_reversed_swaps_roles() {
        let a = doc(json!({"a": 1, "b": 2, "d": 5}));
        let b = doc(json!({"a": 1, "b": 3, "c": 4}));

        let forward = diff(&a, &b);
        let backward = diff(&b, &a);

        let forward_keys: Vec<_> = forward.iter().map(DiffEntry::key).collect();
        let backward_keys: Vec<_> = backward.iter().map(DiffEntry::key).collect();
        assert_eq!(forward_keys, backward_keys);

        for (f, r) in forward.iter().zip(&backward) {
            match (f, r) {
                (
                    DiffEntry::Changed { old, new, .. },
                    DiffEntry::Changed {
                        old: r_old,
                        new: r_new,
                        ..
                    },
                ) => {
                    assert_eq!(old, r_new);
                    assert_eq!(new, r_old);
                }
                (DiffEntry::Added { value, .. }, DiffEntry::Deleted { value: r, .. })
                | (DiffEntry::Deleted { value, .. }, DiffEntry::Added { value: r, .. }) => {
                    assert_eq!(value, r);
                }
                other => panic!("unexpected pair {other:?}"),
            }
        }
    }

    #[test]
    fn test_applying_every_entry_reaches_remote() {
        let local = doc(json!({"a": 1, "b": 2, "gone": true}));
        let remote = doc(json!({"a": 1, "b": 3, "c": [4]}));

        let mut working = local.clone();
        for entry in diff(&local, &remote) {
            apply(&mut working, &entry);
        }
        assert!(equals(&working, &remote));
    }
}
