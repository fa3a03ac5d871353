//! Identity-aware three-way merge for record collections.
//!
//! Invoked out-of-band by a git merge-driver collaborator when two branches
//! touch the same record file. Two merge shapes are provided:
//!
//! - identity-union merge for append-mostly record arrays (notes, todos,
//!   tasks): "ours" is authoritative for any identity present in both
//!   branches; no field-level reconciliation is attempted
//! - set-union merge for unordered scalar arrays (tags)
//!
//! Neither operation has a failure path; both always produce a result. True
//! semantic conflicts (same identity, divergent content on both sides) are
//! deliberately not detected at this layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Merge two versions of an ordered, identity-tagged record array.
///
/// The result is every record from `ours` in its original order, followed by
/// records whose identity appears only in `theirs`, in their original
/// relative order. A record in `theirs` sharing an identity with `ours` is
/// dropped: ours' content wins wholesale. Records deleted in one branch and
/// untouched in the other disappear with the branch that dropped them.
///
/// `base` is accepted for merge-driver signature compatibility but is not
/// consulted by this operation.
///
/// A record without a string `id` never matches by identity; ours' copies
/// stay in place and theirs' copies are appended.
pub fn merge_ulid_arrays(_base: &[Value], ours: &[Value], theirs: &[Value]) -> Vec<Value> {
    let our_ids: HashSet<&str> = ours.iter().filter_map(record_id).collect();

    let mut merged: Vec<Value> = ours.to_vec();
    for record in theirs {
        match record_id(record) {
            Some(id) if our_ids.contains(id) => {}
            _ => merged.push(record.clone()),
        }
    }
    merged
}

/// Merge two versions of an unordered scalar array as a set union.
///
/// Duplicates are removed; the result order is first-seen (ours before
/// theirs) so repeated merges are deterministic, though callers must not
/// rely on any particular order. `base` is unused.
pub fn merge_set_array(ours: &[String], theirs: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::new();
    for value in ours.iter().chain(theirs.iter()) {
        if seen.insert(value.as_str()) {
            merged.push(value.clone());
        }
    }
    merged
}

/// Presence-derived deletion/modification signal for one identity.
///
/// The `modified_*` flags only record presence in base and the named branch;
/// they perform no content comparison. That is a known gap carried over
/// deliberately - a content-diff layer would sit on top of this signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionSignal {
    /// Present in base and theirs, absent in ours
    pub deleted_in_ours: bool,

    /// Present in base and ours, absent in theirs
    pub deleted_in_theirs: bool,

    /// Present in both base and ours (presence only, no content diff)
    pub modified_in_ours: bool,

    /// Present in both base and theirs (presence only, no content diff)
    pub modified_in_theirs: bool,
}

/// Compute the deletion/modification signal for one identity given the
/// presence sets of the three versions.
pub fn detect_deletion(
    identity: &str,
    base: &HashSet<String>,
    ours: &HashSet<String>,
    theirs: &HashSet<String>,
) -> DeletionSignal {
    let in_base = base.contains(identity);
    let in_ours = ours.contains(identity);
    let in_theirs = theirs.contains(identity);

    DeletionSignal {
        deleted_in_ours: in_base && in_theirs && !in_ours,
        deleted_in_theirs: in_base && in_ours && !in_theirs,
        modified_in_ours: in_base && in_ours,
        modified_in_theirs: in_base && in_theirs,
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}
