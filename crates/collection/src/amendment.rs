//! Amendment merging: leave-administrator corrections to
//! claimant-submitted sub-resources (benefits, previous leaves,
//! concurrent leaves, change requests).
//!
//! An amendment is a partial record carrying the identity field of its
//! target collection. The amendment forms for the different sub-resource
//! types share one reducer, so the patch itself declares which collection
//! it targets by which identity key it carries -- and a patch aimed at a
//! different collection (or at an entry that no longer exists) is a
//! silent no-op, not an error, because the forms call this speculatively
//! on every keystroke.

use serde_json::Value;

use crate::keyed::shallow_merge;

/// Identity fields recognized on an amendment patch, checked in order.
pub const KNOWN_IDENTITY_KEYS: &[&str] = &[
    "employer_benefit_id",
    "previous_leave_id",
    "concurrent_leave_id",
    "change_request_id",
];

/// Apply an amendment to a list of sub-resources, picking the identity
/// key from [`KNOWN_IDENTITY_KEYS`]. Returns a new vector; when no
/// recognized key is present on the patch the contents are unchanged.
pub fn update_amendments(existing: &[Value], patch: &Value) -> Vec<Value> {
    match KNOWN_IDENTITY_KEYS
        .iter()
        .find(|key| !matches!(patch.get(**key), None | Some(Value::Null)))
    {
        Some(key) => update_amendments_with_key(existing, patch, key),
        None => existing.to_vec(),
    }
}

/// Apply an amendment using a caller-supplied identity key.
///
/// The one entry whose identity matches the patch's is replaced by the
/// shallow merge of its fields with the patch's fields (patch wins on
/// conflict, untouched fields are preserved exactly); every other entry
/// is carried over unchanged. No match: the contents are returned
/// unchanged in a new vector.
pub fn update_amendments_with_key(existing: &[Value], patch: &Value, id_key: &str) -> Vec<Value> {
    let patch_id = match patch.get(id_key) {
        None | Some(Value::Null) => return existing.to_vec(),
        Some(id) => id,
    };
    existing
        .iter()
        .map(|item| {
            if item.get(id_key) == Some(patch_id) {
                shallow_merge(item, patch)
            } else {
                item.clone()
            }
        })
        .collect()
}
