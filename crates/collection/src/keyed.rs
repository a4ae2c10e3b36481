//! Immutable ordered collections keyed by a declared identity field.
//!
//! Items are plain JSON records as returned by the API (benefits, leave
//! periods, documents). Every mutating operation takes `&self` and
//! returns a new collection; the receiver is never modified, so the UI
//! state layer can detect change by identity comparison alone.
//!
//! Two invariants hold across all operations: identity values are unique
//! within a collection (enforced by the strict operations), and insertion
//! order is significant and preserved by everything that does not
//! explicitly reorder.

use serde_json::Value;

use crate::error::CollectionError;

/// An ordered list of JSON records, each identified by the value of the
/// collection's identity field (e.g. `"employer_benefit_id"`).
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedCollection {
    id_key: String,
    items: Vec<Value>,
}

impl KeyedCollection {
    /// An empty collection keyed by `id_key`.
    pub fn new(id_key: impl Into<String>) -> Self {
        KeyedCollection {
            id_key: id_key.into(),
            items: Vec::new(),
        }
    }

    /// Build a collection from an API response payload, enforcing the
    /// same identity checks as [`KeyedCollection::add_items`].
    pub fn from_items(
        id_key: impl Into<String>,
        items: Vec<Value>,
    ) -> Result<Self, CollectionError> {
        KeyedCollection::new(id_key).add_items(items)
    }

    pub fn id_key(&self) -> &str {
        &self.id_key
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Identity values in item order.
    pub fn ids(&self) -> Vec<&Value> {
        self.items
            .iter()
            .filter_map(|item| self.identity(item))
            .collect()
    }

    /// Linear lookup by identity value. Absence is not an error.
    pub fn get_item(&self, id: &Value) -> Option<&Value> {
        self.position(id).map(|pos| &self.items[pos])
    }

    /// Append one item. Strict: the item must carry a non-null identity
    /// value not already present.
    pub fn add_item(&self, item: Value) -> Result<Self, CollectionError> {
        let id = self
            .identity(&item)
            .ok_or_else(|| CollectionError::MissingIdentity {
                key: self.id_key.clone(),
            })?;
        if self.position(id).is_some() {
            return Err(CollectionError::DuplicateIdentity {
                key: self.id_key.clone(),
                id: id.to_string(),
            });
        }
        let mut items = self.items.clone();
        items.push(item);
        Ok(self.with_items(items))
    }

    /// Append several items in order, with per-item identity checks.
    pub fn add_items(&self, items: Vec<Value>) -> Result<Self, CollectionError> {
        let mut next = self.clone();
        for item in items {
            next = next.add_item(item)?;
        }
        Ok(next)
    }

    /// Replace the matching item positionally with the shallow merge of
    /// the existing fields and the incoming (partial or full) item.
    /// Strict: the incoming item must carry an identity value that
    /// matches an existing item.
    pub fn update_item(&self, item: Value) -> Result<Self, CollectionError> {
        let id = self
            .identity(&item)
            .ok_or_else(|| CollectionError::MissingIdentity {
                key: self.id_key.clone(),
            })?;
        let pos = self.position(id).ok_or_else(|| CollectionError::NotFound {
            key: self.id_key.clone(),
            id: id.to_string(),
        })?;
        let mut items = self.items.clone();
        let merged = shallow_merge(&items[pos], &item);
        items[pos] = merged;
        Ok(self.with_items(items))
    }

    /// Remove the item with the given identity; order of the remainder is
    /// preserved. Strict: absence is an error.
    pub fn remove_item(&self, id: &Value) -> Result<Self, CollectionError> {
        let pos = self.position(id).ok_or_else(|| CollectionError::NotFound {
            key: self.id_key.clone(),
            id: id.to_string(),
        })?;
        let mut items = self.items.clone();
        items.remove(pos);
        Ok(self.with_items(items))
    }

    /// Upsert: merge over the matching item in place, or append when no
    /// item matches (or the item carries no identity). The tolerant
    /// variant used by amendment forms; never errors.
    pub fn set_item(&self, item: Value) -> Self {
        match self.identity(&item).and_then(|id| self.position(id)) {
            Some(pos) => {
                let mut items = self.items.clone();
                let merged = shallow_merge(&items[pos], &item);
                items[pos] = merged;
                self.with_items(items)
            }
            None => {
                let mut items = self.items.clone();
                items.push(item);
                self.with_items(items)
            }
        }
    }

    /// Upsert several items in order.
    pub fn set_items(&self, items: Vec<Value>) -> Self {
        let mut next = self.clone();
        for item in items {
            next = next.set_item(item);
        }
        next
    }

    /// The identity value of an item, treating JSON null as absent.
    fn identity<'a>(&self, item: &'a Value) -> Option<&'a Value> {
        match item.get(&self.id_key) {
            None | Some(Value::Null) => None,
            Some(id) => Some(id),
        }
    }

    fn position(&self, id: &Value) -> Option<usize> {
        if id.is_null() {
            return None;
        }
        self.items
            .iter()
            .position(|item| item.get(&self.id_key) == Some(id))
    }

    fn with_items(&self, items: Vec<Value>) -> Self {
        KeyedCollection {
            id_key: self.id_key.clone(),
            items,
        }
    }
}

/// Shallow merge of two JSON records: every top-level field of `patch`
/// overwrites the corresponding field of `base`; fields of `base` not
/// named by `patch` are left untouched. Non-object inputs yield the
/// patch.
pub fn shallow_merge(base: &Value, patch: &Value) -> Value {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            let mut merged = base.clone();
            for (key, value) in patch {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_tests() -> KeyedCollection {
        KeyedCollection::from_items(
            "testId",
            vec![json!({ "testId": "123" }), json!({ "testId": "456" })],
        )
        .unwrap()
    }

    #[test]
    fn get_item_finds_by_identity() {
        let collection = two_tests();
        assert_eq!(
            collection.get_item(&json!("456")),
            Some(&json!({ "testId": "456" }))
        );
        assert_eq!(collection.get_item(&json!("000")), None);
    }

    #[test]
    fn add_preserves_order_and_rejects_duplicates() {
        let collection = two_tests();
        let next = collection.add_item(json!({ "testId": "789" })).unwrap();
        assert_eq!(
            next.ids(),
            vec![&json!("123"), &json!("456"), &json!("789")]
        );

        assert_eq!(
            next.add_item(json!({ "testId": "456" })).unwrap_err(),
            CollectionError::DuplicateIdentity {
                key: "testId".to_string(),
                id: "\"456\"".to_string(),
            }
        );
    }

    #[test]
    fn add_requires_an_identity_value() {
        let collection = KeyedCollection::new("testId");
        assert_eq!(
            collection.add_item(json!({ "name": "x" })).unwrap_err(),
            CollectionError::MissingIdentity {
                key: "testId".to_string()
            }
        );
        assert_eq!(
            collection
                .add_item(json!({ "testId": null }))
                .unwrap_err(),
            CollectionError::MissingIdentity {
                key: "testId".to_string()
            }
        );
    }

    #[test]
    fn remove_excises_one_item_and_errors_on_absence() {
        let collection = two_tests();
        let next = collection.remove_item(&json!("456")).unwrap();
        assert_eq!(next.items(), &[json!({ "testId": "123" })]);

        assert_eq!(
            collection.remove_item(&json!("000")).unwrap_err(),
            CollectionError::NotFound {
                key: "testId".to_string(),
                id: "\"000\"".to_string(),
            }
        );
    }

    #[test]
    fn update_merges_partially_and_keeps_position() {
        let collection = KeyedCollection::from_items(
            "benefit_id",
            vec![
                json!({ "benefit_id": "a", "amount": 100, "frequency": "weekly" }),
                json!({ "benefit_id": "b", "amount": 200 }),
            ],
        )
        .unwrap();

        let next = collection
            .update_item(json!({ "benefit_id": "a", "amount": 150 }))
            .unwrap();
        assert_eq!(
            next.items()[0],
            json!({ "benefit_id": "a", "amount": 150, "frequency": "weekly" })
        );
        assert_eq!(next.items()[1], collection.items()[1]);

        assert_eq!(
            collection
                .update_item(json!({ "benefit_id": "zzz" }))
                .unwrap_err(),
            CollectionError::NotFound {
                key: "benefit_id".to_string(),
                id: "\"zzz\"".to_string(),
            }
        );
    }

    #[test]
    fn set_item_upserts_without_errors() {
        let collection = two_tests();

        let updated = collection.set_item(json!({ "testId": "123", "name": "first" }));
        assert_eq!(
            updated.items()[0],
            json!({ "testId": "123", "name": "first" })
        );
        assert_eq!(updated.len(), 2);

        let appended = collection.set_item(json!({ "testId": "789" }));
        assert_eq!(appended.len(), 3);
        assert_eq!(appended.items()[2], json!({ "testId": "789" }));

        // No identity: appended as-is, still no error.
        let tolerant = collection.set_item(json!({ "name": "draft" }));
        assert_eq!(tolerant.len(), 3);
    }

    #[test]
    fn operations_never_mutate_the_receiver() {
        let collection = two_tests();
        let snapshot = collection.clone();

        let _ = collection.add_item(json!({ "testId": "789" })).unwrap();
        let _ = collection
            .update_item(json!({ "testId": "123", "name": "x" }))
            .unwrap();
        let _ = collection.remove_item(&json!("456")).unwrap();
        let _ = collection.set_item(json!({ "testId": "456", "name": "y" }));

        assert_eq!(collection, snapshot);
    }

    #[test]
    fn update_and_set_preserve_identity_order() {
        let collection = KeyedCollection::from_items(
            "id",
            vec![
                json!({ "id": "a" }),
                json!({ "id": "b" }),
                json!({ "id": "c" }),
            ],
        )
        .unwrap();

        let next = collection
            .update_item(json!({ "id": "b", "touched": true }))
            .unwrap()
            .set_item(json!({ "id": "a", "touched": true }));
        assert_eq!(next.ids(), vec![&json!("a"), &json!("b"), &json!("c")]);
    }

    #[test]
    fn is_empty_reflects_item_count() {
        assert!(KeyedCollection::new("id").is_empty());
        assert!(!two_tests().is_empty());
    }
}
