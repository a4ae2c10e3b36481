/// All errors returned by the strict keyed-collection operations
/// (`add_item`, `update_item`, `remove_item`). The tolerant upsert
/// operations (`set_item`, `set_items`) never return these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    /// The incoming item carries no value for the collection's identity
    /// field (absent or JSON null).
    #[error("item is missing identity field '{key}'")]
    MissingIdentity { key: String },

    /// An item with this identity value already exists in the collection.
    #[error("duplicate identity {id} for key '{key}'")]
    DuplicateIdentity { key: String, id: String },

    /// No item with this identity value exists in the collection.
    #[error("no item with identity {id} for key '{key}'")]
    NotFound { key: String, id: String },
}
