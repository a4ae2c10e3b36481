//! claimflow-collection -- immutable identity-keyed collections for the
//! portal's sub-resource lists (benefits, leave periods, documents).
//!
//! The API returns these lists piecemeal; the UI reconciles each edit by
//! producing a fresh collection value and comparing identities to decide
//! what re-renders. Strict operations guard the identity invariants;
//! tolerant upserts and amendment merges absorb speculative edits from
//! shared form reducers.

pub mod amendment;
pub mod error;
pub mod keyed;

pub use amendment::{update_amendments, update_amendments_with_key, KNOWN_IDENTITY_KEYS};
pub use error::CollectionError;
pub use keyed::{shallow_merge, KeyedCollection};
