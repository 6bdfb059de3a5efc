//! Port abstraction over the hosted document database.
//!
//! This is the external collaborator the whole system delegates persistence
//! to: a key-value document store with field-level set operations. No
//! cross-document transaction is assumed; callers must express each mutation
//! as a single-document operation and set fields must be updated through the
//! commutative [`SetOp`]s rather than whole-value replacement.

use async_trait::async_trait;
use serde_json::Value;

/// Field map of one stored document.
pub type DocumentFields = serde_json::Map<String, Value>;

/// A document returned by reads, carrying its store key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Store key within the collection.
    pub id: String,
    /// Field map as stored.
    pub fields: DocumentFields,
}

/// Write behaviour for [`DocumentStore::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Replace the whole document.
    Overwrite,
    /// Overlay the given fields, preserving any the caller did not name.
    Merge,
}

/// Commutative set mutation for [`DocumentStore::update_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    /// Add the value unless already present.
    AddToSet,
    /// Remove the value if present.
    RemoveFromSet,
}

/// Errors raised by document store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentStoreError {
    /// The store could not be reached or refused service transiently.
    #[error("document store unavailable: {message}")]
    Unavailable {
        /// Adapter-supplied diagnostic.
        message: String,
    },
    /// A field-level update targeted a document that does not exist.
    #[error("document {collection}/{id} not found")]
    NotFound {
        /// Collection name.
        collection: String,
        /// Document key.
        id: String,
    },
    /// Stored bytes could not be decoded, or a value could not be encoded.
    #[error("document serialisation failed: {message}")]
    Serialization {
        /// Adapter-supplied diagnostic.
        message: String,
    },
}

impl DocumentStoreError {
    /// Build an [`DocumentStoreError::Unavailable`] error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Build a [`DocumentStoreError::NotFound`] error.
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Build a [`DocumentStoreError::Serialization`] error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

/// Abstract contract of the hosted document database.
///
/// # Semantics
///
/// - `get` returns `Ok(None)` for a missing document; only transport-level
///   failures are errors.
/// - `put` with [`MergePolicy::Merge`] overlays the named fields and preserves
///   the rest, enabling non-destructive profile upserts.
/// - `update_field` applies a [`SetOp`] to an array-valued field treated as a
///   set: duplicates are never introduced and removing an absent value is a
///   no-op. It fails with [`DocumentStoreError::NotFound`] when the document
///   itself is missing.
/// - `delete` is idempotent; deleting an absent document succeeds.
/// - `list_all` returns a full snapshot in storage order, which is not
///   semantically meaningful.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by key.
    async fn get(&self, collection: &str, id: &str)
    -> Result<Option<Document>, DocumentStoreError>;

    /// Create or update one document.
    async fn put(
        &self,
        collection: &str,
        id: &str,
        fields: DocumentFields,
        policy: MergePolicy,
    ) -> Result<(), DocumentStoreError>;

    /// Apply a commutative set operation to one array-valued field.
    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        op: SetOp,
        value: Value,
    ) -> Result<(), DocumentStoreError>;

    /// Remove one document; succeeds even when absent.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), DocumentStoreError>;

    /// Snapshot every document in a collection.
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, DocumentStoreError>;
}
