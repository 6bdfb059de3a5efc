//! In-memory document store adapter.
//!
//! Stands in for the hosted document database during development and tests.
//! Collections preserve insertion order so `list_all` matches the contract's
//! "storage order" wording, and array fields touched by set operations behave
//! as sets: adds never duplicate, removes of absent values are no-ops.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ports::{
    Document, DocumentFields, DocumentStore, DocumentStoreError, MergePolicy, SetOp,
};

type Collection = Vec<(String, DocumentFields)>;

/// Process-local [`DocumentStore`] implementation.
///
/// The lock is held only across synchronous map operations, never across an
/// await point, so each call is one serialised mutation exactly like a single
/// document write against the real store.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_set_op(array: &mut Vec<Value>, op: SetOp, value: Value) {
        match op {
            SetOp::AddToSet => {
                if !array.contains(&value) {
                    array.push(value);
                }
            }
            SetOp::RemoveFromSet => {
                array.retain(|existing| existing != &value);
            }
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let document = collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|(key, _)| key == id)
                .map(|(key, fields)| Document {
                    id: key.clone(),
                    fields: fields.clone(),
                })
        });
        Ok(document)
    }

    async fn put(
        &self,
        collection: &str,
        id: &str,
        fields: DocumentFields,
        policy: MergePolicy,
    ) -> Result<(), DocumentStoreError> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let documents = collections.entry(collection.to_owned()).or_default();

        match documents.iter_mut().find(|(key, _)| key == id) {
            Some((_, existing)) => match policy {
                MergePolicy::Overwrite => *existing = fields,
                MergePolicy::Merge => {
                    for (key, value) in fields {
                        existing.insert(key, value);
                    }
                }
            },
            None => documents.push((id.to_owned(), fields)),
        }
        Ok(())
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        op: SetOp,
        value: Value,
    ) -> Result<(), DocumentStoreError> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let Some((_, fields)) = collections
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|(key, _)| key == id))
        else {
            return Err(DocumentStoreError::not_found(collection, id));
        };

        let entry = fields
            .entry(field.to_owned())
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(array) = entry else {
            return Err(DocumentStoreError::serialization(format!(
                "field {field} of {collection}/{id} is not an array"
            )));
        };
        Self::apply_set_op(array, op, value);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), DocumentStoreError> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(documents) = collections.get_mut(collection) {
            documents.retain(|(key, _)| key != id);
        }
        Ok(())
    }

    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, DocumentStoreError> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let documents = collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(key, fields)| Document {
                        id: key.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(documents)
    }
}
