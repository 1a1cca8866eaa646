use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::filter::{FilterError, Predicate, Projection, Query};

/// A stored record: a flat JSON object carrying `_id`, `createdAt` and `updatedAt`.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";
pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Duplicate value for unique field: {0}")]
    Conflict(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Collection-oriented storage the resource handlers run against.
///
/// Identifiers are UUID strings; an identifier that does not parse simply
/// matches nothing.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create the collection if needed, with a case-insensitive unique
    /// constraint on `unique` when given.
    async fn ensure_collection(&self, collection: &str, unique: Option<&str>) -> Result<(), StoreError>;

    async fn find(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn count(&self, collection: &str, predicates: &[Predicate]) -> Result<u64, StoreError>;

    /// Stamp and store a new document, returning it as stored.
    async fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError>;

    /// Shallow-merge `changes` into the document. `None` when it does not exist.
    async fn update(&self, collection: &str, id: &str, changes: Document) -> Result<Option<Document>, StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn close(&self);
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Assign identifier and timestamps to a document about to be inserted.
pub fn stamp_new(mut document: Document) -> Document {
    let stamp = now();
    document.insert(ID_FIELD.to_string(), Value::String(Uuid::new_v4().to_string()));
    document.insert(CREATED_AT.to_string(), Value::String(stamp.clone()));
    document.insert(UPDATED_AT.to_string(), Value::String(stamp));
    document
}

/// Drop fields an update may not touch and refresh `updatedAt`.
pub fn stamp_update(mut changes: Document) -> Document {
    changes.remove(ID_FIELD);
    changes.remove(CREATED_AT);
    changes.insert(UPDATED_AT.to_string(), Value::String(now()));
    changes
}

/// Apply a field projection. `_id` survives every projection.
pub fn apply_projection(document: Document, projection: &Projection) -> Document {
    match projection {
        Projection::Exclude(fields) => document
            .into_iter()
            .filter(|(key, _)| key == ID_FIELD || !fields.iter().any(|f| f == key))
            .collect(),
        Projection::Include(fields) => document
            .into_iter()
            .filter(|(key, _)| key == ID_FIELD || fields.iter().any(|f| f == key))
            .collect(),
    }
}
