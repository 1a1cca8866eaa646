use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::store::{apply_projection, stamp_new, stamp_update, Document, DocumentStore, StoreError, ID_FIELD};
use crate::filter::{FilterError, FilterOp, Predicate, Query, SortDirection, SortKey};

#[derive(Debug, Default)]
struct Collection {
    unique: Option<String>,
    documents: Vec<Document>,
}

impl Collection {
    fn position(&self, id: &str) -> Option<usize> {
        self.documents
            .iter()
            .position(|d| d.get(ID_FIELD).and_then(Value::as_str) == Some(id))
    }

    /// Case-insensitive uniqueness of `candidate` against every other document.
    fn check_unique(&self, candidate: &Document) -> Result<(), StoreError> {
        let Some(field) = self.unique.as_deref() else {
            return Ok(());
        };
        let Some(value) = candidate.get(field).and_then(Value::as_str) else {
            return Ok(());
        };
        let value = value.to_lowercase();
        let own_id = candidate.get(ID_FIELD);
        let taken = self.documents.iter().any(|d| {
            d.get(ID_FIELD) != own_id
                && d.get(field).and_then(Value::as_str).map(str::to_lowercase).as_deref() == Some(value.as_str())
        });
        if taken {
            Err(StoreError::Conflict(field.to_string()))
        } else {
            Ok(())
        }
    }
}

/// In-process store with the same query semantics as the Postgres one.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_operators(predicates: &[Predicate]) -> Result<(), StoreError> {
    match predicates.iter().find(|p| matches!(p.op, FilterOp::Other(_))) {
        Some(p) => Err(FilterError::UnsupportedOperator(p.op.as_str().to_string()).into()),
        None => Ok(()),
    }
}

fn matches(document: &Document, predicate: &Predicate) -> bool {
    let Some(stored) = document.get(&predicate.field) else {
        return false;
    };
    if predicate.op == FilterOp::IEq {
        return stored
            .as_str()
            .map(|s| s.to_lowercase() == predicate.value.to_lowercase())
            .unwrap_or(false);
    }
    let ordering = match (stored, predicate.typed_value()) {
        (Value::String(s), _) => Some(s.as_str().cmp(predicate.value.as_str())),
        (Value::Number(n), Some(Value::Number(m))) => n.as_f64().zip(m.as_f64()).and_then(|(a, b)| a.partial_cmp(&b)),
        (Value::Bool(a), Some(Value::Bool(b))) => Some(a.cmp(&b)),
        _ => None,
    };
    ordering.map(|o| predicate.op.accepts(o)).unwrap_or(false)
}

/// Cross-type rank, following the JSONB ordering Postgres applies.
fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::String(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::Bool(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn compare_documents(a: &Document, b: &Document, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = compare_values(a.get(&key.field), b.get(&key.field));
        let ordering = match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    compare_values(a.get(ID_FIELD), b.get(ID_FIELD))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_collection(&self, collection: &str, unique: Option<&str>) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_default();
        entry.unique = unique.map(str::to_string);
        Ok(())
    }

    async fn find(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        check_operators(&query.predicates)?;
        let collections = self.collections.read().await;
        let Some(collection) = collections.get(&query.collection) else {
            return Ok(vec![]);
        };

        let mut found: Vec<&Document> = collection
            .documents
            .iter()
            .filter(|d| query.predicates.iter().all(|p| matches(d, p)))
            .collect();
        found.sort_by(|a, b| compare_documents(a, b, &query.sort));

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let take = query
            .take
            .map(|t| usize::try_from(t).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        Ok(found
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|d| apply_projection(d.clone(), &query.projection))
            .collect())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|c| c.position(id).map(|i| c.documents[i].clone())))
    }

    async fn count(&self, collection: &str, predicates: &[Predicate]) -> Result<u64, StoreError> {
        check_operators(predicates)?;
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map(|c| c.documents.iter().filter(|d| predicates.iter().all(|p| matches(d, p))).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError> {
        let document = stamp_new(document);
        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_default();
        entry.check_unique(&document)?;
        entry.documents.push(document.clone());
        Ok(document)
    }

    async fn update(&self, collection: &str, id: &str, changes: Document) -> Result<Option<Document>, StoreError> {
        let changes = stamp_update(changes);
        let mut collections = self.collections.write().await;
        let Some(entry) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(index) = entry.position(id) else {
            return Ok(None);
        };
        let mut merged = entry.documents[index].clone();
        merged.extend(changes);
        entry.check_unique(&merged)?;
        entry.documents[index] = merged.clone();
        Ok(Some(merged))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|c| c.position(id).map(|i| c.documents.remove(i))))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {}
}
