use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;

use super::store::{Document, DocumentStore, StoreError, ID_FIELD};
use crate::entities::EntitySpec;
use crate::filter::{FilterOp, Predicate, Query};

/// Entity-aware access to one collection: hides protected fields and resolves
/// references on everything it hands out.
pub struct Repository {
    spec: &'static EntitySpec,
    store: Arc<dyn DocumentStore>,
}

impl Repository {
    pub fn new(spec: &'static EntitySpec, store: Arc<dyn DocumentStore>) -> Self {
        Self { spec, store }
    }

    pub fn spec(&self) -> &'static EntitySpec {
        self.spec
    }

    /// Base query against this entity's collection.
    pub fn query(&self) -> Query {
        Query::new(self.spec.collection)
    }

    pub async fn select_any(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let documents = self.store.find(query).await?;
        self.present(documents).await
    }

    /// Size of the whole collection, independent of any filter.
    pub async fn count_all(&self) -> Result<u64, StoreError> {
        self.store.count(self.spec.collection, &[]).await
    }

    pub async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.store.find_by_id(self.spec.collection, id).await?.is_some())
    }

    pub async fn select_one(&self, id: &str) -> Result<Option<Document>, StoreError> {
        match self.store.find_by_id(self.spec.collection, id).await? {
            Some(document) => Ok(self.present(vec![document]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Whether another document already holds `value` in the unique field,
    /// compared case-insensitively. `except_id` excludes the document being updated.
    pub async fn exists_unique(&self, value: &str, except_id: Option<&str>) -> Result<bool, StoreError> {
        let Some(field) = self.spec.unique_field else {
            return Ok(false);
        };
        let query = self.query().and(Predicate::new(field, FilterOp::IEq, value));
        let found = self.store.find(&query).await?;
        Ok(found
            .iter()
            .any(|d| except_id.is_none() || d.get(ID_FIELD).and_then(Value::as_str) != except_id))
    }

    /// Raw lookup by field, hidden fields included. Used for credential checks.
    pub async fn find_raw_by(&self, field: &str, value: &str) -> Result<Option<Document>, StoreError> {
        let mut query = self.query().and(Predicate::new(field, FilterOp::IEq, value));
        query.take = Some(1);
        Ok(self.store.find(&query).await?.pop())
    }

    pub async fn create(&self, document: Document) -> Result<Document, StoreError> {
        let created = self.store.insert(self.spec.collection, document).await?;
        Ok(self.present(vec![created]).await?.remove(0))
    }

    pub async fn update(&self, id: &str, changes: Document) -> Result<Option<Document>, StoreError> {
        match self.store.update(self.spec.collection, id, changes).await? {
            Some(document) => Ok(self.present(vec![document]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Remove a document, returning it without hidden fields and unpopulated.
    pub async fn delete(&self, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .store
            .delete(self.spec.collection, id)
            .await?
            .map(|document| self.hide(document)))
    }

    fn hide(&self, mut document: Document) -> Document {
        for field in self.spec.hidden {
            document.remove(*field);
        }
        document
    }

    async fn present(&self, documents: Vec<Document>) -> Result<Vec<Document>, StoreError> {
        let documents: Vec<Document> = documents.into_iter().map(|d| self.hide(d)).collect();
        self.populate(documents).await
    }

    /// Replace reference ids with the referenced documents, one lookup per
    /// distinct id. Dangling references become `null`.
    async fn populate(&self, mut documents: Vec<Document>) -> Result<Vec<Document>, StoreError> {
        for reference in self.spec.references {
            let mut ids: Vec<String> = Vec::new();
            for document in &documents {
                if let Some(id) = document.get(reference.field).and_then(Value::as_str) {
                    if !ids.iter().any(|known| known == id) {
                        ids.push(id.to_string());
                    }
                }
            }
            if ids.is_empty() {
                continue;
            }

            let found = try_join_all(ids.iter().map(|id| self.store.find_by_id(reference.collection, id))).await?;
            let resolved: HashMap<&str, Value> = ids
                .iter()
                .map(String::as_str)
                .zip(found.into_iter().map(|d| d.map(Value::Object).unwrap_or(Value::Null)))
                .collect();

            for document in documents.iter_mut() {
                let target = document
                    .get(reference.field)
                    .and_then(Value::as_str)
                    .and_then(|id| resolved.get(id))
                    .cloned();
                if let Some(value) = target {
                    document.insert(reference.field.to_string(), value);
                }
            }
        }
        Ok(documents)
    }
}
