use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use super::store::{apply_projection, stamp_new, stamp_update, Document, DocumentStore, StoreError, ID_FIELD};
use crate::config::DatabaseConfig;
use crate::filter::query::validate_identifier;
use crate::filter::{FilterError, Predicate, Query, SqlResult};

const UNIQUE_VIOLATION: &str = "23505";

/// Postgres-backed store: one table per collection, `(id uuid, doc jsonb)`.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let raw = config.url.as_deref().ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;
        let connection_string = Self::build_connection_string(raw)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    fn build_connection_string(raw: &str) -> Result<String, StoreError> {
        let url = url::Url::parse(raw).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(url.into()),
            _ => Err(StoreError::InvalidDatabaseUrl),
        }
    }

    fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    async fn fetch_documents(&self, sql: &SqlResult) -> Result<Vec<Document>, StoreError> {
        debug!("query: {}", sql.query);
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = q.bind(p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(|row| into_document(row.try_get("doc")?)).collect()
    }
}

fn into_document(value: Value) -> Result<Document, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Query(format!("stored document is not an object: {}", other))),
    }
}

fn map_write_error(error: sqlx::Error, collection: &str) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Conflict(db.constraint().unwrap_or(collection).to_string())
        }
        _ => StoreError::Sqlx(error),
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn ensure_collection(&self, collection: &str, unique: Option<&str>) -> Result<(), StoreError> {
        validate_identifier(collection)?;
        let table = Self::quote_identifier(collection);
        let ddl = format!("CREATE TABLE IF NOT EXISTS {} (id uuid PRIMARY KEY, doc jsonb NOT NULL)", table);
        sqlx::query(&ddl).execute(&self.pool).await?;

        if let Some(field) = unique {
            validate_identifier(field).map_err(|_| FilterError::InvalidField(field.to_string()))?;
            let index = Self::quote_identifier(&format!("{}_{}_unique", collection, field));
            let ddl = format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ((lower(doc ->> '{}')))",
                index, table, field
            );
            sqlx::query(&ddl).execute(&self.pool).await?;
        }
        info!("Collection ready: {}", collection);
        Ok(())
    }

    async fn find(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let sql = query.to_sql()?;
        let documents = self.fetch_documents(&sql).await?;
        Ok(documents
            .into_iter()
            .map(|d| apply_projection(d, &query.projection))
            .collect())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        validate_identifier(collection)?;
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let sql = format!("SELECT doc FROM {} WHERE id = $1", Self::quote_identifier(collection));
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|r| into_document(r.try_get("doc")?)).transpose()
    }

    async fn count(&self, collection: &str, predicates: &[Predicate]) -> Result<u64, StoreError> {
        let query = Query { predicates: predicates.to_vec(), ..Query::new(collection) };
        let sql = query.to_count_sql()?;
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = q.bind(p);
        }
        let row = q.fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError> {
        validate_identifier(collection)?;
        let document = stamp_new(document);
        let id = document
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| StoreError::Query("document without identifier".to_string()))?;

        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", Self::quote_identifier(collection));
        sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(document.clone()))
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, collection))?;
        Ok(document)
    }

    async fn update(&self, collection: &str, id: &str, changes: Document) -> Result<Option<Document>, StoreError> {
        validate_identifier(collection)?;
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let changes = stamp_update(changes);
        let sql = format!(
            "UPDATE {} SET doc = doc || $2 WHERE id = $1 RETURNING doc",
            Self::quote_identifier(collection)
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(changes))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, collection))?;
        row.map(|r| into_document(r.try_get("doc")?)).transpose()
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        validate_identifier(collection)?;
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING doc", Self::quote_identifier(collection));
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|r| into_document(r.try_get("doc")?)).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}
