use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::auth;
use crate::config::AppConfig;
use crate::database::{Document, DocumentStore, MemoryStore, PgStore, Repository, StoreError};
use crate::entities::{EntitySpec, ENTITIES, USUARIOS};

/// Shared application state: configuration and the document store.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppContext {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self { config: Arc::new(config), store }
    }

    /// Open the configured store. Without a database URL, or when `memory` is
    /// requested, data lives in process and is lost on exit.
    pub async fn connect(config: AppConfig, memory: bool) -> Result<Self, StoreError> {
        let store: Arc<dyn DocumentStore> = if memory || config.database.url.is_none() {
            warn!("Using in-memory store; data will not survive a restart");
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(PgStore::connect(&config.database).await?)
        };
        Ok(Self::new(config, store))
    }

    pub fn repository(&self, spec: &'static EntitySpec) -> Repository {
        Repository::new(spec, self.store.clone())
    }

    /// Create collections and, when configured and no user exists yet, the
    /// bootstrap administrator.
    pub async fn prepare(&self) -> anyhow::Result<()> {
        for spec in ENTITIES {
            self.store.ensure_collection(spec.collection, spec.unique_field).await?;
        }

        let security = &self.config.security;
        let (Some(email), Some(password)) = (&security.bootstrap_admin_email, &security.bootstrap_admin_password)
        else {
            return Ok(());
        };

        let usuarios = self.repository(&USUARIOS);
        if usuarios.count_all().await? > 0 {
            return Ok(());
        }

        let hash = auth::hash_password(password.clone(), security.bcrypt_cost).await?;
        let mut admin = Document::new();
        admin.insert("nombre".to_string(), Value::from("Administrador"));
        admin.insert("email".to_string(), Value::from(email.trim().to_lowercase()));
        admin.insert("password".to_string(), Value::from(hash));
        admin.insert("rol".to_string(), Value::from(auth::Rol::Admin.as_str()));
        usuarios.create(admin).await?;
        info!("Created bootstrap administrator {}", email);
        Ok(())
    }

    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bootstrap_admin_created_once() {
        let mut config = AppConfig::development();
        config.security.bcrypt_cost = 4;
        config.security.bootstrap_admin_email = Some("Admin@Example.com".into());
        config.security.bootstrap_admin_password = Some("secreto".into());

        let ctx = AppContext::connect(config, true).await.unwrap();
        ctx.prepare().await.unwrap();
        ctx.prepare().await.unwrap();

        let usuarios = ctx.repository(&USUARIOS);
        assert_eq!(usuarios.count_all().await.unwrap(), 1);
        let admin = usuarios.find_raw_by("email", "admin@example.com").await.unwrap().unwrap();
        assert_eq!(admin["rol"], "ADMIN");
        assert_ne!(admin["password"], "secreto");
    }

    #[tokio::test]
    async fn no_bootstrap_without_credentials() {
        let ctx = AppContext::connect(AppConfig::development(), true).await.unwrap();
        ctx.prepare().await.unwrap();
        assert_eq!(ctx.repository(&USUARIOS).count_all().await.unwrap(), 0);
    }
}
