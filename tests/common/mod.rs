#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use recursos_api::auth::{generate_token, hash_password};
use recursos_api::config::AppConfig;
use recursos_api::database::{Document, MemoryStore};
use recursos_api::entities::{EntitySpec, USUARIOS};
use recursos_api::{app, AppContext};

pub const TEST_SECRET: &str = "test-secret";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = TEST_SECRET.to_string();
    config.security.bcrypt_cost = 4;
    config.api.enable_request_logging = false;
    config
}

pub fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap_or_default()
}

/// In-process application over a fresh in-memory store.
pub struct TestApp {
    pub ctx: AppContext,
    router: Router,
}

pub struct Response {
    pub status: StatusCode,
    pub body: Value,
}

impl Response {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Result<Self> {
        let ctx = AppContext::new(config, Arc::new(MemoryStore::new()));
        ctx.prepare().await?;
        let router = app(ctx.clone());
        Ok(Self { ctx, router })
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<Response> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok(Response { status, body })
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<Response> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<Response> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<Response> {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<Response> {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Store a user directly and return `(id, token)`.
    pub async fn create_user(&self, email: &str, password: &str, rol: &str) -> Result<(String, String)> {
        let hash = hash_password(password.to_string(), 4).await?;
        let user = self
            .ctx
            .repository(&USUARIOS)
            .create(doc(json!({"nombre": "Prueba", "email": email, "password": hash, "rol": rol})))
            .await?;
        let id = user["_id"].as_str().context("user without id")?.to_string();
        let token = generate_token(&self.ctx.config.security, &id)?;
        Ok((id, token))
    }

    pub async fn admin_token(&self) -> Result<String> {
        Ok(self.create_user("admin@recursos.es", "secreto", "ADMIN").await?.1)
    }

    pub async fn user_token(&self) -> Result<String> {
        Ok(self.create_user("user@recursos.es", "secreto", "USER").await?.1)
    }

    /// Insert a document bypassing validation and return it as stored.
    pub async fn seed(&self, spec: &'static EntitySpec, value: Value) -> Result<Document> {
        Ok(self.ctx.repository(spec).create(doc(value)).await?)
    }
}

pub fn id_of(document: &Document) -> String {
    document["_id"].as_str().unwrap_or_default().to_string()
}

/// The real binary on its own port with an in-memory store. The process is
/// killed when the handle is dropped.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let server = Self::spawn()?;
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_recursos-api"))
            .args(["--memory", "--port", &port.to_string()])
            .env("APP_ENV", "development")
            .env("JWT_SECRET", TEST_SECRET)
            .env("BOOTSTRAP_ADMIN_EMAIL", "admin@recursos.es")
            .env("BOOTSTRAP_ADMIN_PASSWORD", "secreto")
            .env("SECURITY_BCRYPT_COST", "4")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
