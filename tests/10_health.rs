mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::TestServer::start().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_lists_entity_endpoints() -> Result<()> {
    let server = common::TestServer::start().await?;
    let body = reqwest::get(format!("{}/", server.base_url)).await?.json::<Value>().await?;

    let endpoints = body["data"]["endpoints"].as_array().cloned().unwrap_or_default();
    assert!(endpoints.contains(&json!("/api/v1/pedidos")), "endpoints: {:?}", endpoints);
    Ok(())
}

#[tokio::test]
async fn bootstrap_admin_can_log_in_and_list() -> Result<()> {
    let server = common::TestServer::start().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/v1/usuarios/login", server.base_url))
        .json(&json!({"email": "admin@recursos.es", "password": "secreto"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let token = res.json::<Value>().await?["data"].as_str().unwrap_or_default().to_string();
    assert!(!token.is_empty());

    let res = client
        .get(format!("{}/api/v1/usuarios", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    let users = body["data"].as_array().cloned().unwrap_or_default();
    assert!(users.iter().all(|u| u.get("password").is_none()));
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_token() -> Result<()> {
    let server = common::TestServer::start().await?;
    let res = reqwest::get(format!("{}/api/v1/clientes", server.base_url)).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "error");
    assert_eq!(body["statusCode"], 401);
    Ok(())
}

#[tokio::test]
async fn server_stops_with_its_handle() -> Result<()> {
    let server = common::TestServer::start().await?;
    let health = format!("{}/health", server.base_url);
    drop(server);

    let client = reqwest::Client::builder().timeout(std::time::Duration::from_secs(2)).build()?;
    assert!(client.get(&health).send().await.is_err());
    Ok(())
}
