mod common;

use std::collections::HashSet;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::TestApp;
use recursos_api::entities::PRODUCTOS;

async fn seed_productos(app: &TestApp, count: usize) -> Result<()> {
    for i in 0..count {
        app.seed(&PRODUCTOS, json!({"nombre": format!("Producto {:02}", i)})).await?;
    }
    Ok(())
}

fn ids(page: &Value) -> HashSet<String> {
    page.as_array()
        .into_iter()
        .flatten()
        .filter_map(|d| d["_id"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn second_page_of_ten() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.user_token().await?;
    seed_productos(&app, 25).await?;

    let res = app.get("/api/v1/productos?page=2&limit=10", &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data().as_array().map(Vec::len), Some(10));

    let meta = &res.body["meta"];
    assert_eq!(meta["page"], 2);
    assert_eq!(meta["limit"], 10);
    assert_eq!(meta["totalResults"], 10);
    assert_eq!(meta["total"], 25);
    assert_eq!(meta["sort"], "createdAt");
    assert_eq!(meta["next"], "/api/v1/productos?page=3&limit=10");
    assert_eq!(meta["prev"], "/api/v1/productos?page=1&limit=10");
    Ok(())
}

#[tokio::test]
async fn defaults_apply_without_parameters() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.user_token().await?;
    seed_productos(&app, 25).await?;

    let res = app.get("/api/v1/productos", &token).await?;
    assert_eq!(res.data().as_array().map(Vec::len), Some(20));
    assert_eq!(res.body["meta"]["page"], 1);
    assert_eq!(res.body["meta"]["limit"], 20);
    assert!(res.body["meta"]["prev"].is_null());
    Ok(())
}

#[tokio::test]
async fn pages_do_not_overlap() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.user_token().await?;
    seed_productos(&app, 25).await?;

    let first = app.get("/api/v1/productos?page=1&limit=10", &token).await?;
    let second = app.get("/api/v1/productos?page=2&limit=10", &token).await?;
    let third = app.get("/api/v1/productos?page=3&limit=10", &token).await?;

    let (a, b, c) = (ids(first.data()), ids(second.data()), ids(third.data()));
    assert_eq!(c.len(), 5);
    assert!(a.is_disjoint(&b));
    assert!(b.is_disjoint(&c));
    assert_eq!(a.len() + b.len() + c.len(), 25);
    Ok(())
}

#[tokio::test]
async fn past_the_end_is_empty() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.user_token().await?;
    seed_productos(&app, 3).await?;

    let res = app.get("/api/v1/productos?page=9&limit=10", &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data(), &json!([]));
    assert_eq!(res.body["meta"]["totalResults"], 0);
    assert_eq!(res.body["meta"]["total"], 3);
    Ok(())
}

#[tokio::test]
async fn invalid_values_fall_back_to_defaults() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.user_token().await?;
    seed_productos(&app, 2).await?;

    for query in ["page=abc&limit=-3", "page=0&limit=0", "page=&limit=1.5"] {
        let res = app.get(&format!("/api/v1/productos?{}", query), &token).await?;
        assert_eq!(res.status, StatusCode::OK, "{}", query);
        assert_eq!(res.body["meta"]["page"], 1, "{}", query);
        assert_eq!(res.body["meta"]["limit"], 20, "{}", query);
    }
    Ok(())
}

#[tokio::test]
async fn oversized_page_numbers_are_answered() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.user_token().await?;
    seed_productos(&app, 3).await?;

    let res = app.get("/api/v1/productos?page=18446744073709551615", &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["meta"]["page"], 1);
    assert_eq!(res.body["meta"]["totalResults"], 3);

    let res = app
        .get("/api/v1/productos?page=9223372036854775807&limit=9223372036854775807", &token)
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data(), &json!([]));
    assert_eq!(res.body["meta"]["page"], 9223372036854775807_u64);
    assert_eq!(
        res.body["meta"]["next"],
        "/api/v1/productos?page=9223372036854775808&limit=9223372036854775807"
    );
    Ok(())
}
