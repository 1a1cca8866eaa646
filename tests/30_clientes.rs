mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use recursos_api::config::messages;
use recursos_api::entities::CLIENTES;

#[tokio::test]
async fn create_show_update_cycle() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.user_token().await?;

    let created = app.post("/api/v1/clientes", &token, json!({"nombre": "  Acme  "})).await?;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["status"], "success");
    assert_eq!(created.body["statusCode"], 201);
    assert_eq!(created.message(), messages::CLIENTE_REGISTRADO);
    assert_eq!(created.data()["nombre"], "Acme");
    assert_eq!(created.data()["activo"], true);
    assert!(created.body.get("meta").is_none());
    let id = created.data()["_id"].as_str().unwrap_or_default().to_string();

    let shown = app.get(&format!("/api/v1/clientes/{}", id), &token).await?;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.data()["nombre"], "Acme");

    let updated = app
        .put(&format!("/api/v1/clientes/{}", id), &token, json!({"nombre": "Acme Industrial", "activo": false}))
        .await?;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.message(), messages::CLIENTE_ACTUALIZADO);
    assert_eq!(updated.data()["nombre"], "Acme Industrial");
    assert_eq!(updated.data()["activo"], false);
    assert_eq!(updated.data()["createdAt"], shown.data()["createdAt"]);
    Ok(())
}

#[tokio::test]
async fn duplicate_name_is_rejected_without_creating() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.user_token().await?;
    app.seed(&CLIENTES, json!({"nombre": "Acme", "activo": true})).await?;

    for nombre in ["Acme", "ACME", " acme "] {
        let res = app.post("/api/v1/clientes", &token, json!({"nombre": nombre})).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", nombre);
        assert_eq!(res.message(), messages::CLIENTE_YA_EXISTE);
    }

    let listed = app.get("/api/v1/clientes", &token).await?;
    assert_eq!(listed.body["meta"]["total"], 1);
    Ok(())
}

#[tokio::test]
async fn update_checks_uniqueness_against_others_only() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.user_token().await?;
    let acme = app.seed(&CLIENTES, json!({"nombre": "Acme", "activo": true})).await?;
    app.seed(&CLIENTES, json!({"nombre": "Beta", "activo": true})).await?;
    let id = common::id_of(&acme);

    let same = app.put(&format!("/api/v1/clientes/{}", id), &token, json!({"nombre": "ACME"})).await?;
    assert_eq!(same.status, StatusCode::OK);

    let taken = app.put(&format!("/api/v1/clientes/{}", id), &token, json!({"nombre": "beta"})).await?;
    assert_eq!(taken.status, StatusCode::BAD_REQUEST);
    assert_eq!(taken.message(), messages::CLIENTE_YA_EXISTE);
    Ok(())
}

#[tokio::test]
async fn validation_errors_use_entity_messages() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.user_token().await?;

    let missing = app.post("/api/v1/clientes", &token, json!({})).await?;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.message(), messages::CLIENTE_NOMBRE_REQUERIDO);

    let short = app.post("/api/v1/proveedores", &token, json!({"nombre": "ab"})).await?;
    assert_eq!(short.message(), messages::PROVEEDOR_NOMBRE_CORTO);
    assert_eq!(short.body["field_errors"]["nombre"], messages::PROVEEDOR_NOMBRE_CORTO);

    let wrong_type = app.post("/api/v1/productos", &token, json!({"nombre": 42})).await?;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_type.message(), messages::PETICION_NO_VALIDA);
    Ok(())
}

#[tokio::test]
async fn missing_records_are_not_found() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.user_token().await?;

    let unknown = uuid::Uuid::new_v4();
    let res = app.get(&format!("/api/v1/clientes/{}", unknown), &token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.message(), messages::CLIENTE_NO_ENCONTRADO);

    let res = app.get("/api/v1/productos/not-an-id", &token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.message(), messages::PRODUCTO_NO_ENCONTRADO);

    let res = app.put(&format!("/api/v1/proveedores/{}", unknown), &token, json!({"nombre": "Nuevo"})).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn master_data_cannot_be_deleted() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.admin_token().await?;
    let acme = app.seed(&CLIENTES, json!({"nombre": "Acme"})).await?;

    let res = app.delete(&format!("/api/v1/clientes/{}", common::id_of(&acme)), &token).await?;
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

#[tokio::test]
async fn update_of_missing_record_is_not_found_before_uniqueness() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.user_token().await?;
    app.seed(&CLIENTES, json!({"nombre": "Acme", "activo": true})).await?;

    let unknown = uuid::Uuid::new_v4();
    let res = app.put(&format!("/api/v1/clientes/{}", unknown), &token, json!({"nombre": "Acme"})).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.message(), messages::CLIENTE_NO_ENCONTRADO);
    Ok(())
}
