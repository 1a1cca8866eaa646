//! User handlers that differ from the generic resource ones: passwords are
//! hashed before storage and registration and login answer with a token.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;
use tracing::{info, warn};

use super::resource::{ensure_exists, ensure_unique, store_error, ResourceState};
use crate::auth::{generate_token, hash_password, verify_password};
use crate::config::messages;
use crate::context::AppContext;
use crate::database::Document;
use crate::entities::schemas::{self, LoginRequest, Mode, LOGIN_RULES};
use crate::entities::USUARIOS;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

async fn hash_in_place(ctx: &AppContext, document: &mut Document) -> Result<(), ApiError> {
    if let Some(password) = document.get("password").and_then(Value::as_str) {
        let hash = hash_password(password.to_string(), ctx.config.security.bcrypt_cost).await?;
        document.insert("password".to_string(), Value::String(hash));
    }
    Ok(())
}

pub async fn create(State(state): State<ResourceState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(body) = body?;
    let mut document = schemas::build(USUARIOS.schema, body, Mode::Create, USUARIOS.rules)?;

    let repo = state.repository();
    ensure_unique(&repo, &document, None).await?;
    hash_in_place(&state.ctx, &mut document).await?;
    let created = repo.create(document).await.map_err(|e| store_error(&USUARIOS, e))?;

    let id = created
        .get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::internal_server_error(messages::ERROR_GENERAL))?;
    let token = generate_token(&state.ctx.config.security, id)?;
    info!("Registered user {}", id);
    Ok(ApiResponse::created(Value::String(token), messages::USUARIO_REGISTRADO))
}

pub async fn update(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = body?;
    let mut changes = schemas::build(USUARIOS.schema, body, Mode::Update, USUARIOS.rules)?;

    let repo = state.repository();
    ensure_exists(&repo, &id).await?;
    ensure_unique(&repo, &changes, Some(&id)).await?;
    hash_in_place(&state.ctx, &mut changes).await?;
    repo.update(&id, changes)
        .await
        .map_err(|e| store_error(&USUARIOS, e))?
        .ok_or_else(|| ApiError::not_found(messages::USUARIO_NO_ENCONTRADO))?;
    Ok(ApiResponse::ok(Value::Null).with_message(messages::USUARIO_ACTUALIZADO))
}

/// Exchange credentials for a token. Unknown email and wrong password get the
/// same answer.
pub async fn login(State(ctx): State<AppContext>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(body) = body?;
    let request: LoginRequest = schemas::parse_body(body, LOGIN_RULES, Mode::Create, false)?;
    let email = request.email.unwrap_or_default().trim().to_lowercase();
    let password = request.password.unwrap_or_default();

    let denied = || ApiError::bad_request(messages::USUARIO_CREDENCIALES_INCORRECTAS);
    let Some(user) = ctx.repository(&USUARIOS).find_raw_by("email", &email).await? else {
        warn!("Login for unknown email {}", email);
        return Err(denied());
    };
    let hash = user.get("password").and_then(Value::as_str).unwrap_or_default().to_string();
    let valid = verify_password(password, hash).await.unwrap_or_else(|e| {
        warn!("Stored password for {} could not be checked: {}", email, e);
        false
    });
    if !valid {
        warn!("Wrong password for {}", email);
        return Err(denied());
    }

    let id = user.get("_id").and_then(Value::as_str).ok_or_else(denied)?;
    let token = generate_token(&ctx.config.security, id)?;
    Ok(ApiResponse::ok(Value::String(token)))
}
