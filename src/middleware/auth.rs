use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::{verify_token, Principal, Rol};
use crate::context::AppContext;
use crate::entities::USUARIOS;
use crate::error::ApiError;

/// Authenticate the bearer token and attach the resolved [`Principal`].
///
/// Every failure answers with the same 401 body; the cause is only logged.
pub async fn require_auth(
    State(ctx): State<AppContext>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = match authenticate(&ctx, request.headers()).await {
        Ok(principal) => principal,
        Err(reason) => {
            warn!("Rejected request to {}: {}", request.uri().path(), reason);
            return Err(ApiError::access_denied());
        }
    };

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

async fn authenticate(ctx: &AppContext, headers: &HeaderMap) -> Result<Principal, String> {
    let token = extract_jwt_from_headers(headers)?;
    let claims = verify_token(&ctx.config.security, &token).map_err(|e| e.to_string())?;

    let document = ctx
        .repository(&USUARIOS)
        .select_one(&claims.id)
        .await
        .map_err(|e| format!("Principal lookup failed: {}", e))?
        .ok_or_else(|| format!("Principal {} no longer exists", claims.id))?;

    Principal::from_document(&document).ok_or_else(|| format!("Principal {} has no valid role", claims.id))
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Roles a route accepts, used as state for [`require_roles`].
#[derive(Debug, Clone, Copy)]
pub struct AllowedRoles(pub &'static [Rol]);

/// Role guard. Runs after [`require_auth`]; a missing principal is treated
/// like a wrong role.
pub async fn require_roles(
    State(AllowedRoles(allowed)): State<AllowedRoles>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match request.extensions().get::<Principal>() {
        Some(principal) if principal.has_role(allowed) => Ok(next.run(request).await),
        Some(principal) => {
            warn!("Role {} not allowed on {}", principal.rol.as_str(), request.uri().path());
            Err(ApiError::access_denied())
        }
        None => {
            warn!("No principal on guarded route {}", request.uri().path());
            Err(ApiError::access_denied())
        }
    }
}
