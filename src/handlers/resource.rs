use axum::{
    extract::{rejection::JsonRejection, Path, Query as UrlQuery, State},
    Extension, Json,
};
use serde_json::Value;
use tracing::info;

use crate::auth::Principal;
use crate::context::AppContext;
use crate::database::{Document, Repository, StoreError};
use crate::entities::schemas::{self, Mode};
use crate::entities::EntitySpec;
use crate::error::ApiError;
use crate::filter::{Features, QueryParams};
use crate::middleware::{ApiResponse, ApiResult, Meta};

/// State of one entity's routes.
#[derive(Clone)]
pub struct ResourceState {
    pub ctx: AppContext,
    pub spec: &'static EntitySpec,
}

impl ResourceState {
    pub fn new(ctx: AppContext, spec: &'static EntitySpec) -> Self {
        Self { ctx, spec }
    }

    pub fn repository(&self) -> Repository {
        self.ctx.repository(self.spec)
    }
}

/// Unparseable query strings degrade to no parameters at all.
pub fn query_params(raw: Option<UrlQuery<Vec<(String, String)>>>) -> QueryParams {
    QueryParams::from_pairs(raw.map(|UrlQuery(pairs)| pairs).unwrap_or_default())
}

/// Map a store failure, turning unique violations into the entity's message.
pub fn store_error(spec: &EntitySpec, err: StoreError) -> ApiError {
    match err {
        StoreError::Conflict(_) => ApiError::conflict(spec.messages.already_exists),
        other => other.into(),
    }
}

/// 404 with the entity's message unless `id` names a stored record.
pub async fn ensure_exists(repo: &Repository, id: &str) -> Result<(), ApiError> {
    if repo.exists(id).await? {
        Ok(())
    } else {
        Err(ApiError::not_found(repo.spec().messages.not_found))
    }
}

/// Fast-path uniqueness check; the store enforces it again on write.
pub async fn ensure_unique(repo: &Repository, document: &Document, except_id: Option<&str>) -> Result<(), ApiError> {
    let spec = repo.spec();
    let Some(field) = spec.unique_field else {
        return Ok(());
    };
    let Some(value) = document.get(field).and_then(Value::as_str) else {
        return Ok(());
    };
    if repo.exists_unique(value, except_id).await? {
        return Err(ApiError::conflict(spec.messages.already_exists));
    }
    Ok(())
}

pub async fn list(
    State(state): State<ResourceState>,
    raw: Option<UrlQuery<Vec<(String, String)>>>,
) -> ApiResult<Vec<Document>> {
    let params = query_params(raw);
    let repo = state.repository();

    let features = Features::new(repo.query(), &params)
        .with_default_limit(state.ctx.config.api.default_limit)
        .filter()
        .sort()
        .paginate()
        .limit_fields();
    let pagination = features.pagination();
    let query = features.into_query();

    let (documents, total) = futures::try_join!(repo.select_any(&query), repo.count_all())?;
    let meta = Meta::new(state.spec.path, pagination, documents.len() as u64, Some(total), params.sort_label());
    Ok(ApiResponse::ok(documents).with_meta(meta))
}

pub async fn show(State(state): State<ResourceState>, Path(id): Path<String>) -> ApiResult<Document> {
    let document = state
        .repository()
        .select_one(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(state.spec.messages.not_found))?;
    Ok(ApiResponse::ok(document))
}

pub async fn create(
    State(state): State<ResourceState>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Document> {
    let Json(body) = body?;
    let spec = state.spec;
    let document = schemas::build(spec.schema, body, Mode::Create, spec.rules)?;

    let repo = state.repository();
    ensure_unique(&repo, &document, None).await?;
    let created = repo.create(document).await.map_err(|e| store_error(spec, e))?;

    let id = created.get("_id").and_then(Value::as_str).unwrap_or_default();
    info!("{} created {} {}", principal.email, spec.path, id);
    Ok(ApiResponse::created(created, spec.messages.created))
}

pub async fn update(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Document> {
    let Json(body) = body?;
    let spec = state.spec;
    let changes = schemas::build(spec.schema, body, Mode::Update, spec.rules)?;

    let repo = state.repository();
    ensure_exists(&repo, &id).await?;
    ensure_unique(&repo, &changes, Some(&id)).await?;
    let updated = repo
        .update(&id, changes)
        .await
        .map_err(|e| store_error(spec, e))?
        .ok_or_else(|| ApiError::not_found(spec.messages.not_found))?;
    Ok(ApiResponse::ok(updated).with_message(spec.messages.updated))
}

pub async fn delete(
    State(state): State<ResourceState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Document> {
    let spec = state.spec;
    let deleted = state
        .repository()
        .delete(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(spec.messages.not_found))?;

    info!("{} deleted {} {}", principal.email, spec.path, id);
    Ok(ApiResponse::ok(deleted).with_message(spec.messages.deleted.unwrap_or_default()))
}
