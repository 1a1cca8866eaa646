use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::messages;
use crate::filter::Pagination;

/// Listing metadata returned next to a page of results.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub page: u64,
    pub limit: u64,
    pub total_results: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    pub sort: String,
    pub next: String,
    pub prev: Option<String>,
}

impl Meta {
    /// Build metadata for `/api/v1/<path>` listings. `next` always points one
    /// page ahead; `prev` is absent on the first page.
    pub fn new(path: &str, pagination: Pagination, total_results: u64, total: Option<u64>, sort: String) -> Self {
        let link = |page: u64| format!("/api/v1/{}?page={}&limit={}", path, page, pagination.limit);
        Self {
            page: pagination.page,
            limit: pagination.limit,
            total_results,
            total,
            sort,
            next: link(pagination.page.saturating_add(1)),
            prev: (pagination.page > 1).then(|| link(pagination.page - 1)),
        }
    }
}

/// Wrapper for API responses that automatically adds the success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
    pub message: String,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with an empty message
    pub fn ok(data: T) -> Self {
        Self { data, status_code: StatusCode::OK, message: String::new(), meta: None }
    }

    /// 201; created answers never carry metadata
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self { data, status_code: StatusCode::CREATED, message: message.into(), meta: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return crate::error::ApiError::internal_server_error(messages::ERROR_GENERAL).into_response();
            }
        };

        let mut envelope = json!({
            "status": "success",
            "statusCode": self.status_code.as_u16(),
            "message": self.message,
            "data": data_value,
        });
        if self.status_code != StatusCode::CREATED {
            envelope["meta"] = match self.meta {
                Some(meta) => json!(meta),
                None => Value::Null,
            };
        }

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
