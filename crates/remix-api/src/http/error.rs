//! Error types mapping domain failures to HTTP responses.
//!
//! Two shapes: [`AppError`] renders the envelope used under `/api/v1`, and
//! [`RemixFailure`] renders the flat `{message, type?, status?}` body of
//! `POST /remix`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use remix_types::error::{CurationError, GenerationError};
use remix_types::generation::RemixErrorBody;

use crate::http::response::ApiMeta;

/// Message returned when `text` or `prompt` is missing.
pub const MISSING_INPUT_MESSAGE: &str = "Text and prompt are required";

fn generation_status(e: &GenerationError) -> StatusCode {
    match e {
        GenerationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        GenerationError::Network(_) => StatusCode::GATEWAY_TIMEOUT,
        GenerationError::Provider { .. } | GenerationError::MalformedResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

/// Application-level error for the envelope API.
#[derive(Debug)]
pub enum AppError {
    Curation(CurationError),
    /// Validation error.
    Validation(String),
}

impl From<CurationError> for AppError {
    fn from(e: CurationError) -> Self {
        AppError::Curation(e)
    }
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        AppError::Curation(CurationError::Generation(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Curation(CurationError::NotFound) => {
                (StatusCode::NOT_FOUND, "POST_NOT_FOUND", "Post not found".to_string())
            }
            AppError::Curation(CurationError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Curation(CurationError::StoreUnavailable(msg)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE", msg.clone())
            }
            AppError::Curation(CurationError::Generation(e)) => {
                (generation_status(e), "GENERATION_ERROR", e.to_string())
            }
            AppError::Curation(e) => (StatusCode::CONFLICT, "CONFLICT", e.to_string()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
        };

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), code, %message, "Request failed");
        }

        let body = json!({
            "data": null,
            "meta": ApiMeta::new(0),
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

/// Failure of a `/remix` or `/test` call.
///
/// `type` is the error kind, or the provider's own code for provider
/// errors; `status` is the provider's HTTP status when there was one.
#[derive(Debug)]
pub struct RemixFailure(pub GenerationError);

impl From<GenerationError> for RemixFailure {
    fn from(e: GenerationError) -> Self {
        RemixFailure(e)
    }
}

impl RemixFailure {
    pub fn status(&self) -> StatusCode {
        generation_status(&self.0)
    }

    pub fn body(&self) -> RemixErrorBody {
        match &self.0 {
            GenerationError::Provider {
                status,
                code,
                message,
            } => RemixErrorBody {
                message: message.clone(),
                error_type: code.clone(),
                status: *status,
            },
            GenerationError::InvalidInput(msg)
            | GenerationError::Network(msg)
            | GenerationError::MalformedResponse(msg) => RemixErrorBody {
                message: msg.clone(),
                error_type: Some(self.0.kind().to_string()),
                status: None,
            },
        }
    }
}

impl IntoResponse for RemixFailure {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(
            status = status.as_u16(),
            kind = self.0.kind(),
            error = %self.0,
            "Remix request failed"
        );
        (status, Json(self.body())).into_response()
    }
}
