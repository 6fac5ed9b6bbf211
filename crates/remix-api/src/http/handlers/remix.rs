//! The `/remix` generation boundary and the `/test` provider check.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::{Instrument, info_span};

use remix_core::prompt;
use remix_infra::llm::check_provider;
use remix_types::error::GenerationError;
use remix_types::generation::{RemixRequest, RemixResponse};

use crate::http::error::{MISSING_INPUT_MESSAGE, RemixFailure};
use crate::state::AppState;

/// POST /remix - Run one generation call and return the raw reply.
///
/// Segmentation is left to the caller, which gets the reply exactly as the
/// provider produced it.
pub async fn remix(
    State(state): State<AppState>,
    body: Result<Json<RemixRequest>, JsonRejection>,
) -> Result<Json<RemixResponse>, RemixFailure> {
    let Json(request) = body.map_err(|e| GenerationError::InvalidInput(e.body_text()))?;

    if request.text.trim().is_empty() || request.prompt.trim().is_empty() {
        return Err(GenerationError::InvalidInput(MISSING_INPUT_MESSAGE.to_string()).into());
    }

    let final_prompt = prompt::build(&request.text, &request.prompt)?;
    let provider = state.provider()?;

    let span = info_span!(
        "remix.request",
        remix.platform = %request.platform,
        remix.text_len = request.text.len(),
    );
    let reply = provider
        .generate(&final_prompt, request.platform)
        .instrument(span)
        .await?;

    Ok(Json(RemixResponse {
        remixed_text: reply.0,
    }))
}

/// Fallback for non-POST requests to `/remix`.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "message": "Method not allowed" })),
    )
}

/// GET /test - Send a minimal prompt to confirm the provider answers.
pub async fn provider_check(State(state): State<AppState>) -> axum::response::Response {
    let result = match state.provider() {
        Ok(provider) => check_provider(&provider).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(reply) => Json(json!({
            "message": "Server is running!",
            "apiTest": reply.as_str(),
        }))
        .into_response(),
        Err(e) => {
            let failure = RemixFailure(e);
            let body = failure.body();
            tracing::warn!(kind = failure.0.kind(), error = %failure.0, "Provider check failed");
            (
                failure.status(),
                Json(json!({
                    "message": "Server running but API test failed",
                    "error": body.message,
                    "type": body.error_type,
                })),
            )
                .into_response()
        }
    }
}
