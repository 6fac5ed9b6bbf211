//! RemoteRemixProvider -- generation through a running `remix serve`.
//!
//! Speaks the client side of `POST /remix`: sends `{text, prompt, platform}`
//! and expects `{remixedText}` or `{message, type?, status?}` back. The
//! answer is validated as JSON of the right shape before use; anything else
//! is a [`GenerationError::MalformedResponse`].

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use remix_core::generation::provider::GenerationProvider;
use remix_types::error::GenerationError;
use remix_types::generation::{
    FinalPrompt, GenerationReply, RemixErrorBody, RemixRequest, RemixResponse,
};
use remix_types::platform::Platform;

pub struct RemoteRemixProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteRemixProvider {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/remix", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl GenerationProvider for RemoteRemixProvider {
    fn name(&self) -> &str {
        "remote"
    }

    async fn generate(
        &self,
        prompt: &FinalPrompt,
        platform: Platform,
    ) -> Result<GenerationReply, GenerationError> {
        let body = RemixRequest {
            text: prompt.source_text().to_string(),
            prompt: prompt.template().to_string(),
            platform,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));
        let raw = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(format!("failed to read response body: {e}")))?;

        if !is_json {
            return Err(GenerationError::MalformedResponse(format!(
                "expected a JSON response, got HTTP {status} with a non-JSON body"
            )));
        }

        if !status.is_success() {
            let error: RemixErrorBody = serde_json::from_str(&raw).map_err(|e| {
                GenerationError::MalformedResponse(format!("unexpected error body: {e}"))
            })?;
            debug!(status = status.as_u16(), kind = ?error.error_type, "Remote remix failed");
            return Err(from_error_body(status.as_u16(), error));
        }

        let parsed: RemixResponse = serde_json::from_str(&raw).map_err(|e| {
            GenerationError::MalformedResponse(format!("unexpected response shape: {e}"))
        })?;
        Ok(GenerationReply::new(parsed.remixed_text))
    }
}

/// Rebuild the typed error a server encoded into a failure body.
fn from_error_body(http_status: u16, body: RemixErrorBody) -> GenerationError {
    match body.error_type.as_deref() {
        Some("invalid_input") => GenerationError::InvalidInput(body.message),
        Some("network_error") => GenerationError::Network(body.message),
        Some("malformed_response") => GenerationError::MalformedResponse(body.message),
        _ => GenerationError::Provider {
            status: Some(body.status.unwrap_or(http_status)),
            code: body.error_type,
            message: body.message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use serde_json::{Value, json};

    async fn spawn(status: StatusCode, content_type: &'static str, body: String) -> String {
        let app = Router::new().route(
            "/remix",
            post(move |axum::Json(request): axum::Json<Value>| async move {
                // Echo the platform so tests can see the request fields arrived.
                let body = body.replace("{platform}", request["platform"].as_str().unwrap_or(""));
                (status, [("content-type", content_type)], body)
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn prompt() -> FinalPrompt {
        remix_core::prompt::build("source", "template").unwrap()
    }

    async fn generate(base: &str) -> Result<GenerationReply, GenerationError> {
        RemoteRemixProvider::new(base, Duration::from_secs(5))
            .unwrap()
            .generate(&prompt(), Platform::LinkedIn)
            .await
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let p = RemoteRemixProvider::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(p.endpoint(), "http://localhost:3000/remix");
    }

    #[tokio::test]
    async fn test_success_returns_remixed_text() {
        let body = json!({"remixedText": "for {platform} ||| two"}).to_string();
        let base = spawn(StatusCode::OK, "application/json", body).await;

        let reply = generate(&base).await.unwrap();
        assert_eq!(reply.as_str(), "for linkedin ||| two");
    }

    #[tokio::test]
    async fn test_html_response_is_malformed() {
        let base = spawn(StatusCode::OK, "text/html", "<html>oops</html>".into()).await;
        let err = generate(&base).await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_field_is_malformed() {
        let body = json!({"text": "wrong key"}).to_string();
        let base = spawn(StatusCode::OK, "application/json", body).await;
        let err = generate(&base).await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_provider_error_body_keeps_code_and_status() {
        let body = json!({
            "message": "rate limited",
            "type": "rate_limit_error",
            "status": 429
        })
        .to_string();
        let base = spawn(StatusCode::BAD_GATEWAY, "application/json", body).await;

        let err = generate(&base).await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::Provider {
                status: Some(429),
                code: Some("rate_limit_error".into()),
                message: "rate limited".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_error_kinds_round_trip() {
        let body = json!({"message": "upstream timed out", "type": "network_error"}).to_string();
        let base = spawn(StatusCode::GATEWAY_TIMEOUT, "application/json", body).await;
        let err = generate(&base).await.unwrap_err();
        assert_eq!(err, GenerationError::Network("upstream timed out".into()));

        let body = json!({"message": "Text and prompt are required", "type": "invalid_input"})
            .to_string();
        let base = spawn(StatusCode::BAD_REQUEST, "application/json", body).await;
        let err = generate(&base).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_untyped_error_uses_http_status() {
        let body = json!({"message": "Error processing your request"}).to_string();
        let base = spawn(StatusCode::INTERNAL_SERVER_ERROR, "application/json", body).await;

        let err = generate(&base).await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::Provider {
                status: Some(500),
                code: None,
                message: "Error processing your request".into(),
            }
        );
    }
}
