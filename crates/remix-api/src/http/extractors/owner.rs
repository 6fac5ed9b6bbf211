//! Owner extractor.
//!
//! Reads the owner of the request from the `x-remix-owner` header. Requests
//! without one act as the configured default owner.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use remix_types::post::OwnerId;

use crate::http::error::AppError;
use crate::state::AppState;

pub const OWNER_HEADER: &str = "x-remix-owner";

/// The owner a request acts for.
pub struct Owner(pub OwnerId);

impl FromRequestParts<AppState> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(OWNER_HEADER) else {
            return Ok(Owner(state.default_owner()));
        };

        let owner = value
            .to_str()
            .map_err(|_| AppError::Validation(format!("Invalid {OWNER_HEADER} header encoding")))?
            .trim();

        if owner.is_empty() {
            return Ok(Owner(state.default_owner()));
        }
        Ok(Owner(OwnerId::new(owner)))
    }
}
