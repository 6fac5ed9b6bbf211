//! HTTP layer for `remix serve`.
//!
//! Serves the `/remix` generation boundary, a provider check at `/test`,
//! and saved-post CRUD under `/api/v1` in the envelope response format.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
