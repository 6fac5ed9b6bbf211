//! HTTP request handlers.

pub mod post;
pub mod remix;
