//! Shared domain types for the post remix pipeline.
//!
//! This crate contains the types passed between every layer: platforms,
//! generated candidates, saved posts, generation requests and replies, the
//! `/remix` wire bodies, configuration and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod generation;
pub mod platform;
pub mod post;
