//! Infrastructure layer for the post remix pipeline.
//!
//! Contains the implementations of the ports defined in `remix-core`: the
//! Anthropic Messages API client and the remote `/remix` client (generation
//! providers), and the SQLite saved-post repository. Also hosts the config
//! loader, data directory resolution, and share-link construction.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod share;
pub mod sqlite;
