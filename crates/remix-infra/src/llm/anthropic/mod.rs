//! Anthropic Claude generation provider.
//!
//! [`AnthropicProvider`] implements the
//! [`GenerationProvider`](remix_core::generation::provider::GenerationProvider)
//! port against the Anthropic Messages API.

pub mod client;
pub mod types;

pub use client::{AnthropicProvider, system_prompt};
