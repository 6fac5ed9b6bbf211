//! Request extractors.

pub mod owner;
pub mod query;
