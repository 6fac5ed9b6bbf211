//! SQLite storage layer.
//!
//! The saved-post repository, backed by SQLite in WAL mode with split
//! read/write connection pools.

pub mod pool;
pub mod post;
