//! Business logic services (use cases).
//!
//! Services orchestrate provider and repository calls. They depend on
//! traits (ports) -- never on concrete infrastructure implementations.

pub mod curation;
pub mod posts;
