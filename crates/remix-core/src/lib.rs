//! Business logic and port definitions for the post remix pipeline.
//!
//! This crate defines the "ports" (the generation provider and post
//! repository traits) that the infrastructure layer implements, plus the
//! pure pieces of the pipeline: prompt building and reply segmentation. It
//! depends only on `remix-types` -- never on `remix-infra` or any
//! database/IO crate.

pub mod generation;
pub mod prompt;
pub mod repository;
pub mod segment;
pub mod service;
