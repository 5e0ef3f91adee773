//! Core review model and deterministic post-processing for PlanCritic.
//!
//! Everything in this crate is pure: the provider response has already been
//! fetched and parsed by the engine, and nothing here performs I/O.

pub mod filter;
pub mod postprocess;
pub mod render;
pub mod review;
pub mod schema;

pub use filter::{FailOn, SeverityThreshold};
pub use postprocess::{post_process, PostProcessOptions, PostProcessed};
pub use render::render_markdown;
pub use review::*;
pub use schema::{validate, ValidationError};
