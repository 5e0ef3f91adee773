//! Runtime adapters for plancritic (config, source files, profiles, redaction,
//! patch output).

pub mod config;
pub mod patch;
pub mod profile;
pub mod redact;
pub mod source;

pub use config::Config;
pub use profile::{list_builtin, load_builtin, Profile};
pub use redact::Redactor;
pub use source::{infer_step_ids, SourceFile, StepId, StepPatterns};
