//! Use case orchestration for sessionguard.
//!
//! This crate provides the application layer: use cases that coordinate the domain, repo,
//! settings and render layers. Heavy lifting stays in those layers.
//!
//! The CLI crate depends on this; it only handles argument parsing and process exit codes.

#![forbid(unsafe_code)]

mod artifacts;
mod batch;
mod templates;
mod validate;

pub use artifacts::write_text_file;
pub use batch::evaluate_sessions;
pub use templates::{TemplatesInput, run_templates};
pub use validate::{
    ValidationInput, ValidationOutput, analysis_label, report_exit_code, run_validation,
};
