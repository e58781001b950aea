//! Stable DTOs and IDs used across the sessionguard workspace.
//!
//! This crate is intentionally boring:
//! - stable reason codes attached to every compliance failure
//! - the per-session verdict
//! - the report rows and run summary handed to renderers

#![forbid(unsafe_code)]

pub mod ids;
pub mod report;
pub mod verdict;

pub use report::{RunSummary, SessionRow, ValidationReport};
pub use verdict::{Reason, Verdict};
