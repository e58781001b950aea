//! Pure template evaluation (no IO).
//!
//! Input: session records, a parsed template set, and a source for acquisitions.
//! Output: a verdict per session, with one reason per failed template.

#![forbid(unsafe_code)]

pub mod error;
pub mod matcher;
pub mod model;
pub mod requirement;
pub mod source;
pub mod template;

mod engine;

pub use engine::{
    Check, check_cont, check_req, check_session_for_single_template, is_session_compliant,
};
pub use error::{FetchError, TemplateError};
pub use model::{ContainerKind, Record};
pub use requirement::{Clause, QuantifiedClause, Requirement, Requirements};
pub use source::AcquisitionSource;
pub use template::{SessionRequirement, Template, TemplateSet};

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;
