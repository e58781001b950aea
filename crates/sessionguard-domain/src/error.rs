//! Error types for template loading and upstream fetches.
//!
//! Clause-level mismatches are not errors; they travel as [`sessionguard_types::Reason`].

/// A template that cannot be turned into a typed requirement tree.
///
/// `path` points at the offending clause, e.g. `templates[1].acquisitions[0].minimum`.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("{path}: invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        path: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{path}: quantified clause is missing `minimum`")]
    MissingMinimum { path: String },

    #[error("{path}: `minimum` must be a non-negative integer, found {found}")]
    InvalidMinimum { path: String, found: String },

    #[error("{path}: expected {expected}, found {found}")]
    UnexpectedShape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// The record source failed to produce a session's acquisitions.
#[derive(Debug, thiserror::Error)]
#[error("fetch acquisitions for session {session}: {message}")]
pub struct FetchError {
    pub session: String,
    pub message: String,
}

impl FetchError {
    pub fn new(session: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            message: message.into(),
        }
    }
}

/// Short JSON type name used in shape errors.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
