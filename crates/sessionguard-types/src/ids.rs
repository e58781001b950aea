//! Stable codes for compliance failures.
//!
//! A `code` is a short snake_case discriminator carried next to the human-readable message.

// Attribute requirements
pub const CODE_NO_VALUE: &str = "no_value";
pub const CODE_NO_MATCH: &str = "no_match";
pub const CODE_SHAPE_MISMATCH: &str = "shape_mismatch";

// Session section
pub const CODE_LABEL_MISMATCH: &str = "label_mismatch";
pub const CODE_SESSION_REQUIREMENT: &str = "session_requirement";

// Quantified clauses
pub const CODE_INSUFFICIENT_FILES: &str = "insufficient_files";
pub const CODE_INSUFFICIENT_ACQUISITIONS: &str = "insufficient_acquisitions";

// Acquisitions phase on a session that was never persisted
pub const CODE_MISSING_ID: &str = "missing_id";

/// Every code the engine can emit.
pub fn all_codes() -> &'static [&'static str] {
    &[
        CODE_NO_VALUE,
        CODE_NO_MATCH,
        CODE_SHAPE_MISMATCH,
        CODE_LABEL_MISMATCH,
        CODE_SESSION_REQUIREMENT,
        CODE_INSUFFICIENT_FILES,
        CODE_INSUFFICIENT_ACQUISITIONS,
        CODE_MISSING_ID,
    ]
}
