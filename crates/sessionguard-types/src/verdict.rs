use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a session failed one template.
///
/// Mismatches are data, not errors: the engine returns them, accumulates them
/// per template, and the report prints `message`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    /// Stable discriminator from [`crate::ids`].
    pub code: String,
    pub message: String,
}

impl Reason {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of checking one session against a template set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// At least one template matched.
    Compliant,
    /// No template matched; one reason per template, in template order.
    NonCompliant { reasons: Vec<Reason> },
}

impl Verdict {
    pub fn is_compliant(&self) -> bool {
        matches!(self, Verdict::Compliant)
    }

    pub fn reasons(&self) -> &[Reason] {
        match self {
            Verdict::Compliant => &[],
            Verdict::NonCompliant { reasons } => reasons,
        }
    }
}
