use crate::Reason;
use time::{Duration, OffsetDateTime};

/// One non-compliant session: identity columns plus one reason per template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRow {
    pub session_id: Option<String>,
    pub subject_code: Option<String>,
    pub session_label: Option<String>,
    pub reasons: Vec<Reason>,
}

/// Run-level counters for one validation pass over a project.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub project: Option<String>,
    pub templates: u32,
    pub sessions_scanned: u32,
    pub sessions_noncompliant: u32,

    /// Set when the run stopped early because of the session limit.
    pub stopped_after: Option<u32>,

    pub started_at: OffsetDateTime,
    pub finished_at: OffsetDateTime,
}

impl RunSummary {
    /// Wall time between start and finish; zero if the clock went backwards.
    pub fn elapsed(&self) -> Duration {
        (self.finished_at - self.started_at).max(Duration::ZERO)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidationReport {
    pub summary: RunSummary,
    /// Non-compliant sessions only, in session order.
    pub rows: Vec<SessionRow>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.rows.is_empty()
    }
}
