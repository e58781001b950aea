//! Record sources: where projects, sessions and acquisitions come from.
//!
//! This crate is allowed to do filesystem and network IO. Evaluation stays in the domain
//! crate; adapters only hand it records.

#![forbid(unsafe_code)]

mod http;
mod snapshot;

use serde_json::Value;
use sessionguard_domain::{AcquisitionSource, Record};

pub use http::{ApiKey, HttpSource};
pub use snapshot::SnapshotSource;

/// The project being checked.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectInfo {
    pub id: Option<String>,
    pub label: Option<String>,
    /// Raw templates as stored on the project, in order.
    pub templates: Vec<Value>,
}

impl ProjectInfo {
    /// Label if known, else id.
    pub fn display_name(&self) -> Option<&str> {
        self.label.as_deref().or(self.id.as_deref())
    }

    pub(crate) fn from_json(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let templates = match value.get("templates") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        Self {
            id: text("_id").or_else(|| text("id")),
            label: text("label"),
            templates,
        }
    }
}

/// A project plus its sessions, with acquisitions fetched per session on demand.
pub trait ProjectSource: AcquisitionSource {
    fn project(&self) -> anyhow::Result<ProjectInfo>;

    /// Sessions in the order the source lists them.
    fn sessions(&self) -> anyhow::Result<Vec<Record>>;

    /// Rename the analysis that requested the run.
    fn update_analysis_label(&self, analysis_id: &str, label: &str) -> anyhow::Result<()>;
}

/// Build session records from a JSON list, dropping entries that are not mappings.
pub(crate) fn session_records(items: Vec<Value>) -> Vec<Record> {
    items
        .into_iter()
        .filter_map(|v| Record::from_json(sessionguard_domain::ContainerKind::Session, v))
        .collect()
}
