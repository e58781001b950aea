use crate::{ProjectInfo, ProjectSource, session_records};
use anyhow::Context;
use camino::Utf8Path;
use serde_json::Value;
use sessionguard_domain::{AcquisitionSource, ContainerKind, FetchError, Record};
use std::collections::BTreeMap;

const PROJECT_KEY: &str = "project";
const SESSIONS_KEY: &str = "sessions";
const ACQUISITIONS_KEY: &str = "acquisitions";

/// A project exported to a single YAML or JSON file.
///
/// ```yaml
/// project: {label: Brain, templates: [...]}
/// sessions:
///   - {_id: s1, label: ses-01, subject: {code: sub-01}, acquisitions: [...]}
/// ```
///
/// Acquisitions are nested under their session and served by session id.
#[derive(Clone, Debug)]
pub struct SnapshotSource {
    project: ProjectInfo,
    sessions: Vec<Record>,
    acquisitions: BTreeMap<String, Vec<Record>>,
}

impl SnapshotSource {
    pub fn load(path: &Utf8Path) -> anyhow::Result<Self> {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("read snapshot {path}"))?;
        Self::parse(&text).with_context(|| format!("parse snapshot {path}"))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let doc: Value = serde_yaml::from_str(text)?;
        let Value::Object(mut doc) = doc else {
            anyhow::bail!("snapshot must be a mapping with `{PROJECT_KEY}` and `{SESSIONS_KEY}`");
        };

        let project = match doc.remove(PROJECT_KEY) {
            Some(v @ Value::Object(_)) => ProjectInfo::from_json(&v),
            Some(Value::Null) | None => ProjectInfo::default(),
            Some(_) => anyhow::bail!("`{PROJECT_KEY}` must be a mapping"),
        };

        let raw_sessions = match doc.remove(SESSIONS_KEY) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => anyhow::bail!("`{SESSIONS_KEY}` must be a list"),
        };

        let mut acquisitions = BTreeMap::new();
        let mut stripped = Vec::with_capacity(raw_sessions.len());
        for (i, mut session) in raw_sessions.into_iter().enumerate() {
            if let Value::Object(map) = &mut session
                && let Some(children) = map.remove(ACQUISITIONS_KEY)
            {
                let Value::Array(children) = children else {
                    anyhow::bail!("{SESSIONS_KEY}[{i}].{ACQUISITIONS_KEY} must be a list");
                };
                let records: Vec<Record> = children
                    .into_iter()
                    .filter_map(|c| Record::from_json(ContainerKind::Acquisition, c))
                    .collect();
                // Unsaved sessions cannot be asked for acquisitions.
                if let Some(id) = session_id(map) {
                    acquisitions.insert(id, records);
                }
            }
            stripped.push(session);
        }

        Ok(Self {
            project,
            sessions: session_records(stripped),
            acquisitions,
        })
    }
}

fn session_id(map: &serde_json::Map<String, Value>) -> Option<String> {
    ["_id", "id"].iter().find_map(|key| {
        map.get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

impl AcquisitionSource for SnapshotSource {
    fn acquisitions(&self, session: &Record) -> Result<Vec<Record>, FetchError> {
        let id = session
            .id()
            .ok_or_else(|| FetchError::new("<none>", "session has no id"))?;
        Ok(self.acquisitions.get(id).cloned().unwrap_or_default())
    }
}

impl ProjectSource for SnapshotSource {
    fn project(&self) -> anyhow::Result<ProjectInfo> {
        Ok(self.project.clone())
    }

    fn sessions(&self) -> anyhow::Result<Vec<Record>> {
        Ok(self.sessions.clone())
    }

    fn update_analysis_label(&self, analysis_id: &str, _label: &str) -> anyhow::Result<()> {
        anyhow::bail!("cannot relabel analysis {analysis_id}: snapshots are read-only")
    }
}
