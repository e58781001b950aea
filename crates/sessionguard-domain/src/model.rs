use serde_json::{Map, Value};
use std::fmt;

/// Attribute holding the inline file collection of any record.
pub const FILES_KEY: &str = "files";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Session,
    Acquisition,
    File,
}

impl ContainerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::Session => "session",
            ContainerKind::Acquisition => "acquisition",
            ContainerKind::File => "file",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A read-only metadata record: attributes plus its inline files.
///
/// Records are built by the adapters from JSON and never mutated by the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    kind: ContainerKind,
    attributes: Map<String, Value>,
    files: Vec<Record>,
}

impl Record {
    /// Build a record, moving a `files` list out of the attributes into file records.
    ///
    /// Non-mapping entries of `files` are dropped.
    pub fn new(kind: ContainerKind, mut attributes: Map<String, Value>) -> Self {
        let files = match attributes.remove(FILES_KEY) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| Record::from_json(ContainerKind::File, item))
                .collect(),
            _ => Vec::new(),
        };
        Self {
            kind,
            attributes,
            files,
        }
    }

    /// `None` unless `value` is a JSON mapping.
    pub fn from_json(kind: ContainerKind, value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Record::new(kind, map)),
            _ => None,
        }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn files(&self) -> &[Record] {
        &self.files
    }

    /// Persisted identifier (`_id`, falling back to `id`). Empty strings count as missing.
    pub fn id(&self) -> Option<&str> {
        ["_id", "id"]
            .iter()
            .filter_map(|key| self.get(key).and_then(Value::as_str))
            .find(|id| !id.is_empty())
    }

    pub fn label(&self) -> Option<&str> {
        self.get("label").and_then(Value::as_str)
    }

    /// Owning subject code: `subject.code` from the nested `subject` mapping, or a flat
    /// `subject.code` attribute.
    pub fn subject_code(&self) -> Option<&str> {
        self.get("subject")
            .and_then(|subject| subject.get("code"))
            .and_then(Value::as_str)
            .or_else(|| self.get("subject.code").and_then(Value::as_str))
    }

    /// Files flagged deleted never count towards quantified clauses.
    pub fn is_deleted(&self) -> bool {
        self.get("deleted").is_some_and(|v| !v.is_null())
    }
}

/// Absent-or-empty check used before any comparison.
///
/// Null, `false`, zero, the empty string, the empty list and the empty mapping all read as
/// "no value"; existing templates depend on empty lists behaving like missing attributes.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
