use crate::error::FetchError;
use crate::model::{ContainerKind, Record};
use crate::requirement::Requirements;
use crate::source::AcquisitionSource;
use crate::template::{Template, TemplateSet};
use serde_json::Value;
use std::cell::Cell;
use std::collections::BTreeMap;

pub fn session(value: Value) -> Record {
    Record::from_json(ContainerKind::Session, value).expect("session fixture must be a mapping")
}

pub fn acquisition(value: Value) -> Record {
    Record::from_json(ContainerKind::Acquisition, value)
        .expect("acquisition fixture must be a mapping")
}

pub fn file(value: Value) -> Record {
    Record::from_json(ContainerKind::File, value).expect("file fixture must be a mapping")
}

pub fn requirements(value: Value) -> Requirements {
    Requirements::from_json(&value, "test").expect("requirement fixture must parse")
}

pub fn template(value: Value) -> Template {
    Template::from_json(&value, "test").expect("template fixture must parse")
}

pub fn templates(values: Vec<Value>) -> TemplateSet {
    TemplateSet::from_json_list(&values).expect("template fixtures must parse")
}

/// Acquisitions keyed by session id; counts fetches.
#[derive(Default)]
pub struct InMemoryAcquisitions {
    by_session: BTreeMap<String, Vec<Record>>,
    fetches: Cell<usize>,
}

impl InMemoryAcquisitions {
    pub fn with(mut self, session_id: &str, acquisitions: Vec<Record>) -> Self {
        self.by_session.insert(session_id.to_string(), acquisitions);
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.get()
    }
}

impl AcquisitionSource for InMemoryAcquisitions {
    fn acquisitions(&self, session: &Record) -> Result<Vec<Record>, FetchError> {
        self.fetches.set(self.fetches.get() + 1);
        let id = session.id().unwrap_or_default();
        Ok(self.by_session.get(id).cloned().unwrap_or_default())
    }
}

/// A source that must never be asked.
pub struct NoAcquisitions;

impl AcquisitionSource for NoAcquisitions {
    fn acquisitions(&self, session: &Record) -> Result<Vec<Record>, FetchError> {
        panic!("unexpected acquisitions fetch for session {:?}", session.id());
    }
}

pub struct FailingSource;

impl AcquisitionSource for FailingSource {
    fn acquisitions(&self, session: &Record) -> Result<Vec<Record>, FetchError> {
        Err(FetchError::new(
            session.id().unwrap_or("<none>"),
            "connection reset",
        ))
    }
}
