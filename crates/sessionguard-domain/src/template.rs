//! Session templates: an own-record section and quantified acquisition clauses.

use crate::error::TemplateError;
use crate::matcher::LabelPattern;
use crate::requirement::{QuantifiedClause, Requirements, expect_mapping};
use serde_json::{Map, Value};

pub const SESSION_KEY: &str = "session";
pub const ACQUISITIONS_KEY: &str = "acquisitions";
pub const LABEL_KEY: &str = "label";

/// The `session` section. `label` is split out because it is matched from the start of
/// the session label rather than searched.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionRequirement {
    pub label: Option<LabelPattern>,
    pub requirements: Requirements,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Template {
    pub session: Option<SessionRequirement>,
    /// Empty when the template has no acquisitions phase.
    pub acquisitions: Vec<QuantifiedClause>,
}

impl Template {
    /// Parse one template. Unknown top-level keys are ignored; empty sections are treated
    /// as absent.
    pub fn from_json(value: &Value, path: &str) -> Result<Self, TemplateError> {
        let map = expect_mapping(value, path)?;

        let session = match map.get(SESSION_KEY) {
            Some(section) => parse_session(section, &format!("{path}.{SESSION_KEY}"))?,
            None => None,
        };

        let acquisitions = match map.get(ACQUISITIONS_KEY) {
            Some(Value::Null) | None => Vec::new(),
            Some(section) => {
                QuantifiedClause::list_from_json(section, &format!("{path}.{ACQUISITIONS_KEY}"))?
            }
        };

        Ok(Self {
            session,
            acquisitions,
        })
    }
}

fn parse_session(value: &Value, path: &str) -> Result<Option<SessionRequirement>, TemplateError> {
    if value.is_null() {
        return Ok(None);
    }
    let map = expect_mapping(value, path)?;
    if map.is_empty() {
        return Ok(None);
    }

    let label = match map.get(LABEL_KEY) {
        Some(Value::String(s)) if !s.is_empty() => Some(LabelPattern::new(s).map_err(|err| {
            TemplateError::InvalidPattern {
                path: format!("{path}.{LABEL_KEY}"),
                pattern: s.clone(),
                source: err,
            }
        })?),
        Some(Value::String(_)) | Some(Value::Null) | None => None,
        Some(other) => {
            return Err(TemplateError::UnexpectedShape {
                path: format!("{path}.{LABEL_KEY}"),
                expected: "a pattern string",
                found: crate::error::json_kind(other),
            });
        }
    };

    let rest: Map<String, Value> = map
        .iter()
        .filter(|(k, _)| k.as_str() != LABEL_KEY)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let requirements = Requirements::from_json(&Value::Object(rest), path)?;

    Ok(Some(SessionRequirement {
        label,
        requirements,
    }))
}

/// Ordered templates of a project. A session is compliant if any one of them matches.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TemplateSet {
    templates: Vec<Template>,
}

impl TemplateSet {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    /// Parse raw templates; errors are located as `templates[i]...`.
    pub fn from_json_list(values: &[Value]) -> Result<Self, TemplateError> {
        let templates = values
            .iter()
            .enumerate()
            .map(|(i, v)| Template::from_json(v, &format!("templates[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { templates })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Template> {
        self.templates.iter()
    }
}

impl<'a> IntoIterator for &'a TemplateSet {
    type Item = &'a Template;
    type IntoIter = std::slice::Iter<'a, Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.templates.iter()
    }
}
