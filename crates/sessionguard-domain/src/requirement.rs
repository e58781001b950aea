//! Typed requirement trees parsed from template JSON.
//!
//! Parsing happens once per run; evaluation only borrows the result, so a template can be
//! applied to any number of records without losing keys between uses.

use crate::error::{TemplateError, json_kind};
use crate::matcher::Pattern;
use crate::model::FILES_KEY;
use serde_json::{Map, Value};
use std::fmt;

/// Key carrying the count of a quantified clause.
pub const MINIMUM_KEY: &str = "minimum";

/// Expected value of one attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum Requirement {
    /// Regex searched in a scalar, or in any element of a list.
    Pattern(Pattern),
    /// Several patterns written as a list; every one must be satisfied.
    ListPattern(Vec<Pattern>),
    /// Sub-requirements applied to a mapping-valued attribute.
    Nested(Vec<(String, Requirement)>),
}

/// "At least `minimum` children satisfy `requirements`."
#[derive(Clone, Debug, PartialEq)]
pub struct QuantifiedClause {
    pub requirements: Requirements,
    pub minimum: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    Attribute { key: String, requirement: Requirement },
    /// The reserved `files` key: quantified clauses over the record's own files.
    Files(Vec<QuantifiedClause>),
}

/// A container requirement: clauses in template declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Requirements {
    clauses: Vec<Clause>,
}

impl Requirements {
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Parse a requirement mapping. `path` prefixes error locations.
    pub fn from_json(value: &Value, path: &str) -> Result<Self, TemplateError> {
        let map = expect_mapping(value, path)?;
        Self::from_map(map, path)
    }

    pub(crate) fn from_map(map: &Map<String, Value>, path: &str) -> Result<Self, TemplateError> {
        let mut clauses = Vec::with_capacity(map.len());
        for (key, value) in map {
            let child = format!("{path}.{key}");
            let clause = if key == FILES_KEY {
                Clause::Files(QuantifiedClause::list_from_json(value, &child)?)
            } else {
                Clause::Attribute {
                    key: key.clone(),
                    requirement: Requirement::from_json(value, &child)?,
                }
            };
            clauses.push(clause);
        }
        Ok(Self { clauses })
    }

    /// Template-shaped JSON, used when printing a requirement inside a reason.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for clause in &self.clauses {
            match clause {
                Clause::Attribute { key, requirement } => {
                    map.insert(key.clone(), requirement.to_json());
                }
                Clause::Files(quantified) => {
                    map.insert(
                        FILES_KEY.to_string(),
                        Value::Array(quantified.iter().map(QuantifiedClause::to_json).collect()),
                    );
                }
            }
        }
        Value::Object(map)
    }
}

impl fmt::Display for Requirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Requirement {
    pub fn from_json(value: &Value, path: &str) -> Result<Self, TemplateError> {
        match value {
            Value::String(s) => Ok(Requirement::Pattern(compile(s, path)?)),
            Value::Array(items) => {
                let patterns = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let item_path = format!("{path}[{i}]");
                        match item {
                            Value::String(s) => compile(s, &item_path),
                            other => Err(TemplateError::UnexpectedShape {
                                path: item_path,
                                expected: "a pattern string",
                                found: json_kind(other),
                            }),
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Requirement::ListPattern(patterns))
            }
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, sub) in map {
                    let sub = Requirement::from_json(sub, &format!("{path}.{key}"))?;
                    entries.push((key.clone(), sub));
                }
                Ok(Requirement::Nested(entries))
            }
            other => Err(TemplateError::UnexpectedShape {
                path: path.to_string(),
                expected: "a pattern, a list of patterns, or a mapping",
                found: json_kind(other),
            }),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Requirement::Pattern(p) => Value::String(p.as_str().to_string()),
            Requirement::ListPattern(ps) => Value::Array(
                ps.iter()
                    .map(|p| Value::String(p.as_str().to_string()))
                    .collect(),
            ),
            Requirement::Nested(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, r)| (k.clone(), r.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Bare patterns print unquoted, as written in the template.
            Requirement::Pattern(p) => write!(f, "{p}"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl QuantifiedClause {
    /// Parse a list of `{..., minimum: N}` mappings.
    pub fn list_from_json(value: &Value, path: &str) -> Result<Vec<Self>, TemplateError> {
        let Value::Array(items) = value else {
            return Err(TemplateError::UnexpectedShape {
                path: path.to_string(),
                expected: "a list of quantified clauses",
                found: json_kind(value),
            });
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| QuantifiedClause::from_json(item, &format!("{path}[{i}]")))
            .collect()
    }

    pub fn from_json(value: &Value, path: &str) -> Result<Self, TemplateError> {
        let map = expect_mapping(value, path)?;
        let minimum = match map.get(MINIMUM_KEY) {
            None => {
                return Err(TemplateError::MissingMinimum {
                    path: path.to_string(),
                });
            }
            Some(v) => v.as_u64().ok_or_else(|| TemplateError::InvalidMinimum {
                path: format!("{path}.{MINIMUM_KEY}"),
                found: v.to_string(),
            })?,
        };
        let minimum = usize::try_from(minimum).map_err(|_| TemplateError::InvalidMinimum {
            path: format!("{path}.{MINIMUM_KEY}"),
            found: minimum.to_string(),
        })?;

        let rest: Map<String, Value> = map
            .iter()
            .filter(|(k, _)| k.as_str() != MINIMUM_KEY)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let requirements = Requirements::from_map(&rest, path)?;

        Ok(Self {
            requirements,
            minimum,
        })
    }

    pub fn to_json(&self) -> Value {
        let mut value = self.requirements.to_json();
        if let Value::Object(map) = &mut value {
            map.insert(MINIMUM_KEY.to_string(), Value::from(self.minimum));
        }
        value
    }
}

fn compile(source: &str, path: &str) -> Result<Pattern, TemplateError> {
    Pattern::new(source).map_err(|source_err| TemplateError::InvalidPattern {
        path: path.to_string(),
        pattern: source.to_string(),
        source: source_err,
    })
}

pub(crate) fn expect_mapping<'a>(
    value: &'a Value,
    path: &str,
) -> Result<&'a Map<String, Value>, TemplateError> {
    value.as_object().ok_or_else(|| TemplateError::UnexpectedShape {
        path: path.to_string(),
        expected: "a mapping",
        found: json_kind(value),
    })
}
