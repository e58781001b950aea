//! Compliance evaluation: requirements against records, templates against sessions.

use crate::error::FetchError;
use crate::matcher::Pattern;
use crate::model::{ContainerKind, Record, is_present};
use crate::requirement::{Clause, QuantifiedClause, Requirement, Requirements};
use crate::source::AcquisitionSource;
use crate::template::{SessionRequirement, Template, TemplateSet};
use serde_json::{Map, Value};
use sessionguard_types::{Reason, Verdict, ids};
use std::borrow::Cow;

/// Result of a clause check. `Err` is a mismatch reported as data, never a failure of the
/// engine itself.
pub type Check = Result<(), Reason>;

const CLASSIFICATION_KEY: &str = "classification";

/// Check one attribute of `record` against one requirement value.
pub fn check_req(record: &Record, key: &str, requirement: &Requirement) -> Check {
    check_req_in(record.kind(), record.attributes(), key, requirement)
}

fn check_req_in(
    kind: ContainerKind,
    attributes: &Map<String, Value>,
    key: &str,
    requirement: &Requirement,
) -> Check {
    let resolved = resolve(attributes, key);

    if !is_present(&resolved) {
        return Err(Reason::new(
            ids::CODE_NO_VALUE,
            format!("No {kind} {key} matching {requirement} (no value found)"),
        ));
    }

    match requirement {
        Requirement::Nested(entries) => {
            let Value::Object(sub) = resolved.as_ref() else {
                return Err(Reason::new(
                    ids::CODE_SHAPE_MISMATCH,
                    format!("No {kind} {key} matching {requirement} (value is not a mapping)"),
                ));
            };
            for (sub_key, sub_requirement) in entries {
                check_req_in(kind, sub, sub_key, sub_requirement)?;
            }
            Ok(())
        }
        Requirement::Pattern(pattern) => match_pattern(kind, key, &resolved, pattern),
        Requirement::ListPattern(patterns) => {
            for pattern in patterns {
                match_pattern(kind, key, &resolved, pattern)?;
            }
            Ok(())
        }
    }
}

/// `classification` is a category -> values mapping; requirements see its values flattened
/// into one list, in category order.
fn resolve<'a>(attributes: &'a Map<String, Value>, key: &str) -> Cow<'a, Value> {
    if key != CLASSIFICATION_KEY {
        return match attributes.get(key) {
            Some(v) => Cow::Borrowed(v),
            None => Cow::Owned(Value::Null),
        };
    }

    match attributes.get(key) {
        Some(Value::Object(categories)) => {
            let mut flat = Vec::new();
            for values in categories.values() {
                match values {
                    Value::Array(items) => flat.extend(items.iter().cloned()),
                    Value::Null => {}
                    scalar => flat.push(scalar.clone()),
                }
            }
            Cow::Owned(Value::Array(flat))
        }
        Some(list @ Value::Array(_)) => Cow::Borrowed(list),
        _ => Cow::Owned(Value::Null),
    }
}

fn match_pattern(kind: ContainerKind, key: &str, value: &Value, pattern: &Pattern) -> Check {
    let matched = match value {
        Value::Array(items) => items.iter().any(|item| pattern.matches_value(item)),
        Value::Object(_) => {
            return Err(Reason::new(
                ids::CODE_SHAPE_MISMATCH,
                format!("No {kind} {key} matching {pattern} (value is a mapping)"),
            ));
        }
        scalar => pattern.matches_value(scalar),
    };

    if matched {
        Ok(())
    } else {
        Err(Reason::new(
            ids::CODE_NO_MATCH,
            format!("No {kind} {key} matching {pattern}"),
        ))
    }
}

/// Check every clause of a container requirement against `record`, stopping at the first
/// mismatch.
pub fn check_cont(record: &Record, requirements: &Requirements) -> Check {
    for clause in requirements.clauses() {
        match clause {
            Clause::Attribute { key, requirement } => check_req(record, key, requirement)?,
            Clause::Files(quantified) => {
                for q in quantified {
                    let live = record.files().iter().filter(|f| !f.is_deleted());
                    let found = count_matches(live, q);
                    if found < q.minimum {
                        return Err(Reason::new(
                            ids::CODE_INSUFFICIENT_FILES,
                            format!(
                                "Failed to find {} file(s) with requirement {} ({found} found)",
                                q.minimum, q.requirements
                            ),
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Count candidates satisfying the clause, in iteration order, stopping once `minimum`
/// matches are found.
fn count_matches<'r>(
    candidates: impl IntoIterator<Item = &'r Record>,
    clause: &QuantifiedClause,
) -> usize {
    let mut count = 0;
    for candidate in candidates {
        if check_cont(candidate, &clause.requirements).is_err() {
            continue;
        }
        count += 1;
        if count >= clause.minimum {
            break;
        }
    }
    count
}

/// Acquisitions of one session, fetched on first use.
struct Acquisitions<'a, S: ?Sized> {
    session: &'a Record,
    source: &'a S,
    fetched: Option<Vec<Record>>,
}

impl<'a, S: AcquisitionSource + ?Sized> Acquisitions<'a, S> {
    fn new(session: &'a Record, source: &'a S) -> Self {
        Self {
            session,
            source,
            fetched: None,
        }
    }

    fn get(&mut self) -> Result<&[Record], FetchError> {
        let records = match self.fetched.take() {
            Some(records) => records,
            None => self.source.acquisitions(self.session)?,
        };
        Ok(self.fetched.insert(records).as_slice())
    }
}

/// Check a session against one template.
///
/// Fetch failures are the only `Err`; a template mismatch is `Ok(Err(reason))`.
pub fn check_session_for_single_template<S: AcquisitionSource + ?Sized>(
    session: &Record,
    template: &Template,
    source: &S,
) -> Result<Check, FetchError> {
    let mut acquisitions = Acquisitions::new(session, source);
    evaluate_template(session, template, &mut acquisitions)
}

fn evaluate_template<S: AcquisitionSource + ?Sized>(
    session: &Record,
    template: &Template,
    acquisitions: &mut Acquisitions<'_, S>,
) -> Result<Check, FetchError> {
    if let Some(section) = &template.session
        && let Err(reason) = check_session_section(session, section)
    {
        return Ok(Err(reason));
    }

    if template.acquisitions.is_empty() {
        return Ok(Ok(()));
    }

    if session.id().is_none() {
        // Never persisted, so it cannot own acquisitions yet.
        return Ok(Err(Reason::new(
            ids::CODE_MISSING_ID,
            "Session does not have an id",
        )));
    }

    let children = acquisitions.get()?;
    for q in &template.acquisitions {
        let found = count_matches(children, q);
        if found < q.minimum {
            return Ok(Err(Reason::new(
                ids::CODE_INSUFFICIENT_ACQUISITIONS,
                format!(
                    "Failed to find {} acquisition(s) with requirement {} ({found} found)",
                    q.minimum, q.requirements
                ),
            )));
        }
    }

    Ok(Ok(()))
}

fn check_session_section(session: &Record, section: &SessionRequirement) -> Check {
    let label = session.label().unwrap_or_default();

    if let Some(pattern) = &section.label
        && !pattern.is_match(label)
    {
        return Err(Reason::new(
            ids::CODE_LABEL_MISMATCH,
            format!("Session label \"{label}\" does not match {pattern}"),
        ));
    }

    check_cont(session, &section.requirements).map_err(|inner| {
        Reason::new(
            ids::CODE_SESSION_REQUIREMENT,
            format!(
                "Session \"{label}\" does not match requirement {}: {}",
                section.requirements, inner.message
            ),
        )
    })
}

/// Check a session against every template in order.
///
/// The first matching template makes the session compliant. Otherwise the verdict carries
/// one reason per template, in template order. Acquisitions are fetched at most once.
pub fn is_session_compliant<S: AcquisitionSource + ?Sized>(
    session: &Record,
    templates: &TemplateSet,
    source: &S,
) -> Result<Verdict, FetchError> {
    let mut acquisitions = Acquisitions::new(session, source);
    let mut reasons = Vec::with_capacity(templates.len());

    for template in templates {
        match evaluate_template(session, template, &mut acquisitions)? {
            Ok(()) => return Ok(Verdict::Compliant),
            Err(reason) => reasons.push(reason),
        }
    }

    Ok(Verdict::NonCompliant { reasons })
}
