//! Evaluation of many sessions against one template set.

use anyhow::Context;
use rayon::prelude::*;
use sessionguard_domain::{AcquisitionSource, Record, TemplateSet, is_session_compliant};
use sessionguard_types::Verdict;
use tracing::{debug, info};

/// Evaluate every session, in order. With `jobs > 1` sessions are spread over a worker
/// pool; verdicts still come back in session order.
///
/// The first fetch failure aborts the batch.
pub fn evaluate_sessions<S>(
    sessions: &[Record],
    templates: &TemplateSet,
    source: &S,
    jobs: usize,
) -> anyhow::Result<Vec<Verdict>>
where
    S: AcquisitionSource + Sync + ?Sized,
{
    if jobs <= 1 {
        return sessions
            .iter()
            .map(|s| evaluate_one(s, templates, source))
            .collect();
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("build worker pool")?;
    pool.install(|| {
        sessions
            .par_iter()
            .map(|s| evaluate_one(s, templates, source))
            .collect()
    })
}

fn evaluate_one<S>(session: &Record, templates: &TemplateSet, source: &S) -> anyhow::Result<Verdict>
where
    S: AcquisitionSource + ?Sized,
{
    let id = session.id().unwrap_or("<unsaved>");
    info!(session = id, "processing session");

    let verdict = is_session_compliant(session, templates, source)
        .with_context(|| format!("evaluate session {id}"))?;

    match &verdict {
        Verdict::Compliant => debug!(session = id, "session matches a template"),
        Verdict::NonCompliant { reasons } => {
            for (template, reason) in reasons.iter().enumerate() {
                debug!(session = id, template, code = %reason.code, "{}", reason.message);
            }
        }
    }
    Ok(verdict)
}
