//! The `check` use case: validate every session of a project against its templates.

use crate::artifacts::write_text_file;
use crate::batch::evaluate_sessions;
use anyhow::Context;
use camino::Utf8PathBuf;
use serde_json::Value;
use sessionguard_render::{
    REPORT_FILE_NAME, TEMPLATE_LIST_FILE_NAME, render_report_csv, render_template_list,
};
use sessionguard_repo::ProjectSource;
use sessionguard_settings::{Overrides, ResolvedConfig, SessionguardConfigV1};
use sessionguard_types::{RunSummary, SessionRow, ValidationReport, Verdict};
use time::OffsetDateTime;
use tracing::{info, warn};

/// Input for the validation use case.
pub struct ValidationInput<'a> {
    /// Where projects, sessions and acquisitions come from.
    pub source: &'a (dyn ProjectSource + Sync),
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
    /// Raw templates replacing the project's own.
    pub template_override: Option<Vec<Value>>,
    /// Analysis to relabel when sessions fail.
    pub analysis_id: Option<&'a str>,
}

/// Output from the validation use case.
#[derive(Clone, Debug)]
pub struct ValidationOutput {
    pub report: ValidationReport,
    pub resolved_config: ResolvedConfig,
    /// Set when the CSV report was written.
    pub report_path: Option<Utf8PathBuf>,
    /// Set when the template list was written.
    pub template_list_path: Option<Utf8PathBuf>,
    /// The label applied to the analysis, if any.
    pub analysis_label: Option<String>,
}

/// Run the validation use case: resolve config, load templates and sessions, evaluate,
/// write artifacts.
pub fn run_validation(input: ValidationInput<'_>) -> anyhow::Result<ValidationOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse config (empty is allowed, defaults apply).
    let cfg = if input.config_text.trim().is_empty() {
        SessionguardConfigV1::default()
    } else {
        sessionguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };
    let resolved =
        sessionguard_settings::resolve_config(cfg, input.overrides).context("resolve config")?;

    let project = input.source.project().context("load project")?;
    let project_name = project.display_name().map(str::to_string);
    let raw_templates = input.template_override.unwrap_or(project.templates);

    let mut output = ValidationOutput {
        report: ValidationReport {
            summary: RunSummary {
                project: project_name.clone(),
                templates: 0,
                sessions_scanned: 0,
                sessions_noncompliant: 0,
                stopped_after: None,
                started_at,
                finished_at: started_at,
            },
            rows: Vec::new(),
        },
        resolved_config: resolved.clone(),
        report_path: None,
        template_list_path: None,
        analysis_label: None,
    };

    if raw_templates.is_empty() {
        warn!(
            project = project_name.as_deref().unwrap_or("<unknown>"),
            "project has no session templates; nothing to check"
        );
        output.report.summary.finished_at = OffsetDateTime::now_utc();
        return Ok(output);
    }

    let templates = sessionguard_settings::template_set(&raw_templates)?;
    output.report.summary.templates = count(templates.len());

    let list_path = resolved.output_dir.join(TEMPLATE_LIST_FILE_NAME);
    let list = render_template_list(&raw_templates)?;
    write_text_file(&list_path, &list).context("write template list")?;
    output.template_list_path = Some(list_path);

    let mut sessions = input.source.sessions().context("list sessions")?;
    if let Some(limit) = resolved.stop_after
        && sessions.len() > limit
    {
        info!(limit, total = sessions.len(), "checking only the first sessions");
        sessions.truncate(limit);
        output.report.summary.stopped_after = Some(count(limit));
    }
    output.report.summary.sessions_scanned = count(sessions.len());

    let verdicts = evaluate_sessions(&sessions, &templates, input.source, resolved.jobs)?;

    for (session, verdict) in sessions.iter().zip(verdicts) {
        let Verdict::NonCompliant { reasons } = verdict else {
            continue;
        };
        info!(session = session.id().unwrap_or("<unsaved>"), "session failed");
        output.report.rows.push(SessionRow {
            session_id: session.id().map(str::to_string),
            subject_code: session.subject_code().map(str::to_string),
            session_label: session.label().map(str::to_string),
            reasons,
        });
    }
    output.report.summary.sessions_noncompliant = count(output.report.rows.len());

    if !output.report.rows.is_empty() {
        let csv = render_report_csv(&output.report.rows, templates.len())?;
        let report_path = resolved.output_dir.join(REPORT_FILE_NAME);
        write_text_file(&report_path, &csv).context("write validation report")?;
        output.report_path = Some(report_path);

        if let Some(analysis_id) = input.analysis_id {
            let label = analysis_label(&resolved.analysis_label_prefix, output.report.rows.len());
            info!(analysis = analysis_id, label = %label, "updating analysis label");
            input
                .source
                .update_analysis_label(analysis_id, &label)
                .with_context(|| format!("relabel analysis {analysis_id}"))?;
            output.analysis_label = Some(label);
        }
    }

    output.report.summary.finished_at = OffsetDateTime::now_utc();
    Ok(output)
}

/// `<prefix>_ERROR_SESSION_COUNT_<n>`.
pub fn analysis_label(prefix: &str, failing_sessions: usize) -> String {
    format!("{prefix}_ERROR_SESSION_COUNT_{failing_sessions}")
}

/// Map a report to an exit code: 0 = all compliant, 2 = at least one session failed.
///
/// With `fail_on_noncompliant` off, failures still exit 0.
pub fn report_exit_code(report: &ValidationReport, fail_on_noncompliant: bool) -> i32 {
    if report.is_clean() || !fail_on_noncompliant {
        0
    } else {
        2
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
