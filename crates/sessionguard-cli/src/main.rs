//! CLI entry point for sessionguard.
//!
//! This module is intentionally thin: it handles argument parsing, logging setup, and exit
//! codes. All business logic lives in the `sessionguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use sessionguard_app::{
    TemplatesInput, ValidationInput, report_exit_code, run_templates, run_validation,
};
use sessionguard_repo::{ApiKey, HttpSource, ProjectSource, SnapshotSource};
use sessionguard_settings::Overrides;
use std::process::ExitCode;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sessionguard",
    version,
    about = "Check project sessions against session templates"
)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to sessionguard config TOML.
    #[arg(long, default_value = "sessionguard.toml", global = true)]
    config: Utf8PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Project snapshot file (YAML or JSON).
    #[arg(long, conflicts_with = "project", required_unless_present = "project")]
    snapshot: Option<Utf8PathBuf>,

    /// Remote project, as `group/project` or a project id.
    #[arg(long)]
    project: Option<String>,

    /// API key for the remote instance (`host[:port]:secret`).
    #[arg(long, env = "SESSIONGUARD_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Template file (YAML or JSON) used instead of the project's templates.
    #[arg(long)]
    templates: Option<Utf8PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check every session and write the failure report.
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Check only the first N sessions (zero or negative: all).
        #[arg(long, allow_negative_numbers = true)]
        stop_after_n_sessions: Option<i64>,

        /// Directory for `validation-report.csv` and `template-list.yml`.
        #[arg(long)]
        output_dir: Option<Utf8PathBuf>,

        /// Worker threads for session evaluation.
        #[arg(long)]
        jobs: Option<u32>,

        /// Analysis to relabel with the failing-session count.
        #[arg(long, requires = "project")]
        analysis_id: Option<String>,

        /// Exit 0 even when sessions fail.
        #[arg(long)]
        no_fail: bool,
    },

    /// Print the effective template list as YAML.
    Templates {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.cmd {
        Commands::Check {
            source,
            stop_after_n_sessions,
            output_dir,
            jobs,
            analysis_id,
            no_fail,
        } => {
            let overrides = Overrides {
                stop_after_n_sessions: *stop_after_n_sessions,
                output_dir: output_dir.clone(),
                jobs: *jobs,
                fail_on_noncompliant: no_fail.then_some(false),
            };
            cmd_check(&cli.config, source, overrides, analysis_id.as_deref())
        }
        Commands::Templates { source } => cmd_templates(source),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("sessionguard error: {err:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_check(
    config: &Utf8Path,
    args: &SourceArgs,
    overrides: Overrides,
    analysis_id: Option<&str>,
) -> anyhow::Result<u8> {
    // Missing config file is allowed (defaults apply).
    let config_text = read_optional(config).context("read config")?;
    let source = open_source(args)?;
    let template_override = load_template_override(args)?;

    let output = run_validation(ValidationInput {
        source: source.as_ref(),
        config_text: &config_text,
        overrides,
        template_override,
        analysis_id,
    })?;

    let summary = &output.report.summary;
    let started_at = summary.started_at.format(&Rfc3339).unwrap_or_default();
    tracing::info!(
        project = summary.project.as_deref().unwrap_or("<unknown>"),
        templates = summary.templates,
        sessions = summary.sessions_scanned,
        noncompliant = summary.sessions_noncompliant,
        started_at = %started_at,
        elapsed_ms = %summary.elapsed().whole_milliseconds(),
        "run finished"
    );
    match &output.report_path {
        Some(path) => println!(
            "sessionguard: {} of {} session(s) non-compliant; report written to {path}",
            summary.sessions_noncompliant, summary.sessions_scanned
        ),
        None => println!(
            "sessionguard: {} session(s) checked against {} template(s); all compliant",
            summary.sessions_scanned, summary.templates
        ),
    }

    let code = report_exit_code(&output.report, output.resolved_config.fail_on_noncompliant);
    Ok(u8::try_from(code).unwrap_or(1))
}

fn cmd_templates(args: &SourceArgs) -> anyhow::Result<u8> {
    let source = open_source(args)?;
    let template_override = load_template_override(args)?;
    let yaml = run_templates(TemplatesInput {
        source: source.as_ref(),
        template_override,
    })?;
    print!("{yaml}");
    Ok(0)
}

fn open_source(args: &SourceArgs) -> anyhow::Result<Box<dyn ProjectSource + Sync>> {
    if let Some(path) = &args.snapshot {
        tracing::debug!(snapshot = %path, "loading project snapshot");
        return Ok(Box::new(SnapshotSource::load(path)?));
    }

    let project = args
        .project
        .as_deref()
        .context("either --snapshot or --project is required")?;
    let raw_key = args
        .api_key
        .as_deref()
        .context("--project requires --api-key (or SESSIONGUARD_API_KEY)")?;
    let key = ApiKey::parse(raw_key)?;
    tracing::debug!(base = %key.base_url(), project, "connecting to remote instance");
    let source = HttpSource::connect(key, project)?;
    tracing::info!(project_id = source.project_id(), "resolved project");
    Ok(Box::new(source))
}

fn load_template_override(args: &SourceArgs) -> anyhow::Result<Option<Vec<Value>>> {
    let Some(path) = &args.templates else {
        return Ok(None);
    };
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read templates: {path}"))?;
    let raw = sessionguard_settings::parse_templates_text(&text)
        .with_context(|| format!("parse templates: {path}"))?;
    Ok(Some(raw))
}

fn read_optional(path: &Utf8Path) -> anyhow::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err).with_context(|| format!("read {path}")),
    }
}
