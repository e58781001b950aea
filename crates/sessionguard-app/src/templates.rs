//! The `templates` use case: print the effective template list.

use anyhow::Context;
use serde_json::Value;
use sessionguard_render::render_template_list;
use sessionguard_repo::ProjectSource;
use tracing::warn;

pub struct TemplatesInput<'a> {
    pub source: &'a dyn ProjectSource,
    /// Raw templates replacing the project's own.
    pub template_override: Option<Vec<Value>>,
}

/// Render the templates a `check` run would use, after validating them.
///
/// Returns an empty string when there are none.
pub fn run_templates(input: TemplatesInput<'_>) -> anyhow::Result<String> {
    let raw = match input.template_override {
        Some(raw) => raw,
        None => input.source.project().context("load project")?.templates,
    };
    if raw.is_empty() {
        warn!("project has no session templates");
        return Ok(String::new());
    }
    sessionguard_settings::template_set(&raw)?;
    render_template_list(&raw)
}
