//! Config parsing and override resolution, plus template-file parsing.
//!
//! This crate is IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod resolve;
mod templates;

pub use model::SessionguardConfigV1;
pub use resolve::{DEFAULT_ANALYSIS_LABEL_PREFIX, Overrides, ResolvedConfig};
pub use templates::{parse_templates_text, template_set};

/// Parse `sessionguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<SessionguardConfigV1> {
    let cfg: SessionguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective run configuration (file values, then CLI overrides).
pub fn resolve_config(
    cfg: SessionguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
