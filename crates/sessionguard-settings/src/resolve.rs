use crate::model::SessionguardConfigV1;
use camino::Utf8PathBuf;

pub const DEFAULT_ANALYSIS_LABEL_PREFIX: &str = "session-template-validation";

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub stop_after_n_sessions: Option<i64>,
    pub output_dir: Option<Utf8PathBuf>,
    pub jobs: Option<u32>,
    pub fail_on_noncompliant: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// `None` checks every session.
    pub stop_after: Option<usize>,
    pub output_dir: Utf8PathBuf,
    pub jobs: usize,
    pub fail_on_noncompliant: bool,
    pub analysis_label_prefix: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            stop_after: None,
            output_dir: Utf8PathBuf::from("."),
            jobs: 1,
            fail_on_noncompliant: true,
            analysis_label_prefix: DEFAULT_ANALYSIS_LABEL_PREFIX.to_string(),
        }
    }
}

pub fn resolve_config(
    cfg: SessionguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let mut resolved = ResolvedConfig::default();

    if let Some(n) = overrides.stop_after_n_sessions.or(cfg.stop_after_n_sessions) {
        resolved.stop_after = parse_stop_after(n);
    }

    if let Some(dir) = overrides
        .output_dir
        .or_else(|| cfg.output_dir.map(Utf8PathBuf::from))
    {
        if dir.as_str().is_empty() {
            anyhow::bail!("output_dir must not be empty");
        }
        resolved.output_dir = dir;
    }

    if let Some(jobs) = overrides.jobs.or(cfg.jobs) {
        if jobs == 0 {
            anyhow::bail!("jobs must be at least 1");
        }
        resolved.jobs = jobs as usize;
    }

    if let Some(fail) = overrides.fail_on_noncompliant.or(cfg.fail_on_noncompliant) {
        resolved.fail_on_noncompliant = fail;
    }

    if let Some(prefix) = cfg.analysis_label_prefix {
        if prefix.trim().is_empty() {
            anyhow::bail!("analysis_label_prefix must not be empty");
        }
        resolved.analysis_label_prefix = prefix;
    }

    Ok(resolved)
}

fn parse_stop_after(n: i64) -> Option<usize> {
    if n <= 0 {
        None
    } else {
        usize::try_from(n).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_config() {
        let resolved =
            resolve_config(SessionguardConfigV1::default(), Overrides::default()).expect("resolve");
        assert_eq!(resolved, ResolvedConfig::default());
        assert_eq!(resolved.output_dir, ".");
        assert_eq!(resolved.analysis_label_prefix, "session-template-validation");
    }

    #[test]
    fn overrides_beat_file_values() {
        let cfg = SessionguardConfigV1 {
            stop_after_n_sessions: Some(10),
            output_dir: Some("from-file".to_string()),
            jobs: Some(2),
            fail_on_noncompliant: Some(true),
            analysis_label_prefix: None,
        };
        let overrides = Overrides {
            stop_after_n_sessions: Some(3),
            output_dir: Some(Utf8PathBuf::from("from-cli")),
            jobs: None,
            fail_on_noncompliant: Some(false),
        };
        let resolved = resolve_config(cfg, overrides).expect("resolve");
        assert_eq!(resolved.stop_after, Some(3));
        assert_eq!(resolved.output_dir, "from-cli");
        assert_eq!(resolved.jobs, 2);
        assert!(!resolved.fail_on_noncompliant);
    }

    #[test]
    fn non_positive_limit_means_all_sessions() {
        for n in [0, -1, -50] {
            let cfg = SessionguardConfigV1 {
                stop_after_n_sessions: Some(n),
                ..Default::default()
            };
            let resolved = resolve_config(cfg, Overrides::default()).expect("resolve");
            assert_eq!(resolved.stop_after, None, "limit {n}");
        }
    }

    #[test]
    fn zero_jobs_is_rejected() {
        let err = resolve_config(
            SessionguardConfigV1::default(),
            Overrides {
                jobs: Some(0),
                ..Default::default()
            },
        )
        .expect_err("zero jobs");
        assert!(err.to_string().contains("jobs"));
    }

    #[test]
    fn custom_label_prefix_is_kept() {
        let cfg = SessionguardConfigV1 {
            analysis_label_prefix: Some("grp16-session-template-validation".to_string()),
            ..Default::default()
        };
        let resolved = resolve_config(cfg, Overrides::default()).expect("resolve");
        assert_eq!(
            resolved.analysis_label_prefix,
            "grp16-session-template-validation"
        );
    }
}
