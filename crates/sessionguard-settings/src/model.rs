use serde::{Deserialize, Serialize};

/// `sessionguard.toml` schema v1.
///
/// Every key is optional; unknown keys are ignored so newer configs still load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionguardConfigV1 {
    /// Only the first N sessions are checked. Zero or negative means all of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_after_n_sessions: Option<i64>,

    /// Where `validation-report.csv` and `template-list.yml` are written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    /// Worker threads for session evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_noncompliant: Option<bool>,

    /// Prefix of the analysis label set when sessions fail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_label_prefix: Option<String>,
}
