use crate::{ProjectInfo, ProjectSource, session_records};
use anyhow::Context;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::AUTHORIZATION;
use serde_json::{Value, json};
use sessionguard_domain::{AcquisitionSource, ContainerKind, FetchError, Record};
use std::fmt;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A Flywheel-style API key: `host[:port]:secret`.
///
/// The whole key is sent with every request; host and port pick the API base URL.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    host: String,
    port: Option<u16>,
    raw: String,
}

impl ApiKey {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let raw = raw.trim();
        let parts: Vec<&str> = raw.split(':').collect();
        let (host, port) = match parts.as_slice() {
            [host, secret] if !host.is_empty() && !secret.is_empty() => (*host, None),
            [host, port, secret] if !host.is_empty() && !secret.is_empty() => {
                let port = port
                    .parse::<u16>()
                    .with_context(|| format!("invalid port `{port}` in API key"))?;
                (*host, Some(port))
            }
            _ => anyhow::bail!("API key must look like `host[:port]:secret`"),
        };
        Ok(Self {
            host: host.to_string(),
            port,
            raw: raw.to_string(),
        })
    }

    pub fn base_url(&self) -> String {
        match self.port {
            Some(port) => format!("https://{}:{port}/api", self.host),
            None => format!("https://{}/api", self.host),
        }
    }

    fn authorization(&self) -> String {
        format!("scitran-user {}", self.raw)
    }
}

// Keep the secret out of logs.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

/// A project on a remote instance, read over its REST API.
#[derive(Debug)]
pub struct HttpSource {
    client: Client,
    key: ApiKey,
    base: String,
    project_id: String,
}

impl HttpSource {
    /// Connect and resolve `project`, either a `group/project` path or a project id.
    pub fn connect(key: ApiKey, project: &str) -> anyhow::Result<Self> {
        let base = key.base_url();
        Self::with_base_url(key, base, project)
    }

    /// Like [`HttpSource::connect`], against an explicit API root
    /// such as `http://127.0.0.1:8080/api`.
    pub(crate) fn with_base_url(key: ApiKey, base: String, project: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sessionguard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build HTTP client")?;

        let mut source = Self {
            client,
            key,
            base,
            project_id: String::new(),
        };
        source.project_id = match project.split_once('/') {
            Some((group, label)) => source
                .lookup(group, label)
                .with_context(|| format!("look up project {project}"))?,
            None => project.to_string(),
        };
        Ok(source)
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, self.key.authorization())
    }

    fn get_json(&self, path: &str) -> anyhow::Result<Value> {
        let response = self
            .authorized(self.client.get(self.url(path)))
            .send()
            .with_context(|| format!("GET {path}"))?
            .error_for_status()
            .with_context(|| format!("GET {path}"))?;
        response
            .json::<Value>()
            .with_context(|| format!("decode response of GET {path}"))
    }

    fn lookup(&self, group: &str, project: &str) -> anyhow::Result<String> {
        let response: Value = self
            .authorized(self.client.post(self.url("lookup")))
            .json(&json!({"path": [group, project]}))
            .send()
            .context("POST lookup")?
            .error_for_status()
            .context("POST lookup")?
            .json()
            .context("decode lookup response")?;
        response
            .get("_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .context("lookup response has no `_id`")
    }
}

fn expect_list(value: Value, what: &str) -> anyhow::Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        _ => anyhow::bail!("expected a list of {what}"),
    }
}

impl AcquisitionSource for HttpSource {
    fn acquisitions(&self, session: &Record) -> Result<Vec<Record>, FetchError> {
        let id = session
            .id()
            .ok_or_else(|| FetchError::new("<none>", "session has no id"))?;
        let items = self
            .get_json(&format!("sessions/{id}/acquisitions"))
            .and_then(|v| expect_list(v, "acquisitions"))
            .map_err(|err| FetchError::new(id, format!("{err:#}")))?;
        Ok(items
            .into_iter()
            .filter_map(|v| Record::from_json(ContainerKind::Acquisition, v))
            .collect())
    }
}

impl ProjectSource for HttpSource {
    fn project(&self) -> anyhow::Result<ProjectInfo> {
        let value = self.get_json(&format!("projects/{}", self.project_id))?;
        Ok(ProjectInfo::from_json(&value))
    }

    fn sessions(&self) -> anyhow::Result<Vec<Record>> {
        let value = self.get_json(&format!("projects/{}/sessions", self.project_id))?;
        Ok(session_records(expect_list(value, "sessions")?))
    }

    fn update_analysis_label(&self, analysis_id: &str, label: &str) -> anyhow::Result<()> {
        let path = format!("analyses/{analysis_id}");
        self.authorized(self.client.put(self.url(&path)))
            .json(&json!({"label": label}))
            .send()
            .with_context(|| format!("PUT {path}"))?
            .error_for_status()
            .with_context(|| format!("PUT {path}"))?;
        Ok(())
    }
}
