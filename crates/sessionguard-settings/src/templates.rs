//! Template files: the override passed with `--templates`, or a `template-list.yml` written by
//! an earlier run.

use anyhow::Context;
use serde_json::Value;
use sessionguard_domain::TemplateSet;

const LIST_KEY: &str = "templates";

/// Parse a YAML or JSON template file into raw templates, in order.
///
/// Accepted shapes:
/// - a list of templates;
/// - `{templates: [...]}`;
/// - the `template-list.yml` mapping `templates0`, `templates1`, ... (ordered by index).
pub fn parse_templates_text(input: &str) -> anyhow::Result<Vec<Value>> {
    let doc: Value = serde_yaml::from_str(input).context("parse template file")?;

    match doc {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            if let Some(list) = map.remove(LIST_KEY) {
                return match list {
                    Value::Array(items) => Ok(items),
                    Value::Null => Ok(Vec::new()),
                    _ => anyhow::bail!("`{LIST_KEY}` must be a list of templates"),
                };
            }

            let mut indexed = Vec::with_capacity(map.len());
            for (key, template) in map {
                let index = key
                    .strip_prefix(LIST_KEY)
                    .and_then(|n| n.parse::<usize>().ok())
                    .with_context(|| {
                        format!("unexpected key `{key}` (expected `{LIST_KEY}<index>`)")
                    })?;
                indexed.push((index, template));
            }
            indexed.sort_by_key(|(index, _)| *index);
            Ok(indexed.into_iter().map(|(_, t)| t).collect())
        }
        _ => anyhow::bail!("template file must hold a list or a mapping of templates"),
    }
}

/// Parse raw templates into the typed set used by the engine.
pub fn template_set(raw: &[Value]) -> anyhow::Result<TemplateSet> {
    TemplateSet::from_json_list(raw).context("invalid template")
}
