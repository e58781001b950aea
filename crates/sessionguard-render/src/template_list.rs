use anyhow::Context;
use serde_json::{Map, Value};

pub const TEMPLATE_LIST_FILE_NAME: &str = "template-list.yml";

pub fn template_key(index: usize) -> String {
    format!("templates{index}")
}

/// Dump raw templates as a `templates{i}` mapping, in template order.
pub fn render_template_list(templates: &[Value]) -> anyhow::Result<String> {
    let map: Map<String, Value> = templates
        .iter()
        .enumerate()
        .map(|(i, t)| (template_key(i), t.clone()))
        .collect();
    serde_yaml::to_string(&Value::Object(map)).context("serialize template list")
}
