//! Front-matter block at the head of a note: `---`, YAML, `---`, body.

use serde_yaml::{Mapping, Value};

pub const DELIMITER: &str = "---";

/// Key/value metadata parsed from a note's front matter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata(Mapping);

impl Metadata {
    pub fn from_mapping(mapping: Mapping) -> Self {
        Self(mapping)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn title(&self) -> Option<String> {
        self.text("title")
    }

    pub fn preview(&self) -> Option<String> {
        self.text("preview")
    }

    pub fn last_updated(&self) -> Option<String> {
        self.text("last_updated")
    }

    /// Only an explicit boolean `show: false` unpublishes a note.
    pub fn is_hidden(&self) -> bool {
        matches!(self.get("show"), Some(Value::Bool(false)))
    }

    /// String-keyed entries as JSON, for the manifest.
    pub fn to_json(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        for (key, value) in &self.0 {
            let Some(key) = key.as_str() else {
                continue;
            };
            if let Ok(json) = serde_json::to_value(value) {
                out.insert(key.to_string(), json);
            }
        }
        serde_json::Value::Object(out)
    }

    fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_text).filter(|s| !s.is_empty())
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Splits raw note text into the YAML span and the body.
///
/// The closing delimiter is the next `---` after the opening one, wherever it
/// sits. Without a closing delimiter the text is returned untouched as body.
pub fn split(raw: &str) -> (Option<&str>, &str) {
    if !raw.starts_with(DELIMITER) {
        return (None, raw);
    }
    let after_open = &raw[DELIMITER.len()..];
    match after_open.find(DELIMITER) {
        Some(end) => {
            let yaml = after_open[..end].trim();
            let body = after_open[end + DELIMITER.len()..].trim();
            (Some(yaml), body)
        }
        None => (None, raw),
    }
}

/// Parses the front matter of `raw`, returning metadata and the body.
///
/// Invalid YAML is logged against `id` and yields empty metadata; it never
/// fails the note.
pub fn parse(id: &str, raw: &str) -> (Metadata, String) {
    let (yaml, body) = split(raw);
    let metadata = match yaml {
        Some(yaml) if !yaml.is_empty() => match serde_yaml::from_str::<Value>(yaml) {
            Ok(Value::Mapping(mapping)) => Metadata::from_mapping(mapping),
            Ok(_) => Metadata::default(),
            Err(err) => {
                log::warn!("malformed front matter in {id}: {err}");
                Metadata::default()
            }
        },
        _ => Metadata::default(),
    };
    (metadata, body.to_string())
}
