use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BrowserConfig {
    /// Prefix prepended to a note identifier to build its fetch URL.
    pub notes_dir: String,
    pub manifest_path: String,
    /// Note opened at position 0 once bootstrap finishes.
    pub root_note: String,
    pub backlink_preview_chars: usize,
    pub hover_preview_chars: usize,
    pub highlight_ms: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            notes_dir: "notes/".to_string(),
            manifest_path: "notes_index.json".to_string(),
            root_note: "index.md".to_string(),
            backlink_preview_chars: 250,
            hover_preview_chars: 500,
            highlight_ms: 300,
        }
    }
}

impl BrowserConfig {
    /// Parses a JSON override block. Unknown keys are ignored and missing keys
    /// keep their defaults; a malformed block yields the defaults.
    pub fn from_json(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<BrowserConfig>(text) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed browser config: {err}");
                Self::default()
            }
        }
    }

    pub fn note_url(&self, id: &str) -> String {
        format!("{}{}", self.notes_dir, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = BrowserConfig::from_json(r#"{ "root_note": "home.md", "highlight_ms": 50 }"#);
        assert_eq!(config.root_note, "home.md");
        assert_eq!(config.highlight_ms, 50);
        assert_eq!(config.notes_dir, "notes/");
        assert_eq!(config.backlink_preview_chars, 250);
    }

    #[test]
    fn malformed_override_falls_back_to_defaults() {
        assert_eq!(BrowserConfig::from_json("{ not json"), BrowserConfig::default());
        assert_eq!(BrowserConfig::from_json("   "), BrowserConfig::default());
    }

    #[test]
    fn note_url_joins_directory_and_identifier() {
        let config = BrowserConfig::default();
        assert_eq!(config.note_url("a_b.md"), "notes/a_b.md");
    }
}
