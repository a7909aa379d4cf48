use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One record of the notes manifest written by the indexer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ManifestEntry {
    pub file: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub frontmatter: serde_json::Value,
}

impl ManifestEntry {
    pub fn new(file: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            title: title.into(),
            content: String::new(),
            frontmatter: serde_json::Value::Object(Default::default()),
        }
    }
}

/// Where the manifest and the raw text of notes come from.
///
/// Futures are polled on a single thread and carry no `Send` bound.
#[allow(async_fn_in_trait)]
pub trait NoteSource {
    async fn fetch_manifest(&self) -> Result<Vec<ManifestEntry>, FetchError>;

    async fn fetch_note(&self, id: &str) -> Result<String, FetchError>;
}

pub fn parse_manifest(text: &str) -> Result<Vec<ManifestEntry>, FetchError> {
    serde_json::from_str(text).map_err(|e| FetchError::Manifest(e.to_string()))
}

/// In-memory source. Notes can be added or withdrawn at any time, which makes
/// transient fetch failures easy to reproduce.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    manifest: Vec<ManifestEntry>,
    notes: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists the note in the manifest and serves `raw` for it.
    pub fn with_note(mut self, id: &str, title: &str, raw: &str) -> Self {
        self.manifest.push(ManifestEntry::new(id, title));
        self.notes.insert(id.to_string(), raw.to_string());
        self
    }

    /// Lists the note in the manifest without serving any content for it.
    pub fn with_listing(mut self, id: &str, title: &str) -> Self {
        self.manifest.push(ManifestEntry::new(id, title));
        self
    }

    pub fn insert_note(&mut self, id: &str, raw: &str) {
        self.notes.insert(id.to_string(), raw.to_string());
    }

    pub fn remove_note(&mut self, id: &str) -> Option<String> {
        self.notes.remove(id)
    }
}

impl NoteSource for StaticSource {
    async fn fetch_manifest(&self) -> Result<Vec<ManifestEntry>, FetchError> {
        Ok(self.manifest.clone())
    }

    async fn fetch_note(&self, id: &str) -> Result<String, FetchError> {
        self.notes
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::missing(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_and_title_only_manifests() {
        let full = r#"[{"file":"a.md","title":"A","content":"body","frontmatter":{"show":false}}]"#;
        let entries = parse_manifest(full).unwrap();
        assert_eq!(entries[0].file, "a.md");
        assert_eq!(entries[0].content, "body");
        assert_eq!(entries[0].frontmatter["show"], false);

        let slim = r#"[{"file":"index.md","title":"Index"}]"#;
        let entries = parse_manifest(slim).unwrap();
        assert_eq!(entries[0].title, "Index");
        assert!(entries[0].content.is_empty());
    }

    #[test]
    fn rejects_malformed_manifest() {
        assert!(matches!(
            parse_manifest(r#"{"file": "a.md"}"#),
            Err(FetchError::Manifest(_))
        ));
    }

    #[tokio::test]
    async fn static_source_serves_and_withdraws_notes() {
        let mut source = StaticSource::new()
            .with_note("a.md", "A", "hello")
            .with_listing("b.md", "B");
        assert_eq!(source.fetch_manifest().await.unwrap().len(), 2);
        assert_eq!(source.fetch_note("a.md").await.unwrap(), "hello");
        assert_eq!(
            source.fetch_note("b.md").await,
            Err(FetchError::missing("b.md"))
        );

        source.remove_note("a.md");
        assert!(source.fetch_note("a.md").await.is_err());
    }
}
