use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::OnceLock;

pub const NOTE_SUFFIX: &str = ".md";

fn wiki_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap())
}

fn conventional_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[.*?\]\((.*?)\)").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Turns the display text of a `[[...]]` reference into a note identifier:
/// trimmed, whitespace runs collapsed to `_`, note suffix appended once.
pub fn canonicalize_identifier(display: &str) -> String {
    let collapsed = whitespace_re().replace_all(display.trim(), "_");
    if collapsed.ends_with(NOTE_SUFFIX) {
        collapsed.into_owned()
    } else {
        format!("{collapsed}{NOTE_SUFFIX}")
    }
}

/// Rewrites every `[[Display]]` into `[Display](Display.md)`, keeping the
/// display text exactly as written.
pub fn canonicalize_references(text: &str) -> String {
    wiki_link_re()
        .replace_all(text, |caps: &Captures| {
            let display = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            format!("[{display}]({})", canonicalize_identifier(display))
        })
        .into_owned()
}

/// Targets of every conventional link in `text`, deduplicated, in order of
/// first occurrence.
pub fn extract_outgoing_identifiers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for caps in conventional_link_re().captures_iter(text) {
        let target = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if seen.insert(target) {
            out.push(target.to_string());
        }
    }
    out
}

/// Outgoing identifiers of a raw note body, wiki references included.
pub fn outgoing_identifiers(raw_body: &str) -> Vec<String> {
    extract_outgoing_identifiers(&canonicalize_references(raw_body))
}

/// Links that leave the note collection: URLs with a scheme, mail links and
/// in-page fragments.
pub fn is_external(target: &str) -> bool {
    let target = target.trim();
    target.contains("://") || target.starts_with("mailto:") || target.starts_with('#')
}

/// Case-insensitive lookup key for an identifier.
pub fn link_key(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

pub fn strip_note_suffix(id: &str) -> &str {
    let trimmed = id.trim();
    if trimmed.len() >= NOTE_SUFFIX.len()
        && trimmed.is_char_boundary(trimmed.len() - NOTE_SUFFIX.len())
        && trimmed[trimmed.len() - NOTE_SUFFIX.len()..].eq_ignore_ascii_case(NOTE_SUFFIX)
    {
        &trimmed[..trimmed.len() - NOTE_SUFFIX.len()]
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_display_text() {
        assert_eq!(canonicalize_identifier("Index"), "Index.md");
        assert_eq!(canonicalize_identifier("  My   Garden\tNotes "), "My_Garden_Notes.md");
        assert_eq!(canonicalize_identifier("already.md"), "already.md");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        for input in ["Index", " a  b ", "x.md", "Über Notes", "tab\tsep", "trailing.md "] {
            let once = canonicalize_identifier(input);
            assert_eq!(canonicalize_identifier(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn rewrites_wiki_references_preserving_display() {
        assert_eq!(
            canonicalize_references("see [[My Note]] and [[ Index ]]."),
            "see [My Note](My_Note.md) and [ Index ](Index.md)."
        );
    }

    #[test]
    fn leaves_conventional_links_alone() {
        let text = "a [label](target.md) b";
        assert_eq!(canonicalize_references(text), text);
    }

    #[test]
    fn extracts_targets_in_first_occurrence_order() {
        let text = "[a](b.md) [[Index]] [c](b.md) [d](https://example.com)";
        assert_eq!(
            outgoing_identifiers(text),
            vec!["b.md", "Index.md", "https://example.com"]
        );
    }

    #[test]
    fn links_do_not_span_lines() {
        assert!(extract_outgoing_identifiers("[a\n](b.md)").is_empty());
    }

    #[test]
    fn detects_external_targets() {
        assert!(is_external("https://example.com"));
        assert!(is_external("mailto:me@example.com"));
        assert!(is_external("#section"));
        assert!(!is_external("Index.md"));
    }

    #[test]
    fn link_keys_ignore_ascii_case() {
        assert_eq!(link_key("Index.md"), link_key("index.MD"));
        assert_ne!(link_key("a.md"), link_key("b.md"));
    }

    #[test]
    fn strips_suffix_case_insensitively() {
        assert_eq!(strip_note_suffix("Index.md"), "Index");
        assert_eq!(strip_note_suffix("Loud.MD"), "Loud");
        assert_eq!(strip_note_suffix("plain"), "plain");
    }
}
