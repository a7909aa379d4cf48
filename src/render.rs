use crate::links::{canonicalize_references, is_external};
use crate::note_store::NoteRecord;
use crate::panes::PaneLink;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedContent {
    pub html: String,
    /// Note references in document order.
    pub links: Vec<PaneLink>,
}

/// Maps a link target to the identifier of a listed note, if there is one.
pub type Resolve<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Turns link-canonicalized markdown into HTML.
///
/// Note references that `resolve` maps to a listed note are live and point at
/// the resolved identifier; the rest are rendered dead.
pub trait Renderer {
    fn render(&self, markdown: &str, resolve: Resolve<'_>) -> RenderedContent;
}

#[derive(Clone, Copy, Debug)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, markdown: &str, resolve: Resolve<'_>) -> RenderedContent {
        let mut links = Vec::new();
        // One flag per open link: did we replace its start tag?
        let mut rewritten = Vec::new();

        let events = Parser::new_ext(markdown, self.options).map(|event| match event {
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) if !is_external(&dest_url) => {
                let raw = dest_url.trim();
                let (target, live) = match resolve(raw) {
                    Some(id) => (id, true),
                    None => (raw.to_string(), false),
                };
                let anchor = note_anchor(&target, live, &title);
                links.push(PaneLink { target, live });
                rewritten.push(true);
                Event::InlineHtml(CowStr::from(anchor))
            }
            Event::Start(Tag::Link { .. }) => {
                rewritten.push(false);
                event
            }
            Event::End(TagEnd::Link) => {
                if rewritten.pop() == Some(true) {
                    Event::InlineHtml(CowStr::Borrowed("</a>"))
                } else {
                    Event::End(TagEnd::Link)
                }
            }
            other => other,
        });

        let mut out = String::new();
        html::push_html(&mut out, events);
        RenderedContent { html: out, links }
    }
}

fn note_anchor(target: &str, live: bool, title: &str) -> String {
    let class = if live { "note-link" } else { "dead-link" };
    let mut anchor = format!(
        "<a href=\"#\" data-file=\"{}\" class=\"{class}\"",
        escape_attr(target)
    );
    if !title.is_empty() {
        anchor.push_str(&format!(" title=\"{}\"", escape_attr(title)));
    }
    anchor.push('>');
    anchor
}

pub fn escape_attr(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn heading_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*#[^\n]*(?:\n|$)").unwrap())
}

fn trailing_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+\S*$").unwrap())
}

/// Preview text for a note: the explicit `preview` field, otherwise the body
/// with heading lines removed.
pub fn preview_source(record: &NoteRecord) -> String {
    match record.metadata.preview() {
        Some(preview) => preview,
        None => heading_line_re()
            .replace_all(&record.raw_body, "")
            .trim()
            .to_string(),
    }
}

/// Cuts `text` to at most `max_chars` characters on a word boundary and marks
/// the cut with an ellipsis.
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let trimmed = trailing_word_re().replace(&cut, "");
    format!("{trimmed}…")
}

/// Renders the preview of `record`, truncated and link-canonicalized.
pub fn render_preview<R: Renderer + ?Sized>(
    renderer: &R,
    record: &NoteRecord,
    max_chars: usize,
    resolve: Resolve<'_>,
) -> RenderedContent {
    let text = truncate_preview(&preview_source(record), max_chars);
    renderer.render(&canonicalize_references(&text), resolve)
}
