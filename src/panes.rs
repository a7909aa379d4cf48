use crate::render::{escape_attr, RenderedContent};

pub const PLACEHOLDER_HEADING: &str = "Nothing is here";
pub const PLACEHOLDER_MESSAGE: &str = "This note is hidden or does not exist.";
pub const BACKLINKS_HEADING: &str = "Links to this note:";

/// A note reference found in a pane's rendered content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaneLink {
    pub target: String,
    /// False for references to identifiers the manifest does not list.
    pub live: bool,
}

impl PaneLink {
    /// Dead references are inert.
    pub fn activate(&self, origin: usize) -> Option<NavigationRequest> {
        self.live.then(|| NavigationRequest {
            target: self.target.clone(),
            origin: Some(origin),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationRequest {
    pub target: String,
    /// Position of the pane the reference was activated from.
    pub origin: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unavailable {
    NotFound,
    Hidden,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BacklinkCard {
    pub source: String,
    pub title: String,
    pub preview: RenderedContent,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NoteView {
    pub title: String,
    pub body: RenderedContent,
    pub last_updated: Option<String>,
    pub backlinks: Vec<BacklinkCard>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PaneContent {
    Note(NoteView),
    /// Shown for missing and hidden notes alike.
    Placeholder,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pane {
    pub id: String,
    pub position: usize,
    pub content: PaneContent,
}

impl Pane {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.content, PaneContent::Placeholder)
    }

    pub fn view(&self) -> Option<&NoteView> {
        match &self.content {
            PaneContent::Note(view) => Some(view),
            PaneContent::Placeholder => None,
        }
    }

    /// Every reference in the pane: body links first, then for each backlink
    /// card the card itself followed by the links inside its preview.
    pub fn links(&self) -> Vec<PaneLink> {
        let Some(view) = self.view() else {
            return Vec::new();
        };
        let mut links = view.body.links.clone();
        for card in &view.backlinks {
            links.push(PaneLink {
                target: card.source.clone(),
                live: true,
            });
            links.extend(card.preview.links.iter().cloned());
        }
        links
    }

    /// Navigation requests for every live reference, with this pane as origin.
    pub fn navigation_requests(&self) -> Vec<NavigationRequest> {
        self.links()
            .iter()
            .filter_map(|link| link.activate(self.position))
            .collect()
    }

    /// Resolves an activated reference to `target`, if this pane holds a live one.
    pub fn activate(&self, target: &str) -> Option<NavigationRequest> {
        self.links()
            .iter()
            .find(|link| link.target == target)
            .and_then(|link| link.activate(self.position))
    }

    pub fn to_html(&self) -> String {
        let Some(view) = self.view() else {
            return format!(
                "<div class=\"pane-content placeholder\"><h2>{PLACEHOLDER_HEADING}</h2><p>{PLACEHOLDER_MESSAGE}</p></div>"
            );
        };

        let mut html = format!("<div class=\"pane-content\">{}</div>", view.body.html);
        if let Some(updated) = &view.last_updated {
            html.push_str(&format!(
                "<div class=\"last-updated\">Last updated: {}</div>",
                escape_attr(updated)
            ));
        }
        if !view.backlinks.is_empty() {
            html.push_str(&format!(
                "<div class=\"backlinks\"><strong>{BACKLINKS_HEADING}</strong><div class=\"backlink-grid\">"
            ));
            for card in &view.backlinks {
                html.push_str(&format!(
                    "<div class=\"backlink-item\" data-file=\"{}\"><div class=\"backlink-title\">{}</div><div class=\"backlink-preview\">{}</div></div>",
                    escape_attr(&card.source),
                    escape_attr(&card.title),
                    card.preview.html
                ));
            }
            html.push_str("</div></div>");
        }
        html
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A new pane was inserted.
    Opened { position: usize },
    /// The note was already open; nothing changed structurally.
    Focused { position: usize },
    Placeholder {
        position: usize,
        reason: Unavailable,
    },
}

impl OpenOutcome {
    pub fn position(&self) -> usize {
        match *self {
            OpenOutcome::Opened { position }
            | OpenOutcome::Focused { position }
            | OpenOutcome::Placeholder { position, .. } => position,
        }
    }
}

/// Ordered panes of a single drill-down path. At most one pane per identifier.
#[derive(Debug, Default)]
pub struct PaneStack {
    panes: Vec<Pane>,
}

impl PaneStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.panes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    pub fn get(&self, position: usize) -> Option<&Pane> {
        self.panes.get(position)
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.panes.iter().position(|pane| pane.id == id)
    }

    /// Right after the origin pane, or at the end when there is no origin.
    pub fn insert_position(&self, origin: Option<usize>) -> usize {
        origin
            .map(|o| o.saturating_add(1))
            .unwrap_or(self.panes.len())
            .min(self.panes.len())
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }

    fn truncate(&mut self, position: usize) {
        if position >= self.panes.len() {
            return;
        }
        for closed in self.panes.drain(position..) {
            log::debug!("closing pane {} ({})", closed.position, closed.id);
        }
    }

    fn push(&mut self, id: &str, content: PaneContent) -> usize {
        let position = self.panes.len();
        self.panes.push(Pane {
            id: id.to_string(),
            position,
            content,
        });
        position
    }

    /// Opens the fixed placeholder for `id`.
    ///
    /// Panes after the origin close first. If a pane for `id` survives that,
    /// it is focused instead of duplicated.
    pub fn open_unavailable(
        &mut self,
        id: &str,
        origin: Option<usize>,
        reason: Unavailable,
    ) -> OpenOutcome {
        let position = self.insert_position(origin);
        self.truncate(position);
        if let Some(existing) = self.position_of(id) {
            return OpenOutcome::Focused { position: existing };
        }
        let position = self.push(id, PaneContent::Placeholder);
        OpenOutcome::Placeholder { position, reason }
    }

    /// Opens a note pane for `id`.
    ///
    /// A note pane already open anywhere in the stack is focused and the stack
    /// is left as is. Otherwise panes after the origin close and `build`
    /// produces the view for the new position. A placeholder for `id` that
    /// survives the truncation is focused rather than duplicated.
    pub fn open_note(
        &mut self,
        id: &str,
        origin: Option<usize>,
        build: impl FnOnce(usize) -> NoteView,
    ) -> OpenOutcome {
        let open_note = self
            .panes
            .iter()
            .position(|pane| pane.id == id && !pane.is_placeholder());
        if let Some(existing) = open_note {
            return OpenOutcome::Focused { position: existing };
        }
        let position = self.insert_position(origin);
        self.truncate(position);
        if let Some(existing) = self.position_of(id) {
            return OpenOutcome::Focused { position: existing };
        }
        let view = build(position);
        let position = self.push(id, PaneContent::Note(view));
        OpenOutcome::Opened { position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(title: &str, targets: &[(&str, bool)]) -> NoteView {
        NoteView {
            title: title.to_string(),
            body: RenderedContent {
                html: String::new(),
                links: targets
                    .iter()
                    .map(|(target, live)| PaneLink {
                        target: target.to_string(),
                        live: *live,
                    })
                    .collect(),
            },
            last_updated: None,
            backlinks: Vec::new(),
        }
    }

    fn stack_of(ids: &[&str]) -> PaneStack {
        let mut stack = PaneStack::new();
        for id in ids {
            stack.open_note(id, None, |_| view(id, &[]));
        }
        stack
    }

    fn ids(stack: &PaneStack) -> Vec<&str> {
        stack.panes().iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn appends_without_origin() {
        let stack = stack_of(&["a", "b", "c"]);
        assert_eq!(ids(&stack), ["a", "b", "c"]);
        assert!(stack.panes().iter().enumerate().all(|(i, p)| p.position == i));
    }

    #[test]
    fn opening_from_origin_replaces_everything_after_it() {
        for k in 0..4 {
            let mut stack = stack_of(&["a", "b", "c", "d"]);
            let outcome = stack.open_note("new", Some(k), |_| view("new", &[]));
            assert_eq!(outcome, OpenOutcome::Opened { position: k + 1 });
            assert_eq!(stack.len(), k + 2);
            assert_eq!(stack.get(k + 1).unwrap().id, "new");
        }
    }

    #[test]
    fn placeholder_truncates_to_origin_plus_one() {
        for k in 0..4 {
            let mut stack = stack_of(&["a", "b", "c", "d"]);
            let outcome = stack.open_unavailable("ghost", Some(k), Unavailable::NotFound);
            assert_eq!(
                outcome,
                OpenOutcome::Placeholder {
                    position: k + 1,
                    reason: Unavailable::NotFound
                }
            );
            assert_eq!(stack.len(), k + 2);
            assert!(stack.get(k + 1).unwrap().is_placeholder());
        }
    }

    #[test]
    fn origin_past_the_end_appends() {
        let mut stack = stack_of(&[]);
        let outcome = stack.open_note("root", Some(0), |_| view("root", &[]));
        assert_eq!(outcome, OpenOutcome::Opened { position: 0 });
    }

    #[test]
    fn already_open_note_is_focused_without_truncation() {
        let mut stack = stack_of(&["a", "b", "c"]);
        let outcome = stack.open_note("c", Some(0), |_| unreachable!());
        assert_eq!(outcome, OpenOutcome::Focused { position: 2 });
        assert_eq!(ids(&stack), ["a", "b", "c"]);

        let outcome = stack.open_note("a", Some(1), |_| unreachable!());
        assert_eq!(outcome, OpenOutcome::Focused { position: 0 });
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn surviving_placeholder_is_focused_not_duplicated() {
        let mut stack = stack_of(&["a"]);
        stack.open_unavailable("ghost", Some(0), Unavailable::Hidden);
        stack.open_note("b", None, |_| view("b", &[]));
        assert_eq!(ids(&stack), ["a", "ghost", "b"]);

        let outcome = stack.open_unavailable("ghost", Some(1), Unavailable::Hidden);
        assert_eq!(outcome, OpenOutcome::Focused { position: 1 });
        assert_eq!(ids(&stack), ["a", "ghost"]);
    }

    #[test]
    fn single_instance_holds_across_mixed_navigation() {
        let mut stack = PaneStack::new();
        let script: [(&str, Option<usize>, bool); 8] = [
            ("a", None, true),
            ("b", Some(0), true),
            ("x", Some(1), false),
            ("b", Some(0), true),
            ("c", Some(1), true),
            ("x", None, false),
            ("x", None, false),
            ("a", Some(3), true),
        ];
        for (id, origin, available) in script {
            if available {
                stack.open_note(id, origin, |_| view(id, &[]));
            } else {
                stack.open_unavailable(id, origin, Unavailable::NotFound);
            }
            let mut seen = ids(&stack);
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), stack.len(), "duplicate after opening {id}");
        }
    }

    #[test]
    fn placeholder_after_origin_gives_way_to_the_note() {
        let mut stack = stack_of(&["a"]);
        stack.open_unavailable("late", Some(0), Unavailable::NotFound);
        let outcome = stack.open_note("late", Some(0), |_| view("late", &[]));
        assert_eq!(outcome, OpenOutcome::Opened { position: 1 });
        assert!(!stack.get(1).unwrap().is_placeholder());
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn placeholder_before_origin_is_focused() {
        let mut stack = stack_of(&["a"]);
        stack.open_unavailable("late", Some(0), Unavailable::NotFound);
        stack.open_note("b", None, |_| view("b", &[]));
        let outcome = stack.open_note("late", Some(2), |_| unreachable!());
        assert_eq!(outcome, OpenOutcome::Focused { position: 1 });
        assert_eq!(ids(&stack), ["a", "late", "b"]);
    }

    #[test]
    fn build_receives_insert_position() {
        let mut stack = stack_of(&["a", "b"]);
        stack.open_note("c", Some(0), |position| {
            assert_eq!(position, 1);
            view("c", &[])
        });
    }

    #[test]
    fn live_links_navigate_from_own_position() {
        let mut stack = stack_of(&["a"]);
        stack.open_note("b", Some(0), |_| view("b", &[("x.md", true), ("dead.md", false)]));
        let pane = stack.get(1).unwrap();
        assert_eq!(
            pane.activate("x.md"),
            Some(NavigationRequest {
                target: "x.md".to_string(),
                origin: Some(1)
            })
        );
        assert_eq!(pane.activate("dead.md"), None);
        assert_eq!(pane.activate("unrelated.md"), None);
        assert_eq!(pane.navigation_requests().len(), 1);
    }

    #[test]
    fn backlink_cards_are_references() {
        let mut note = view("t", &[]);
        note.backlinks.push(BacklinkCard {
            source: "src.md".to_string(),
            title: "Src".to_string(),
            preview: RenderedContent {
                html: "<p>preview</p>".to_string(),
                links: vec![PaneLink {
                    target: "other.md".to_string(),
                    live: true,
                }],
            },
        });
        let mut stack = PaneStack::new();
        stack.open_note("t.md", None, |_| note);
        let targets: Vec<_> = stack.get(0).unwrap().links().into_iter().map(|l| l.target).collect();
        assert_eq!(targets, ["src.md", "other.md"]);

        let html = stack.get(0).unwrap().to_html();
        assert!(html.contains(BACKLINKS_HEADING));
        assert!(html.contains(r#"data-file="src.md""#));
    }

    #[test]
    fn placeholder_html_is_fixed() {
        let mut stack = PaneStack::new();
        stack.open_unavailable("nope.md", None, Unavailable::NotFound);
        let html = stack.get(0).unwrap().to_html();
        assert!(html.contains(PLACEHOLDER_HEADING));
        assert!(html.contains(PLACEHOLDER_MESSAGE));
        assert!(stack.get(0).unwrap().links().is_empty());
    }

    #[test]
    fn clear_closes_everything() {
        let mut stack = stack_of(&["a", "b"]);
        stack.clear();
        assert!(stack.is_empty());
    }
}
