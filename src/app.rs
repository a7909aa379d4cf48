use crate::config::BrowserConfig;
use crate::fetch::HttpSource;
use crate::panes::{NavigationRequest, OpenOutcome, Pane};
use crate::session::Session;
use crate::source::NoteSource;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::time::Duration;
use web_sys::{Element, MouseEvent, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};

/// `<script type="application/json">` block holding config overrides.
pub const CONFIG_ELEMENT_ID: &str = "notepanes-config";

/// Elements that show a note preview on hover: live links and backlink cards.
const HOVER_TARGETS: &str = "a.note-link[data-file], .backlink-item[data-file]";

type BrowserSession = Session<HttpSource>;

/// What the view needs from a pane, detached from the session.
#[derive(Clone, Debug, PartialEq)]
struct PaneSnapshot {
    id: String,
    position: usize,
    html: String,
    placeholder: bool,
}

impl From<&Pane> for PaneSnapshot {
    fn from(pane: &Pane) -> Self {
        Self {
            id: pane.id.clone(),
            position: pane.position,
            html: pane.to_html(),
            placeholder: pane.is_placeholder(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct HoverPreview {
    html: String,
    x: i32,
    y: i32,
}

fn read_config() -> BrowserConfig {
    let text = document()
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
        .unwrap_or_default();
    BrowserConfig::from_json(&text)
}

/// Nearest element at or above the event target carrying `selector`.
fn closest(ev: &MouseEvent, selector: &str) -> Option<Element> {
    let target: Element = event_target(ev);
    target.closest(selector).ok().flatten()
}

fn scroll_to_pane(position: usize) {
    request_animation_frame(move || {
        let selector = format!("[data-position=\"{position}\"]");
        if let Ok(Some(el)) = document().query_selector(&selector) {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_inline(ScrollLogicalPosition::Start);
            el.scroll_into_view_with_scroll_into_view_options(&options);
        }
    });
}

#[component]
pub fn App() -> impl IntoView {
    let config = read_config();
    let highlight = Duration::from_millis(config.highlight_ms.into());
    let session: StoredValue<BrowserSession> =
        StoredValue::new(Session::new(HttpSource::new(config.clone()), config));

    let (panes, set_panes) = signal(Vec::<PaneSnapshot>::new());
    let (flashing, set_flashing) = signal(None::<usize>);
    let (hover, set_hover) = signal(None::<HoverPreview>);

    let refresh = move || {
        let snapshot = session.with_value(|s| s.panes().iter().map(PaneSnapshot::from).collect());
        set_panes.set(snapshot);
    };

    let reveal = move |outcome: OpenOutcome| {
        refresh();
        let position = outcome.position();
        if let OpenOutcome::Focused { .. } = outcome {
            set_flashing.set(Some(position));
            set_timeout(move || set_flashing.set(None), highlight);
        }
        scroll_to_pane(position);
    };

    // Fetches go through a cloned source so no session borrow spans an await.
    Effect::new(move |_| {
        spawn_local(async move {
            let source = session.with_value(|s| s.source().clone());
            let manifest = source.fetch_manifest().await;
            session.update_value(|s| s.accept_manifest(manifest));

            for id in session.with_value(|s| s.pending_fetches()) {
                let result = source.fetch_note(&id).await;
                session.update_value(|s| s.record_fetch(&id, result));
            }

            let mut outcome = None;
            session.update_value(|s| outcome = Some(s.open_root()));
            if let Some(outcome) = outcome {
                reveal(outcome);
            }
        });
    });

    let navigate = move |request: NavigationRequest| {
        spawn_local(async move {
            let (source, pending) =
                session.with_value(|s| (s.source().clone(), s.fetch_target(&request.target)));
            if let Some(id) = pending {
                let result = source.fetch_note(&id).await;
                session.update_value(|s| s.record_fetch(&id, result));
            }

            let mut outcome = None;
            session.update_value(|s| {
                outcome = Some(s.open_resolved(&request.target, request.origin));
            });
            if let Some(outcome) = outcome {
                reveal(outcome);
            }
        });
    };

    let on_pane_click = move |position: usize, ev: MouseEvent| {
        let Some(el) = closest(&ev, "[data-file]") else {
            return;
        };
        ev.prevent_default();
        let Some(target) = el.get_attribute("data-file") else {
            return;
        };
        set_hover.set(None);
        let request = session.with_value(|s| s.pane(position).and_then(|p| p.activate(&target)));
        if let Some(request) = request {
            navigate(request);
        }
    };

    let on_pane_hover = move |ev: MouseEvent| {
        let preview = closest(&ev, HOVER_TARGETS)
            .and_then(|el| el.get_attribute("data-file"))
            .and_then(|target| session.with_value(|s| s.hover_preview(&target)));
        set_hover.set(preview.map(|rendered| HoverPreview {
            html: rendered.html,
            x: ev.client_x(),
            y: ev.client_y(),
        }));
    };

    let pane_views = move || {
        panes
            .get()
            .into_iter()
            .map(|pane| {
                let position = pane.position;
                view! {
                    <article
                        class="note-pane"
                        class:placeholder=pane.placeholder
                        class:highlight=move || flashing.get() == Some(position)
                        data-position=position.to_string()
                        data-note=pane.id
                        on:click=move |ev| on_pane_click(position, ev)
                        on:mouseover=on_pane_hover
                        on:mouseleave=move |_| set_hover.set(None)
                        inner_html=pane.html
                    ></article>
                }
            })
            .collect::<Vec<_>>()
    };

    view! {
        <main class="pane-container">{pane_views}</main>
        {move || {
            hover
                .get()
                .map(|preview| {
                    view! {
                        <div
                            class="hover-preview"
                            style=format!("left: {}px; top: {}px;", preview.x + 12, preview.y + 12)
                            inner_html=preview.html
                        ></div>
                    }
                })
        }}
    }
}
