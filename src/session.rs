use crate::backlinks::BacklinkIndex;
use crate::config::BrowserConfig;
use crate::error::FetchError;
use crate::links::{canonicalize_references, link_key};
use crate::note_store::{NoteRecord, NoteStore};
use crate::panes::{BacklinkCard, NoteView, OpenOutcome, Pane, PaneStack, Unavailable};
use crate::render::{render_preview, MarkdownRenderer, RenderedContent, Renderer};
use crate::source::{ManifestEntry, NoteSource};
use std::collections::HashMap;

/// Identifiers listed by the manifest, with their titles.
#[derive(Debug, Default)]
struct Catalog {
    titles: HashMap<String, String>,
    /// Lower-cased identifier -> identifier.
    keys: HashMap<String, String>,
    /// Manifest order, which is also the backlink processing order.
    order: Vec<String>,
}

impl Catalog {
    fn register(&mut self, entry: ManifestEntry) {
        if self.titles.contains_key(&entry.file) {
            log::warn!("manifest lists {} more than once", entry.file);
            return;
        }
        self.keys
            .entry(link_key(&entry.file))
            .or_insert_with(|| entry.file.clone());
        self.order.push(entry.file.clone());
        self.titles.insert(entry.file, entry.title);
    }

    /// The listed identifier `target` refers to: an exact match first, then a
    /// case-insensitive one.
    fn resolve(&self, target: &str) -> Option<&str> {
        if let Some((id, _)) = self.titles.get_key_value(target) {
            return Some(id.as_str());
        }
        self.keys.get(&link_key(target)).map(String::as_str)
    }

    fn title(&self, id: &str) -> Option<&str> {
        self.titles.get(id).map(String::as_str)
    }
}

/// One browsing session: the note store, the backlink index built from it and
/// the pane stack, all mutated from a single thread.
pub struct Session<S, R = MarkdownRenderer> {
    config: BrowserConfig,
    source: S,
    renderer: R,
    catalog: Catalog,
    store: NoteStore,
    backlinks: BacklinkIndex,
    panes: PaneStack,
}

impl<S: NoteSource> Session<S> {
    pub fn new(source: S, config: BrowserConfig) -> Self {
        Self::with_renderer(source, config, MarkdownRenderer::default())
    }
}

impl<S: NoteSource, R: Renderer> Session<S, R> {
    pub fn with_renderer(source: S, config: BrowserConfig, renderer: R) -> Self {
        Self {
            config,
            source,
            renderer,
            catalog: Catalog::default(),
            store: NoteStore::new(),
            backlinks: BacklinkIndex::default(),
            panes: PaneStack::new(),
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Loads the manifest, fetches every listed note, builds the backlink
    /// index and opens the root note at position 0.
    pub async fn bootstrap(&mut self) -> OpenOutcome {
        let manifest = self.source.fetch_manifest().await;
        self.accept_manifest(manifest);

        for id in self.pending_fetches() {
            let result = self.source.fetch_note(&id).await;
            self.record_fetch(&id, result);
        }
        self.open_root()
    }

    /// Opens `id` next to the pane at `origin`, fetching the note first if it
    /// is listed but not loaded yet.
    pub async fn open(&mut self, id: &str, origin: Option<usize>) -> OpenOutcome {
        if let Some(listed) = self.fetch_target(id) {
            if let Err(err) = self.store.ensure_loaded(&self.source, &listed).await {
                log::debug!("{listed} unavailable: {err}");
            }
        }
        self.open_resolved(id, origin)
    }

    pub fn dispose(mut self) {
        self.panes.clear();
        log::info!(
            "session closed ({} notes loaded)",
            self.store.loaded_count()
        );
    }

    /// Registers the manifest, or nothing when it could not be loaded.
    pub fn accept_manifest(&mut self, manifest: Result<Vec<ManifestEntry>, FetchError>) {
        match manifest {
            Ok(entries) => self.register_manifest(entries),
            Err(err) => log::warn!("could not load the notes manifest: {err}"),
        }
    }

    /// Registers the titles of every listed note. The embedded `content` of
    /// each entry is ignored; the live note text is authoritative.
    pub fn register_manifest(&mut self, entries: Vec<ManifestEntry>) {
        for entry in entries {
            self.catalog.register(entry);
        }
        log::info!("manifest lists {} notes", self.catalog.order.len());
    }

    /// Listed notes that are not loaded yet, in manifest order.
    pub fn pending_fetches(&self) -> Vec<String> {
        self.catalog
            .order
            .iter()
            .filter(|id| self.store.needs_fetch(id))
            .cloned()
            .collect()
    }

    pub fn needs_fetch(&self, id: &str) -> bool {
        self.fetch_target(id).is_some()
    }

    /// The listed identifier to fetch before `id` can be opened, if any.
    pub fn fetch_target(&self, id: &str) -> Option<String> {
        self.resolve(id)
            .filter(|listed| self.store.needs_fetch(listed))
            .map(str::to_string)
    }

    pub fn record_fetch(&mut self, id: &str, result: Result<String, FetchError>) {
        match self.catalog.resolve(id) {
            Some(listed) => {
                self.store.record_fetch(listed, result);
            }
            None => log::debug!("ignoring fetch result for unlisted {id}"),
        }
    }

    /// Rebuilds the backlink index from every loaded note, in manifest order.
    pub fn build_backlinks(&mut self) {
        let store = &self.store;
        let catalog = &self.catalog;
        let notes = catalog.order.iter().filter_map(|id| store.get(id));
        let resolve = |target: &str| catalog.resolve(target).map(str::to_string);
        self.backlinks = BacklinkIndex::build(notes, &resolve);
        log::info!(
            "backlink index covers {} notes, {} linked targets",
            self.store.loaded_count(),
            self.backlinks.len()
        );
    }

    pub fn is_known(&self, id: &str) -> bool {
        self.resolve(id).is_some()
    }

    /// The listed identifier `id` refers to, matching case-insensitively.
    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.catalog.resolve(id)
    }

    pub fn title(&self, id: &str) -> Option<&str> {
        self.resolve(id).and_then(|listed| self.catalog.title(listed))
    }

    pub fn note(&self, id: &str) -> Option<&NoteRecord> {
        self.resolve(id).and_then(|listed| self.store.get(listed))
    }

    pub fn backlinks(&self, id: &str) -> &[String] {
        self.backlinks.lookup(self.resolve(id).unwrap_or(id))
    }

    /// Builds the backlink index and opens the root note at position 0. The
    /// last bootstrap step, once every listed note has been attempted.
    pub fn open_root(&mut self) -> OpenOutcome {
        self.build_backlinks();
        let root = self.config.root_note.clone();
        self.open_resolved(&root, None)
    }

    pub fn panes(&self) -> &[Pane] {
        self.panes.panes()
    }

    pub fn pane(&self, position: usize) -> Option<&Pane> {
        self.panes.get(position)
    }

    /// Opens `id` using only what the store already holds. Unlisted, unloaded
    /// and hidden notes all get the placeholder.
    pub fn open_resolved(&mut self, id: &str, origin: Option<usize>) -> OpenOutcome {
        let listed = self.catalog.resolve(id);
        let id = listed.unwrap_or(id);
        let record = listed.and_then(|listed| self.store.get(listed));

        let outcome = match record {
            None => self
                .panes
                .open_unavailable(id, origin, Unavailable::NotFound),
            Some(record) if record.is_hidden() => {
                self.panes.open_unavailable(id, origin, Unavailable::Hidden)
            }
            Some(record) => {
                let views = ViewBuilder {
                    config: &self.config,
                    renderer: &self.renderer,
                    catalog: &self.catalog,
                    store: &self.store,
                    backlinks: &self.backlinks,
                };
                self.panes.open_note(id, origin, |_| views.note_view(record))
            }
        };
        log::debug!("open {id} from {origin:?}: {outcome:?}");
        outcome
    }

    /// Short rendered preview of a visible, loaded note.
    pub fn hover_preview(&self, id: &str) -> Option<RenderedContent> {
        let record = self.note(id).filter(|r| !r.is_hidden())?;
        let resolve = |target: &str| self.resolve(target).map(str::to_string);
        Some(render_preview(
            &self.renderer,
            record,
            self.config.hover_preview_chars,
            &resolve,
        ))
    }
}

struct ViewBuilder<'a, R> {
    config: &'a BrowserConfig,
    renderer: &'a R,
    catalog: &'a Catalog,
    store: &'a NoteStore,
    backlinks: &'a BacklinkIndex,
}

impl<R: Renderer> ViewBuilder<'_, R> {
    fn note_view(&self, record: &NoteRecord) -> NoteView {
        let resolve = |target: &str| self.catalog.resolve(target).map(str::to_string);
        let body = self
            .renderer
            .render(&canonicalize_references(&record.raw_body), &resolve);

        // Hidden sources stay out of the cards so their existence is not leaked.
        let backlinks = self
            .backlinks
            .lookup(&record.id)
            .iter()
            .filter_map(|source_id| {
                let source = self.store.get(source_id).filter(|s| !s.is_hidden())?;
                Some(BacklinkCard {
                    source: source_id.clone(),
                    title: self.title_of(source),
                    preview: render_preview(
                        self.renderer,
                        source,
                        self.config.backlink_preview_chars,
                        &resolve,
                    ),
                })
            })
            .collect();

        NoteView {
            title: self.title_of(record),
            body,
            last_updated: record.metadata.last_updated(),
            backlinks,
        }
    }

    fn title_of(&self, record: &NoteRecord) -> String {
        self.catalog
            .title(&record.id)
            .map(str::to_string)
            .unwrap_or_else(|| record.title.clone())
    }
}
