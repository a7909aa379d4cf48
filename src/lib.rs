pub mod backlinks;
pub mod config;
pub mod error;
pub mod front_matter;
pub mod links;
pub mod note_store;
pub mod panes;
pub mod render;
pub mod session;
pub mod source;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod fetch;

pub use backlinks::BacklinkIndex;
pub use config::BrowserConfig;
pub use error::FetchError;
pub use note_store::{CacheState, NoteRecord, NoteStore};
pub use panes::{NavigationRequest, OpenOutcome, Pane, PaneContent, PaneLink, PaneStack};
pub use session::Session;
pub use source::{ManifestEntry, NoteSource, StaticSource};
