use crate::error::FetchError;
use crate::front_matter::{self, Metadata};
use crate::links::strip_note_suffix;
use crate::source::NoteSource;
use std::collections::HashMap;

/// A parsed note. Immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct NoteRecord {
    pub id: String,
    pub title: String,
    pub raw_body: String,
    pub metadata: Metadata,
}

impl NoteRecord {
    pub fn parse(id: &str, raw: &str) -> Self {
        let (metadata, raw_body) = front_matter::parse(id, raw);
        let title = metadata
            .title()
            .unwrap_or_else(|| strip_note_suffix(id).to_string());
        Self {
            id: id.to_string(),
            title,
            raw_body,
            metadata,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.metadata.is_hidden()
    }
}

#[derive(Clone, Debug, PartialEq)]
enum CacheEntry {
    Loaded(NoteRecord),
    /// Kept only to report state; the next lookup fetches again.
    FetchFailed(FetchError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheState {
    Unfetched,
    Loaded,
    FetchFailed,
}

/// Owns every parsed note of the session, keyed by identifier.
#[derive(Debug, Default)]
pub struct NoteStore {
    entries: HashMap<String, CacheEntry>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&NoteRecord> {
        match self.entries.get(id) {
            Some(CacheEntry::Loaded(record)) => Some(record),
            _ => None,
        }
    }

    pub fn state(&self, id: &str) -> CacheState {
        match self.entries.get(id) {
            None => CacheState::Unfetched,
            Some(CacheEntry::Loaded(_)) => CacheState::Loaded,
            Some(CacheEntry::FetchFailed(_)) => CacheState::FetchFailed,
        }
    }

    pub fn last_error(&self, id: &str) -> Option<&FetchError> {
        match self.entries.get(id) {
            Some(CacheEntry::FetchFailed(err)) => Some(err),
            _ => None,
        }
    }

    pub fn needs_fetch(&self, id: &str) -> bool {
        self.state(id) != CacheState::Loaded
    }

    pub fn loaded_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, CacheEntry::Loaded(_)))
            .count()
    }

    /// Stores the outcome of a fetch for `id`.
    ///
    /// A loaded record is never replaced, so a late duplicate fetch is a no-op.
    /// A failure is remembered as transient and does not shadow a loaded record.
    pub fn record_fetch(
        &mut self,
        id: &str,
        result: Result<String, FetchError>,
    ) -> Option<&NoteRecord> {
        if self.state(id) == CacheState::Loaded {
            log::debug!("{id} already loaded, dropping duplicate fetch result");
            return self.get(id);
        }
        match result {
            Ok(raw) => {
                let record = NoteRecord::parse(id, &raw);
                self.entries
                    .insert(id.to_string(), CacheEntry::Loaded(record));
                self.get(id)
            }
            Err(err) => {
                log::warn!("failed to fetch {id}: {err}");
                self.entries
                    .insert(id.to_string(), CacheEntry::FetchFailed(err));
                None
            }
        }
    }

    /// Returns the record for `id`, fetching it from `source` on a miss.
    pub async fn ensure_loaded<S: NoteSource>(
        &mut self,
        source: &S,
        id: &str,
    ) -> Result<&NoteRecord, FetchError> {
        if self.needs_fetch(id) {
            let result = source.fetch_note(id).await;
            self.record_fetch(id, result);
        } else {
            log::debug!("{id} served from cache");
        }
        match self.entries.get(id) {
            Some(CacheEntry::Loaded(record)) => Ok(record),
            Some(CacheEntry::FetchFailed(err)) => Err(err.clone()),
            None => Err(FetchError::missing(id)),
        }
    }
}
