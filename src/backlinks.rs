use crate::links::outgoing_identifiers;
use crate::note_store::NoteRecord;
use crate::render::Resolve;
use std::collections::{HashMap, HashSet};

/// Target identifier -> notes that reference it, in processing order.
///
/// Targets are keyed by the listed identifier they resolve to, so `[[Index]]`
/// counts as a reference to `index.md` while `A.md` and `a.md` stay apart when
/// both are listed. Targets that resolve to nothing keep their raw form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BacklinkIndex {
    sources: HashMap<String, Vec<String>>,
}

impl BacklinkIndex {
    /// Builds the index from a snapshot of notes. Repeated links inside one
    /// note count once; the same target linked from two notes lists both.
    pub fn build<'a>(
        notes: impl IntoIterator<Item = &'a NoteRecord>,
        resolve: Resolve<'_>,
    ) -> Self {
        let mut sources: HashMap<String, Vec<String>> = HashMap::new();
        for note in notes {
            let mut seen = HashSet::new();
            for target in outgoing_identifiers(&note.raw_body) {
                let key = resolve(&target).unwrap_or(target);
                if seen.insert(key.clone()) {
                    sources.entry(key).or_default().push(note.id.clone());
                }
            }
        }
        Self { sources }
    }

    /// Backlinks of `id`, which must already be resolved to a listed
    /// identifier.
    pub fn lookup(&self, id: &str) -> &[String] {
        self.sources
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct targets with at least one backlink.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
