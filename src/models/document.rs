use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique document identifier, equal to the rank assigned at insertion time.
/// Lower id = higher rank.
pub type DocId = u32;

/// Reserved sentinel: "no document". Doc ids start at 1.
pub const NO_DOC: DocId = 0;

/// A document handed to `Engine::add`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentInput {
    pub title: String,
    pub text: String,
    pub url: String,
    /// Proposed rank; the engine reserves the largest free id at or below it.
    pub rank: DocId,
}

/// Forward record persisted per document.
///
/// `words` keeps the original-case token sequence of `title + " " + text`.
/// `index` maps each lower-cased term (stop words included) to its 0-based
/// positions in `words`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageRecord {
    pub title: String,
    pub url: String,
    pub words: Vec<String>,
    pub index: HashMap<String, Vec<u32>>,
}

impl PageRecord {
    /// Positions of a lower-cased term, or an empty slice when absent.
    pub fn positions(&self, term: &str) -> &[u32] {
        self.index.get(term).map(Vec::as_slice).unwrap_or(&[])
    }
}
