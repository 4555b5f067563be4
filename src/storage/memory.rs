use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{DocIdIter, Storage, VecDocIds};
use crate::error::OrdexError;
use crate::models::{DocId, PageRecord};
use crate::Result;

/// In-memory storage: one sorted doc-id vector per term, plain maps for
/// pages and URL lookup. Iterators snapshot the posting list at creation.
#[derive(Default)]
pub struct MemoryStorage {
    terms: RwLock<HashMap<String, Vec<DocId>>>,
    pages: RwLock<HashMap<DocId, PageRecord>>,
    urls: RwLock<HashMap<String, DocId>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn word_iterator<'a>(&'a self, term: &str) -> Result<Box<dyn DocIdIter + Send + 'a>> {
        let snapshot = self
            .terms
            .read()
            .get(term)
            .cloned()
            .unwrap_or_default();
        Ok(Box::new(VecDocIds::new(snapshot)))
    }

    async fn init_term(&self, term: &str) -> Result<()> {
        self.terms.write().entry(term.to_string()).or_default();
        Ok(())
    }

    async fn reset_term(&self, term: &str) -> Result<()> {
        self.terms.write().insert(term.to_string(), Vec::new());
        Ok(())
    }

    async fn add_doc_id(&self, term: &str, doc_id: DocId) -> Result<()> {
        let mut terms = self.terms.write();
        let list = terms
            .get_mut(term)
            .ok_or_else(|| OrdexError::KeyMissing(term.to_string()))?;
        if let Err(pos) = list.binary_search(&doc_id) {
            list.insert(pos, doc_id);
        }
        Ok(())
    }

    async fn init_page(&self, doc_id: DocId, record: &PageRecord) -> Result<()> {
        self.pages.write().insert(doc_id, record.clone());
        Ok(())
    }

    async fn get_page(&self, doc_id: DocId) -> Result<Option<PageRecord>> {
        Ok(self.pages.read().get(&doc_id).cloned())
    }

    async fn get_url_to_page(&self, url: &str) -> Result<Option<DocId>> {
        Ok(self.urls.read().get(url).copied())
    }

    async fn set_url_to_page(&self, url: &str, doc_id: DocId) -> Result<()> {
        self.urls.write().insert(url.to_string(), doc_id);
        Ok(())
    }

    async fn reserve_doc_id(&self, proposed_rank: DocId) -> Result<DocId> {
        let pages = self.pages.read();
        let mut rank = proposed_rank;
        loop {
            if rank == 0 {
                return Err(OrdexError::RankExhausted(proposed_rank));
            }
            if !pages.contains_key(&rank) {
                return Ok(rank);
            }
            rank -= 1;
        }
    }

    async fn document_count(&self) -> Result<u64> {
        Ok(self.pages.read().len() as u64)
    }
}
