//! Engine façade wiring the tokenizer, storage, indexer, and evaluator.

use crate::config::EngineConfig;
use crate::error::OrdexError;
use crate::index;
use crate::models::{DocId, DocumentInput, PageRecord, SearchHit};
use crate::query::QueryExecutor;
use crate::storage::Storage;
use crate::tokenizer::Tokenizer;
use crate::Result;

pub struct Engine<S: Storage> {
    storage: S,
    tokenizer: Tokenizer,
    config: EngineConfig,
}

impl<S: Storage> Engine<S> {
    pub fn new(config: EngineConfig, storage: S) -> Self {
        let tokenizer = Tokenizer::new(&config.tokenizer_config);
        Self {
            storage,
            tokenizer,
            config,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Index one document and return its assigned doc id.
    ///
    /// The URL is bound before the forward record and postings are written,
    /// so a retried partial `add` reports `DuplicateUrl` instead of
    /// double-indexing.
    pub async fn add(&self, doc: DocumentInput) -> Result<DocId> {
        let stream = self
            .tokenizer
            .tokenize_raw(&format!("{} {}", doc.title, doc.text));

        if self.storage.get_url_to_page(&doc.url).await?.is_some() {
            return Err(OrdexError::DuplicateUrl(doc.url));
        }

        let doc_id = self.storage.reserve_doc_id(doc.rank).await?;
        self.storage.set_url_to_page(&doc.url, doc_id).await?;

        let record = PageRecord {
            title: doc.title,
            url: doc.url,
            index: index::build_forward_index(&stream.words),
            words: stream.words,
        };
        self.storage.init_page(doc_id, &record).await?;
        index::insert_postings(&self.storage, doc_id, &record.words, &self.tokenizer).await?;

        tracing::debug!(doc_id, url = %record.url, words = record.words.len(), "indexed document");
        Ok(doc_id)
    }

    /// Answer a free-text query with at most `max_count` ranked hits.
    pub async fn search(&self, query: &str, max_count: usize) -> Result<Vec<SearchHit>> {
        QueryExecutor::new(
            &self.storage,
            &self.tokenizer,
            self.config.score_weights,
            self.config.max_candidates,
        )
        .execute(query, max_count)
        .await
    }
}
