use std::collections::HashSet;

use async_trait::async_trait;

use crate::config::ScoreWeights;
use crate::models::{DocId, PageRecord, SearchHit};
use crate::query::intersect::{intersect, DocFilter};
use crate::query::{phrase, scoring, snippet};
use crate::storage::Storage;
use crate::tokenizer::{TokenStream, Tokenizer};
use crate::Result;

/// Executes one query against a storage backend.
pub struct QueryExecutor<'a, S: Storage> {
    storage: &'a S,
    tokenizer: &'a Tokenizer,
    weights: Option<ScoreWeights>,
    max_candidates: usize,
}

impl<'a, S: Storage> QueryExecutor<'a, S> {
    pub fn new(
        storage: &'a S,
        tokenizer: &'a Tokenizer,
        weights: Option<ScoreWeights>,
        max_candidates: usize,
    ) -> Self {
        Self {
            storage,
            tokenizer,
            weights,
            max_candidates,
        }
    }

    /// Evaluate `query` and return at most `max_count` hits, best first.
    pub async fn execute(&self, query: &str, max_count: usize) -> Result<Vec<SearchHit>> {
        let parsed = self.tokenizer.tokenize_raw(query);

        let non_stop: Vec<String> = parsed
            .words
            .iter()
            .map(|w| Tokenizer::lower_term(w))
            .filter(|t| !self.tokenizer.is_stop_word(t))
            .collect();
        if non_stop.is_empty() {
            return Ok(Vec::new());
        }

        let mut iters = Vec::with_capacity(non_stop.len());
        for term in &non_stop {
            iters.push(self.storage.word_iterator(term).await?);
        }

        let mut filter = QuoteFilter {
            storage: self.storage,
            query: &parsed,
        };
        let candidates = intersect(&mut iters, self.max_candidates, &mut filter).await?;
        tracing::debug!(query, candidates = candidates.len(), "intersection complete");

        let mut seen = HashSet::new();
        let mut scored: Vec<(DocId, u32, PageRecord)> = Vec::new();
        for doc_id in candidates {
            if !seen.insert(doc_id) {
                continue;
            }
            let Some(record) = self.storage.get_page(doc_id).await? else {
                continue;
            };
            let points = match &self.weights {
                Some(w) => scoring::score(&record, &non_stop, self.tokenizer, w),
                None => 0,
            };
            scored.push((doc_id, points, record));
        }

        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(max_count);

        let mut hits = Vec::with_capacity(scored.len());
        for (_, _, record) in &scored {
            let introduction = snippet::build_introduction(record, &parsed, self.tokenizer).await?;
            hits.push(SearchHit::new(
                record.title.clone(),
                record.url.clone(),
                introduction,
            ));
        }
        Ok(hits)
    }
}

/// Accepts a candidate when the query has no quoted phrases, or when at
/// least one quoted range occurs adjacently in the candidate's record.
struct QuoteFilter<'a, S: Storage> {
    storage: &'a S,
    query: &'a TokenStream,
}

#[async_trait]
impl<S: Storage> DocFilter for QuoteFilter<'_, S> {
    async fn accept(&mut self, doc_id: DocId) -> Result<bool> {
        let ranges: Vec<(usize, usize)> = self
            .query
            .quoted_ranges()
            .into_iter()
            .filter(|&(start, end)| start < end)
            .collect();
        if ranges.is_empty() {
            return Ok(true);
        }

        let Some(record) = self.storage.get_page(doc_id).await? else {
            return Ok(false);
        };
        for (start, end) in ranges {
            let terms: Vec<String> = self.query.words[start..end]
                .iter()
                .map(|w| Tokenizer::lower_term(w))
                .collect();
            if phrase::matches_phrase(&record, &terms).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
