//! Phrase-adjacency verification over a document's per-term position lists.

use crate::models::PageRecord;
use crate::query::intersect::{intersect, AcceptAll};
use crate::storage::{DocIdIter, VecDocIds};
use crate::Result;

/// Positions where the terms occur consecutively, up to `limit` anchors.
///
/// Each term's position list is shifted left by its offset in the phrase;
/// the phrase exists exactly where the shifted lists intersect. Positions
/// smaller than the shift cannot anchor the phrase and drop out.
pub async fn phrase_anchors(
    record: &PageRecord,
    terms: &[String],
    limit: usize,
) -> Result<Vec<u32>> {
    if terms.is_empty() {
        return Ok(Vec::new());
    }

    let mut iters: Vec<Box<dyn DocIdIter + Send>> = Vec::with_capacity(terms.len());
    for (offset, term) in terms.iter().enumerate() {
        let shifted: Vec<u32> = record
            .positions(term)
            .iter()
            .filter_map(|&p| p.checked_sub(offset as u32))
            .collect();
        iters.push(Box::new(VecDocIds::new(shifted)));
    }

    intersect(&mut iters, limit, &mut AcceptAll).await
}

/// Whether the terms appear as an adjacent phrase anywhere in the record.
pub async fn matches_phrase(record: &PageRecord, terms: &[String]) -> Result<bool> {
    Ok(!phrase_anchors(record, terms, 1).await?.is_empty())
}
