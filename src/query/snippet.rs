//! Snippet ("introduction") construction: matched runs in document order,
//! each wrapped in double quotes with up to two tokens of context, with
//! `...` between non-adjacent runs.

use std::collections::BTreeSet;

use crate::models::PageRecord;
use crate::query::phrase::phrase_anchors;
use crate::tokenizer::{TokenStream, Tokenizer};
use crate::Result;

/// Build the introduction for one result.
///
/// Quoted query ranges contribute their anchored spans; every other
/// non-stop query term contributes all of its positions. The merged
/// position set is walked as maximal consecutive runs.
pub async fn build_introduction(
    record: &PageRecord,
    query: &TokenStream,
    tokenizer: &Tokenizer,
) -> Result<String> {
    let mut positions: BTreeSet<u32> = BTreeSet::new();

    for (start, end) in query.quoted_ranges() {
        if start >= end {
            continue;
        }
        let terms: Vec<String> = query.words[start..end]
            .iter()
            .map(|w| Tokenizer::lower_term(w))
            .collect();
        for anchor in phrase_anchors(record, &terms, usize::MAX).await? {
            for offset in 0..terms.len() as u32 {
                positions.insert(anchor + offset);
            }
        }
    }

    for idx in query.free_indices() {
        let term = Tokenizer::lower_term(&query.words[idx]);
        if tokenizer.is_stop_word(&term) {
            continue;
        }
        for &p in record.positions(&term) {
            positions.insert(p);
        }
    }

    if positions.is_empty() {
        return Ok(String::new());
    }

    let sorted: Vec<u32> = positions.into_iter().collect();
    let mut runs: Vec<(u32, u32)> = Vec::new();
    for &p in &sorted {
        match runs.last_mut() {
            Some((_, last)) if *last + 1 == p => *last = p,
            _ => runs.push((p, p)),
        }
    }

    let word_at = |p: u32| record.words.get(p as usize).map(String::as_str);
    let mut parts: Vec<&str> = Vec::new();
    for (ri, &(first, last)) in runs.iter().enumerate() {
        if ri > 0 {
            parts.push("...");
        }
        for p in first.saturating_sub(2)..first {
            if let Some(w) = word_at(p) {
                parts.push(w);
            }
        }
        parts.push("\"-");
        for p in first..=last {
            if let Some(w) = word_at(p) {
                parts.push(w);
            }
        }
        parts.push("-\"");
        for p in last + 1..=last + 2 {
            if let Some(w) = word_at(p) {
                parts.push(w);
            }
        }
    }

    // The marker tokens survive the join and stitch into clean quote spans.
    Ok(parts.join(" ").replace("\"- ", "\"").replace(" -\"", "\""))
}
