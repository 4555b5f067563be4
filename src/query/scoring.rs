//! Title and URL scoring rules for search candidates.

use std::collections::{BTreeSet, HashSet};

use crate::config::ScoreWeights;
use crate::models::PageRecord;
use crate::tokenizer::Tokenizer;

/// Score a candidate against the lower-cased non-stop query terms.
///
/// The title rules are exclusive in declaration order: an exact title match
/// beats a match at position zero, which beats a match within the first
/// three title tokens. The URL rule is additive and requires every query
/// term to appear as a whole URL token.
pub fn score(
    record: &PageRecord,
    query_terms: &[String],
    tokenizer: &Tokenizer,
    weights: &ScoreWeights,
) -> u32 {
    if query_terms.is_empty() {
        return 0;
    }

    let title_len = tokenizer.tokenize_raw(&record.title).words.len();

    let mut matched: BTreeSet<u32> = BTreeSet::new();
    for term in query_terms {
        for &p in record.positions(term) {
            matched.insert(p);
        }
    }

    let mut total = 0u32;

    let natural_prefix = matched
        .iter()
        .enumerate()
        .all(|(i, &p)| p as usize == i);
    if !matched.is_empty() && natural_prefix && matched.len() == title_len {
        total += weights.title_exact_match;
    } else if matched.contains(&0) {
        total += weights.title_begins;
    } else if matched
        .iter()
        .next()
        .is_some_and(|&p| (p as usize) < title_len && p < 3)
    {
        total += weights.title_contains_in_beginning;
    }

    let url_tokens: HashSet<String> = tokenizer
        .tokenize_with(&record.url, true, false)
        .words
        .into_iter()
        .collect();
    if query_terms.iter().all(|t| url_tokens.contains(t)) {
        total += weights.url_contains;
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenizerConfig;
    use std::collections::HashMap;

    fn tokenizer() -> Tokenizer {
        Tokenizer::new(&TokenizerConfig::default())
    }

    fn weights() -> ScoreWeights {
        ScoreWeights {
            title_exact_match: 100,
            title_begins: 50,
            title_contains_in_beginning: 20,
            url_contains: 10,
        }
    }

    fn record(title: &str, text: &str, url: &str) -> PageRecord {
        let tok = tokenizer();
        let words = tok.tokenize_raw(&format!("{} {}", title, text)).words;
        let mut index: HashMap<String, Vec<u32>> = HashMap::new();
        for (pos, word) in words.iter().enumerate() {
            index
                .entry(Tokenizer::lower_term(word))
                .or_default()
                .push(pos as u32);
        }
        PageRecord {
            title: title.to_string(),
            url: url.to_string(),
            words,
            index,
        }
    }

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_title_exact_match() {
        let rec = record("Gas Giant", "made mostly of hydrogen", "https://example.org/page");
        assert_eq!(score(&rec, &terms(&["gas", "giant"]), &tokenizer(), &weights()), 100);
    }

    #[test]
    fn test_title_begins() {
        // "gas" alone matches position 0 but not the whole two-token title
        let rec = record("Gas Giant", "made mostly of hydrogen", "https://example.org/page");
        assert_eq!(score(&rec, &terms(&["gas"]), &tokenizer(), &weights()), 50);
    }

    #[test]
    fn test_title_contains_in_beginning() {
        let rec = record("The Great Giant", "made of rock", "https://example.org/page");
        assert_eq!(score(&rec, &terms(&["giant"]), &tokenizer(), &weights()), 20);
    }

    #[test]
    fn test_late_title_match_scores_nothing() {
        let rec = record("A Very Long Title About Giants", "text", "https://example.org/page");
        assert_eq!(score(&rec, &terms(&["giants"]), &tokenizer(), &weights()), 0);
    }

    #[test]
    fn test_url_contains_is_additive() {
        let rec = record(
            "Process",
            "a process description",
            "https://en.wikipedia.org/wiki/Process",
        );
        // "process" matches title position 0 (not exact: text repeats it) and
        // appears as a URL token
        assert_eq!(score(&rec, &terms(&["process"]), &tokenizer(), &weights()), 60);
    }

    #[test]
    fn test_url_requires_every_term() {
        let rec = record("Process", "text", "https://en.wikipedia.org/wiki/Process");
        // matched positions are exactly {0} and the title has one token, so
        // the exact rule fires even though "wikipedia" matches no position
        let s = score(&rec, &terms(&["process", "wikipedia"]), &tokenizer(), &weights());
        assert_eq!(s, 110);

        // "absent" is not a URL token, so only the title family scores
        let s = score(&rec, &terms(&["process", "absent"]), &tokenizer(), &weights());
        assert_eq!(s, 100);
    }

    #[test]
    fn test_no_weights_means_zero() {
        let rec = record("Gas Giant", "text", "https://example.org");
        assert_eq!(
            score(&rec, &terms(&["gas", "giant"]), &tokenizer(), &ScoreWeights::default()),
            0
        );
    }

    #[test]
    fn test_text_match_only_scores_nothing() {
        let rec = record("Saturn", "a ringed gas giant", "https://example.org/saturn");
        assert_eq!(score(&rec, &terms(&["ringed"]), &tokenizer(), &weights()), 0);
    }
}
