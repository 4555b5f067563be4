//! Forward-index construction and posting insertion for one document.

use std::collections::{HashMap, HashSet};

use crate::models::DocId;
use crate::storage::Storage;
use crate::tokenizer::Tokenizer;
use crate::Result;

/// Map every lower-cased term (stop words included) to its positions in the
/// document's token sequence.
pub fn build_forward_index(words: &[String]) -> HashMap<String, Vec<u32>> {
    let mut index: HashMap<String, Vec<u32>> = HashMap::new();
    for (pos, word) in words.iter().enumerate() {
        index
            .entry(Tokenizer::lower_term(word))
            .or_default()
            .push(pos as u32);
    }
    index
}

/// Insert the doc id into the posting list of every distinct non-stop term.
///
/// The per-document set keeps each (term, doc) pair unique even when a term
/// repeats in the text.
pub async fn insert_postings<S: Storage>(
    storage: &S,
    doc_id: DocId,
    words: &[String],
    tokenizer: &Tokenizer,
) -> Result<()> {
    let mut inserted: HashSet<String> = HashSet::new();
    for word in words {
        let term = Tokenizer::lower_term(word);
        if tokenizer.is_stop_word(&term) {
            continue;
        }
        if !inserted.insert(term.clone()) {
            continue;
        }
        storage.init_term(&term).await?;
        storage.add_doc_id(&term, doc_id).await?;
    }
    Ok(())
}
