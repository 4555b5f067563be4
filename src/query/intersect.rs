//! k-way sorted-merge intersection over pull iterators.

use async_trait::async_trait;

use crate::models::DocId;
use crate::storage::DocIdIter;
use crate::Result;

/// Side predicate evaluated on every intersection hit. May suspend (the
/// quote filter reads forward records).
#[async_trait]
pub trait DocFilter: Send {
    async fn accept(&mut self, doc_id: DocId) -> Result<bool>;
}

/// Filter that accepts everything.
pub struct AcceptAll;

#[async_trait]
impl DocFilter for AcceptAll {
    async fn accept(&mut self, _doc_id: DocId) -> Result<bool> {
        Ok(true)
    }
}

/// Intersect ascending iterators, keeping values accepted by `filter`, up
/// to `limit` results.
///
/// Each iterator is monotonic, so repeatedly advancing the one holding the
/// minimum (ties: the first such) visits every common value. Stops when any
/// iterator is exhausted or the limit is reached.
pub async fn intersect<'a>(
    iters: &mut [Box<dyn DocIdIter + Send + 'a>],
    limit: usize,
    filter: &mut dyn DocFilter,
) -> Result<Vec<DocId>> {
    let mut results = Vec::new();
    if iters.is_empty() || limit == 0 {
        return Ok(results);
    }

    if iters.len() == 1 {
        while results.len() < limit {
            match iters[0].next().await? {
                Some(id) => {
                    if filter.accept(id).await? {
                        results.push(id);
                    }
                }
                None => break,
            }
        }
        return Ok(results);
    }

    let mut current = Vec::with_capacity(iters.len());
    for iter in iters.iter_mut() {
        match iter.next().await? {
            Some(value) => current.push(value),
            None => return Ok(results),
        }
    }

    loop {
        let first = current[0];
        if current.iter().all(|&v| v == first) {
            if filter.accept(first).await? {
                results.push(first);
                if results.len() >= limit {
                    break;
                }
            }
        }

        let min_value = *current.iter().min().unwrap();
        let min_idx = current.iter().position(|&v| v == min_value).unwrap();
        match iters[min_idx].next().await? {
            Some(value) => current[min_idx] = value,
            None => break,
        }
    }
    Ok(results)
}
