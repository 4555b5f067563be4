use async_trait::async_trait;

use super::{DocIdIter, Storage, VecDocIds};
use crate::codec::{decode_u32, encode_u32};
use crate::config::DiskStorageConfig;
use crate::error::OrdexError;
use crate::models::{DocId, PageRecord, NO_DOC};
use crate::persistence::{NodeCursor, PageLog, PagePointer, PostingFile};
use crate::Result;

/// Disk-backed storage.
///
/// Three posting files and a payload log under one data directory:
/// - `terms.idx`: term -> sorted doc-id list (the inverted index)
/// - `pages.idx`: doc-id -> 16-byte page pointer
/// - `urls.idx`:  url -> doc id
/// - `pages.blob`: raw bincode forward records; each record's offset,
///   length, and checksum live in its `pages.idx` pointer
///
/// Every term list starts with the zero sentinel node its `set` wrote; the
/// doc-id iterator skips it.
pub struct DiskStorage {
    terms: PostingFile,
    pages: PostingFile,
    urls: PostingFile,
    log: PageLog,
}

impl DiskStorage {
    pub async fn open(config: DiskStorageConfig) -> Result<Self> {
        let dir = &config.data_dir;
        tokio::fs::create_dir_all(dir).await?;

        let terms = PostingFile::open(dir.join("terms.idx"), config.terms).await?;
        let pages = PostingFile::open(dir.join("pages.idx"), config.pages).await?;
        let urls = PostingFile::open(dir.join("urls.idx"), config.urls).await?;
        let log = PageLog::open(dir.join("pages.blob")).await?;

        tracing::debug!(dir = %dir.display(), "opened disk storage");
        Ok(Self {
            terms,
            pages,
            urls,
            log,
        })
    }

    fn page_key(doc_id: DocId) -> [u8; 4] {
        encode_u32(doc_id)
    }
}

/// Doc-id iterator over a term's node list, skipping the sentinel head.
struct DiskDocIds<'a> {
    cursor: NodeCursor<'a>,
}

#[async_trait]
impl DocIdIter for DiskDocIds<'_> {
    async fn next(&mut self) -> Result<Option<DocId>> {
        while let Some((payload, _)) = self.cursor.next().await? {
            let doc_id = decode_u32(&payload);
            if doc_id != NO_DOC {
                return Ok(Some(doc_id));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl Storage for DiskStorage {
    async fn word_iterator<'a>(&'a self, term: &str) -> Result<Box<dyn DocIdIter + Send + 'a>> {
        match self.terms.iter(term.as_bytes()).await {
            Ok(cursor) => Ok(Box::new(DiskDocIds { cursor })),
            // A term wider than the key slot can never have been indexed.
            Err(OrdexError::KeyTooLong { .. }) => Ok(Box::new(VecDocIds::empty())),
            Err(e) => Err(e),
        }
    }

    async fn init_term(&self, term: &str) -> Result<()> {
        if self.terms.get(term.as_bytes()).await?.is_none() {
            self.terms.set(term.as_bytes(), None).await?;
        }
        Ok(())
    }

    async fn reset_term(&self, term: &str) -> Result<()> {
        self.terms.set(term.as_bytes(), None).await
    }

    async fn add_doc_id(&self, term: &str, doc_id: DocId) -> Result<()> {
        let payload = encode_u32(doc_id);

        // One walk finds the sorted slot and spots an existing entry.
        let mut cursor = self.terms.iter(term.as_bytes()).await?;
        let mut position = 0usize;
        let mut seen_any = false;
        while let Some((node_payload, _)) = cursor.next().await? {
            seen_any = true;
            if node_payload.as_slice() >= payload.as_slice() {
                if node_payload.as_slice() == payload.as_slice() {
                    return Ok(());
                }
                break;
            }
            position += 1;
        }
        if !seen_any {
            return Err(OrdexError::KeyMissing(term.to_string()));
        }
        self.terms.insert_at(term.as_bytes(), position, &payload).await
    }

    async fn init_page(&self, doc_id: DocId, record: &PageRecord) -> Result<()> {
        let payload = bincode::serialize(record)?;
        let ptr = self.log.append(&payload).await?;
        self.pages
            .set(&Self::page_key(doc_id), Some(&ptr.encode()))
            .await
    }

    async fn get_page(&self, doc_id: DocId) -> Result<Option<PageRecord>> {
        let Some(bytes) = self.pages.get(&Self::page_key(doc_id)).await? else {
            return Ok(None);
        };
        let ptr = PagePointer::decode(&bytes)?;
        let payload = self.log.read(ptr).await?;
        Ok(Some(bincode::deserialize(&payload)?))
    }

    async fn get_url_to_page(&self, url: &str) -> Result<Option<DocId>> {
        let Some(bytes) = self.urls.get(url.as_bytes()).await? else {
            return Ok(None);
        };
        Ok(Some(decode_u32(&bytes)))
    }

    async fn set_url_to_page(&self, url: &str, doc_id: DocId) -> Result<()> {
        self.urls.set(url.as_bytes(), Some(&encode_u32(doc_id))).await
    }

    async fn reserve_doc_id(&self, proposed_rank: DocId) -> Result<DocId> {
        let mut rank = proposed_rank;
        loop {
            if rank == 0 {
                return Err(OrdexError::RankExhausted(proposed_rank));
            }
            if self.pages.get(&Self::page_key(rank)).await?.is_none() {
                return Ok(rank);
            }
            rank -= 1;
        }
    }

    async fn document_count(&self) -> Result<u64> {
        self.pages.key_count().await
    }
}
