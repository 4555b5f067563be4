//! Persistent hash map whose value per key is a singly linked list of
//! fixed-size node payloads, laid out in a single file.
//!
//! File regions:
//! - header (4 bytes): big-endian offset of the next free node slot
//! - bucket table: `hash_rows` buckets of `{ key, head: u32, tail: u32 }`,
//!   keys zero-padded to `key_size`; a bucket is vacant iff `head == 0`
//! - node area: fixed-size nodes `{ payload, next: u32 }`, bump-allocated,
//!   never freed or relocated
//!
//! All multi-byte integers are big-endian. Collisions are resolved by
//! quadratic probing over the bucket table. Nodes are written before the
//! bucket or free-pointer updates that reference them, so a torn write can
//! orphan a node but never dangle a pointer.

use std::io::SeekFrom;
use std::path::PathBuf;

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::codec::{decode_u32, encode_u32, fnv1a_32};
use crate::config::PostingFileConfig;
use crate::error::OrdexError;
use crate::Result;

const HEADER_SIZE: u64 = 4;

/// One cached file handle per store; every operation seeks before it reads
/// or writes, so interleaved cursors stay consistent.
pub struct PostingFile {
    path: PathBuf,
    config: PostingFileConfig,
    file: Mutex<File>,
}

/// Where a key landed in the bucket table.
enum Slot {
    Found { row: u32, head: u32, tail: u32 },
    Vacant { row: u32 },
}

impl PostingFile {
    pub async fn open(path: PathBuf, config: PostingFileConfig) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .await?;

        let store = Self {
            path,
            config,
            file: Mutex::new(file),
        };

        {
            let mut file = store.file.lock().await;
            if file.metadata().await?.len() == 0 {
                // Fresh file: zero the bucket table and point the free
                // pointer at the start of the node area.
                file.set_len(store.node_area_start()).await?;
                file.seek(SeekFrom::Start(0)).await?;
                file.write_all(&encode_u32(store.node_area_start() as u32))
                    .await?;
                tracing::debug!(path = %store.path.display(), rows = store.config.hash_rows, "initialized posting file");
            }
        }

        Ok(store)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn config(&self) -> &PostingFileConfig {
        &self.config
    }

    fn bucket_size(&self) -> u64 {
        self.config.key_size as u64 + 8
    }

    fn node_size(&self) -> u64 {
        self.config.node_payload as u64 + 4
    }

    fn bucket_offset(&self, row: u32) -> u64 {
        HEADER_SIZE + row as u64 * self.bucket_size()
    }

    fn node_area_start(&self) -> u64 {
        HEADER_SIZE + self.config.hash_rows as u64 * self.bucket_size()
    }

    fn pad_key(&self, key: &[u8]) -> Result<Vec<u8>> {
        if key.len() > self.config.key_size {
            return Err(OrdexError::KeyTooLong {
                len: key.len(),
                max: self.config.key_size,
            });
        }
        let mut padded = vec![0u8; self.config.key_size];
        padded[..key.len()].copy_from_slice(key);
        Ok(padded)
    }

    fn pad_payload(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() > self.config.node_payload {
            return Err(OrdexError::PayloadTooLarge {
                len: payload.len(),
                max: self.config.node_payload,
            });
        }
        let mut padded = vec![0u8; self.config.node_payload];
        padded[..payload.len()].copy_from_slice(payload);
        Ok(padded)
    }

    /// Initialize a key with a head node, or reset an existing key.
    ///
    /// Resetting rewrites the head node as `{ payload, next: 0 }` and points
    /// the bucket's tail back at the head; nodes past the head are orphaned.
    pub async fn set(&self, key: &[u8], payload: Option<&[u8]>) -> Result<()> {
        let padded_key = self.pad_key(key)?;
        let padded_payload = match payload {
            Some(p) => self.pad_payload(p)?,
            None => vec![0u8; self.config.node_payload],
        };

        let mut file = self.file.lock().await;
        match self.locate(&mut file, key, &padded_key).await? {
            Slot::Vacant { row } => {
                let node = self.allocate(&mut file, &padded_payload, 0).await?;
                self.write_bucket(&mut file, row, &padded_key, node, node)
                    .await?;
            }
            Slot::Found { row, head, .. } => {
                self.write_node(&mut file, head, &padded_payload, 0).await?;
                self.write_bucket_pointers(&mut file, row, head, head).await?;
            }
        }
        Ok(())
    }

    /// Insert a payload at logical position `index` in the key's list.
    ///
    /// The key must have been `set` first. A walk that runs off the end of
    /// the list degrades to an append.
    pub async fn insert_at(&self, key: &[u8], index: usize, payload: &[u8]) -> Result<()> {
        let padded_key = self.pad_key(key)?;
        let padded_payload = self.pad_payload(payload)?;

        let mut file = self.file.lock().await;
        let (row, head, tail) = match self.locate(&mut file, key, &padded_key).await? {
            Slot::Found { row, head, tail } => (row, head, tail),
            Slot::Vacant { .. } => {
                return Err(OrdexError::KeyMissing(
                    String::from_utf8_lossy(key).into_owned(),
                ))
            }
        };

        if index == 0 {
            let node = self.allocate(&mut file, &padded_payload, head).await?;
            self.write_bucket_pointers(&mut file, row, node, tail).await?;
            return Ok(());
        }

        let mut prev = head;
        for _ in 0..index - 1 {
            let (_, next) = self.read_node(&mut file, prev).await?;
            if next == 0 {
                break;
            }
            prev = next;
        }
        let (_, curr) = self.read_node(&mut file, prev).await?;

        let node = self.allocate(&mut file, &padded_payload, curr).await?;
        self.write_next_pointer(&mut file, prev, node).await?;
        if curr == 0 {
            self.write_bucket_pointers(&mut file, row, head, node).await?;
        }
        Ok(())
    }

    /// Append a payload at the end of the key's list without walking it.
    pub async fn append(&self, key: &[u8], payload: &[u8]) -> Result<()> {
        let padded_key = self.pad_key(key)?;
        let padded_payload = self.pad_payload(payload)?;

        let mut file = self.file.lock().await;
        let (row, head, tail) = match self.locate(&mut file, key, &padded_key).await? {
            Slot::Found { row, head, tail } => (row, head, tail),
            Slot::Vacant { .. } => {
                return Err(OrdexError::KeyMissing(
                    String::from_utf8_lossy(key).into_owned(),
                ))
            }
        };

        let node = self.allocate(&mut file, &padded_payload, 0).await?;
        self.write_next_pointer(&mut file, tail, node).await?;
        self.write_bucket_pointers(&mut file, row, head, node).await?;
        Ok(())
    }

    /// Smallest position whose node payload byte-compares at or above
    /// `payload`; the list length when every node compares below it.
    pub async fn find_sorted_position(&self, key: &[u8], payload: &[u8]) -> Result<usize> {
        let padded_key = self.pad_key(key)?;
        let padded_payload = self.pad_payload(payload)?;

        let mut file = self.file.lock().await;
        let head = match self.locate(&mut file, key, &padded_key).await? {
            Slot::Found { head, .. } => head,
            Slot::Vacant { .. } => {
                return Err(OrdexError::KeyMissing(
                    String::from_utf8_lossy(key).into_owned(),
                ))
            }
        };

        let mut offset = head;
        let mut position = 0usize;
        loop {
            let (node_payload, next) = self.read_node(&mut file, offset).await?;
            if node_payload.as_slice() >= padded_payload.as_slice() {
                return Ok(position);
            }
            position += 1;
            if next == 0 {
                return Ok(position);
            }
            offset = next;
        }
    }

    /// Head-node payload for a key, or `None` when the key is absent.
    pub async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let padded_key = self.pad_key(key)?;
        let mut file = self.file.lock().await;
        match self.locate(&mut file, key, &padded_key).await? {
            Slot::Found { head, .. } => {
                let (payload, _) = self.read_node(&mut file, head).await?;
                Ok(Some(payload))
            }
            Slot::Vacant { .. } => Ok(None),
        }
    }

    /// Forward-only cursor over a key's list; yields `(payload, offset)`.
    /// An absent key yields an empty cursor. Must not be interleaved with
    /// mutations of the same key.
    pub async fn iter(&self, key: &[u8]) -> Result<NodeCursor<'_>> {
        let padded_key = self.pad_key(key)?;
        let mut file = self.file.lock().await;
        let head = match self.locate(&mut file, key, &padded_key).await? {
            Slot::Found { head, .. } => head,
            Slot::Vacant { .. } => 0,
        };
        Ok(NodeCursor {
            store: self,
            next: head,
        })
    }

    /// Number of occupied buckets, via one sequential scan of the table.
    pub async fn key_count(&self) -> Result<u64> {
        let mut file = self.file.lock().await;
        file.seek(SeekFrom::Start(HEADER_SIZE)).await?;

        let bucket_size = self.bucket_size() as usize;
        let total = self.config.hash_rows as u64 * self.bucket_size();
        let mut remaining = total as usize;
        let mut carry: Vec<u8> = Vec::new();
        let mut count = 0u64;

        while remaining > 0 {
            let chunk = remaining.min(64 * 1024);
            let mut buf = vec![0u8; chunk];
            file.read_exact(&mut buf).await?;
            remaining -= chunk;

            carry.extend_from_slice(&buf);
            let whole = carry.len() / bucket_size * bucket_size;
            for bucket in carry[..whole].chunks_exact(bucket_size) {
                if decode_u32(&bucket[self.config.key_size..self.config.key_size + 4]) != 0 {
                    count += 1;
                }
            }
            carry.drain(..whole);
        }
        Ok(count)
    }

    /// Probe the bucket table for a key. Probing is bounded at `hash_rows`
    /// steps; exhausting them reports the table full.
    async fn locate(&self, file: &mut File, key: &[u8], padded_key: &[u8]) -> Result<Slot> {
        let h = fnv1a_32(key) as u64;
        let rows = self.config.hash_rows as u64;
        let mut buf = vec![0u8; self.bucket_size() as usize];

        for c in 0..rows {
            let row = ((h + c * c) % rows) as u32;
            file.seek(SeekFrom::Start(self.bucket_offset(row))).await?;
            file.read_exact(&mut buf).await?;

            let head = decode_u32(&buf[self.config.key_size..self.config.key_size + 4]);
            if head == 0 {
                return Ok(Slot::Vacant { row });
            }
            if &buf[..self.config.key_size] == padded_key {
                let tail = decode_u32(&buf[self.config.key_size + 4..self.config.key_size + 8]);
                return Ok(Slot::Found { row, head, tail });
            }
        }
        Err(OrdexError::BucketFull)
    }

    /// Write a node at the current free offset, then bump the free pointer.
    async fn allocate(&self, file: &mut File, padded_payload: &[u8], next: u32) -> Result<u32> {
        file.seek(SeekFrom::Start(0)).await?;
        let mut header = [0u8; 4];
        file.read_exact(&mut header).await?;
        let offset = decode_u32(&header);

        self.write_node(file, offset, padded_payload, next).await?;

        file.seek(SeekFrom::Start(0)).await?;
        file.write_all(&encode_u32(offset + self.node_size() as u32))
            .await?;
        Ok(offset)
    }

    async fn read_node(&self, file: &mut File, offset: u32) -> Result<(Vec<u8>, u32)> {
        file.seek(SeekFrom::Start(offset as u64)).await?;
        let mut buf = vec![0u8; self.node_size() as usize];
        file.read_exact(&mut buf).await?;
        let next = decode_u32(&buf[self.config.node_payload..]);
        buf.truncate(self.config.node_payload);
        Ok((buf, next))
    }

    async fn write_node(
        &self,
        file: &mut File,
        offset: u32,
        padded_payload: &[u8],
        next: u32,
    ) -> Result<()> {
        file.seek(SeekFrom::Start(offset as u64)).await?;
        file.write_all(padded_payload).await?;
        file.write_all(&encode_u32(next)).await?;
        Ok(())
    }

    async fn write_next_pointer(&self, file: &mut File, node: u32, next: u32) -> Result<()> {
        file.seek(SeekFrom::Start(node as u64 + self.config.node_payload as u64))
            .await?;
        file.write_all(&encode_u32(next)).await?;
        Ok(())
    }

    async fn write_bucket(
        &self,
        file: &mut File,
        row: u32,
        padded_key: &[u8],
        head: u32,
        tail: u32,
    ) -> Result<()> {
        file.seek(SeekFrom::Start(self.bucket_offset(row))).await?;
        file.write_all(padded_key).await?;
        file.write_all(&encode_u32(head)).await?;
        file.write_all(&encode_u32(tail)).await?;
        Ok(())
    }

    async fn write_bucket_pointers(
        &self,
        file: &mut File,
        row: u32,
        head: u32,
        tail: u32,
    ) -> Result<()> {
        file.seek(SeekFrom::Start(
            self.bucket_offset(row) + self.config.key_size as u64,
        ))
        .await?;
        file.write_all(&encode_u32(head)).await?;
        file.write_all(&encode_u32(tail)).await?;
        Ok(())
    }
}

/// Forward-only list cursor. Each step takes the file lock once, so cursors
/// over different keys interleave freely.
pub struct NodeCursor<'a> {
    store: &'a PostingFile,
    next: u32,
}

impl<'a> NodeCursor<'a> {
    pub async fn next(&mut self) -> Result<Option<(Vec<u8>, u32)>> {
        if self.next == 0 {
            return Ok(None);
        }
        let offset = self.next;
        let mut file = self.store.file.lock().await;
        let (payload, next) = self.store.read_node(&mut file, offset).await?;
        self.next = next;
        Ok(Some((payload, offset)))
    }
}
