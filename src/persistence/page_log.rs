//! Raw-payload log for forward records.
//!
//! The log itself carries no framing: it is nothing but concatenated
//! payloads. Each record's offset, length, and checksum live in the
//! [`PagePointer`] that the pages index stores as a node payload, so the
//! pointer is the record's sole descriptor and a record is unreadable
//! without its index entry.

use std::io::SeekFrom;
use std::path::PathBuf;

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::OrdexError;
use crate::Result;

/// Descriptor of one record in the page log. Fits a 16-byte posting-file
/// node payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePointer {
    pub offset: u64,
    pub len: u32,
    pub crc32: u32,
}

impl PagePointer {
    /// Fixed 16-byte big-endian form, matching the byte order of the
    /// posting files that store it.
    pub fn encode(&self) -> [u8; 16] {
        let mut buf = [0u8; 16];
        buf[..8].copy_from_slice(&self.offset.to_be_bytes());
        buf[8..12].copy_from_slice(&self.len.to_be_bytes());
        buf[12..16].copy_from_slice(&self.crc32.to_be_bytes());
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < 16 {
            return Err(OrdexError::Corrupt(format!(
                "page pointer needs 16 bytes, got {}",
                buf.len()
            )));
        }
        let mut offset = [0u8; 8];
        offset.copy_from_slice(&buf[..8]);
        let mut len = [0u8; 4];
        len.copy_from_slice(&buf[8..12]);
        let mut crc = [0u8; 4];
        crc.copy_from_slice(&buf[12..16]);
        Ok(Self {
            offset: u64::from_be_bytes(offset),
            len: u32::from_be_bytes(len),
            crc32: u32::from_be_bytes(crc),
        })
    }
}

/// Append-only payload log, one cached handle behind a mutex like the
/// posting files.
pub struct PageLog {
    file: Mutex<File>,
}

impl PageLog {
    pub async fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Append a payload; the returned pointer is the only way to get it back.
    pub async fn append(&self, payload: &[u8]) -> Result<PagePointer> {
        let mut file = self.file.lock().await;
        let offset = file.seek(SeekFrom::End(0)).await?;
        file.write_all(payload).await?;

        Ok(PagePointer {
            offset,
            len: payload.len() as u32,
            crc32: crc32fast::hash(payload),
        })
    }

    /// Read the record a pointer describes, verifying its checksum.
    pub async fn read(&self, ptr: PagePointer) -> Result<Vec<u8>> {
        let mut file = self.file.lock().await;
        file.seek(SeekFrom::Start(ptr.offset)).await?;

        let mut payload = vec![0u8; ptr.len as usize];
        file.read_exact(&mut payload).await?;

        if crc32fast::hash(&payload) != ptr.crc32 {
            return Err(OrdexError::Corrupt(format!(
                "page record at offset {} fails its checksum",
                ptr.offset
            )));
        }
        Ok(payload)
    }
}
