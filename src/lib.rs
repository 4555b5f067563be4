//! ordex: a small persistent full-text search engine.
//!
//! Documents carry a title, a body, a URL, and a caller-supplied rank.
//! Queries are bags of words with optional double-quoted phrases; results
//! come back best-rank first (or score-ranked when weights are configured)
//! with a contextual snippet per hit.
//!
//! Storage is pluggable: [`MemoryStorage`] for transient indexes,
//! [`DiskStorage`] for the persistent hash-file layout.

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod models;
pub mod persistence;
pub mod query;
pub mod storage;
pub mod tokenizer;

pub use config::{DiskStorageConfig, EngineConfig, PostingFileConfig, ScoreWeights, TokenizerConfig};
pub use engine::Engine;
pub use error::{OrdexError, Result};
pub use models::{DocId, DocumentInput, PageRecord, SearchHit};
pub use storage::{DiskStorage, DocIdIter, MemoryStorage, Storage};
pub use tokenizer::{TokenStream, Tokenizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
