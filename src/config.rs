use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    pub tokenizer_config: TokenizerConfig,
    /// Scoring weights; `None` disables scoring and results come back in
    /// ascending doc-id order (best rank first).
    pub score_weights: Option<ScoreWeights>,
    /// Intersection stops after collecting this many candidates.
    pub max_candidates: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tokenizer_config: TokenizerConfig::default(),
            score_weights: None,
            max_candidates: 100,
        }
    }
}

/// Tokenizer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    /// Language key for the built-in stop-word sets ("english", "swedish").
    pub language: String,
    /// Replaces the built-in language list entirely when set.
    pub custom_stopwords: Option<Vec<String>>,
    /// Stop words added on top of the chosen list.
    pub extra_stopwords: Vec<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: true,
            language: "english".to_string(),
            custom_stopwords: None,
            extra_stopwords: Vec::new(),
        }
    }
}

/// Points granted per matched scoring rule.
///
/// The three title rules are exclusive: the first one satisfied wins, in the
/// order they are declared here. `url_contains` is added on top.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub title_exact_match: u32,
    pub title_begins: u32,
    pub title_contains_in_beginning: u32,
    pub url_contains: u32,
}

/// Layout parameters for one posting file.
///
/// Stored node size is `node_payload + 4` (payload plus the next pointer).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PostingFileConfig {
    /// Maximum key length in bytes; keys are zero-padded to this width.
    pub key_size: usize,
    /// Number of hash buckets.
    pub hash_rows: u32,
    /// Payload bytes per node.
    pub node_payload: usize,
}

impl Default for PostingFileConfig {
    fn default() -> Self {
        Self {
            key_size: 64,
            hash_rows: 16_384,
            node_payload: 4,
        }
    }
}

/// Disk storage configuration: one data directory, three posting files and a
/// page log inside it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiskStorageConfig {
    pub data_dir: PathBuf,
    /// term -> doc-id posting lists (the inverted index)
    pub terms: PostingFileConfig,
    /// doc-id -> page pointer
    pub pages: PostingFileConfig,
    /// url -> doc-id
    pub urls: PostingFileConfig,
}

impl DiskStorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            terms: PostingFileConfig::default(),
            pages: PostingFileConfig {
                key_size: 8,
                hash_rows: 16_384,
                node_payload: 16,
            },
            urls: PostingFileConfig {
                key_size: 256,
                hash_rows: 16_384,
                node_payload: 4,
            },
        }
    }

    /// Shrink every hash table; handy for tests and small corpora.
    pub fn with_hash_rows(mut self, rows: u32) -> Self {
        self.terms.hash_rows = rows;
        self.pages.hash_rows = rows;
        self.urls.hash_rows = rows;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let engine = EngineConfig::default();
        assert_eq!(engine.max_candidates, 100);
        assert!(engine.score_weights.is_none());

        let tokenizer = TokenizerConfig::default();
        assert!(tokenizer.lowercase);
        assert!(tokenizer.remove_stopwords);
        assert_eq!(tokenizer.language, "english");

        let file = PostingFileConfig::default();
        assert_eq!(file.node_payload, 4);
    }

    #[test]
    fn test_disk_config_builder() {
        let config = DiskStorageConfig::new(PathBuf::from("./data")).with_hash_rows(512);
        assert_eq!(config.terms.hash_rows, 512);
        assert_eq!(config.pages.hash_rows, 512);
        assert_eq!(config.urls.hash_rows, 512);
        assert_eq!(config.pages.node_payload, 16);
        assert_eq!(config.urls.key_size, 256);
    }
}
