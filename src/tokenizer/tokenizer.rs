use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

use crate::config::TokenizerConfig;

/// Tokenized text: the token sequence plus quote-group boundaries.
///
/// `quotes` holds positions into `words`; entries pair up as `[start, end)`
/// ranges of quoted phrases. An odd trailing entry (unbalanced quote in the
/// source text) is ignored by `quoted_ranges`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenStream {
    pub words: Vec<String>,
    pub quotes: Vec<usize>,
}

impl TokenStream {
    /// Complete `[start, end)` quoted ranges, dropping a trailing unpaired
    /// quote mark.
    pub fn quoted_ranges(&self) -> Vec<(usize, usize)> {
        self.quotes
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect()
    }

    /// Whether the token at `idx` falls inside any complete quoted range.
    pub fn is_quoted(&self, idx: usize) -> bool {
        self.quoted_ranges()
            .iter()
            .any(|&(start, end)| idx >= start && idx < end)
    }

    /// Indices of tokens outside every quoted range.
    pub fn free_indices(&self) -> Vec<usize> {
        (0..self.words.len()).filter(|&i| !self.is_quoted(i)).collect()
    }
}

/// Text tokenizer with quote grouping and stop-word elision.
pub struct Tokenizer {
    config: TokenizerConfig,
    stopwords: HashSet<String>,
}

/// Characters that survive tokenization: ASCII letters and digits plus the
/// extended-letter allowlist.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, 'å' | 'ä' | 'ö' | 'Å' | 'Ä' | 'Ö')
}

impl Tokenizer {
    /// Create a new tokenizer from configuration
    pub fn new(config: &TokenizerConfig) -> Self {
        let language = match config.language.as_str() {
            "swedish" => LANGUAGE::Swedish,
            _ => LANGUAGE::English,
        };

        let mut stopwords: HashSet<String> = match (&config.custom_stopwords, config.remove_stopwords) {
            (Some(words), _) => words.iter().map(|s| Self::lower_term(s)).collect(),
            (None, true) => get(language).into_iter().map(|s| Self::lower_term(&s)).collect(),
            (None, false) => HashSet::new(),
        };
        for word in &config.extra_stopwords {
            stopwords.insert(Self::lower_term(word));
        }

        Self {
            config: config.clone(),
            stopwords,
        }
    }

    /// Tokenize with the configured flags.
    pub fn tokenize(&self, text: &str) -> TokenStream {
        self.tokenize_with(text, self.config.lowercase, self.config.remove_stopwords)
    }

    /// Tokenize preserving case and stop words. This is the form indexing
    /// and query parsing consume; both lower-case and elide per term later.
    pub fn tokenize_raw(&self, text: &str) -> TokenStream {
        self.tokenize_with(text, false, false)
    }

    /// Tokenize with explicit flags.
    ///
    /// Quote marks are recorded as positions over the kept tokens, so elided
    /// stop words do not advance the quote index.
    pub fn tokenize_with(
        &self,
        text: &str,
        lowercase: bool,
        remove_stopwords: bool,
    ) -> TokenStream {
        // Non-token characters collapse to spaces; quote marks are isolated
        // so they split into their own pieces.
        let mut normalized = String::with_capacity(text.len() + 8);
        for c in text.chars() {
            if c == '"' {
                normalized.push(' ');
                normalized.push('"');
                normalized.push(' ');
            } else if is_token_char(c) || c.is_whitespace() {
                normalized.push(c);
            } else {
                normalized.push(' ');
            }
        }

        let mut stream = TokenStream::default();
        let mut kept = 0usize;
        for piece in normalized.split_whitespace() {
            if piece == "\"" {
                stream.quotes.push(kept);
                continue;
            }
            let cleaned: String = piece.chars().filter(|&c| is_token_char(c)).collect();
            if cleaned.is_empty() {
                continue;
            }
            if remove_stopwords && self.is_stop_word(&Self::lower_term(&cleaned)) {
                continue;
            }
            let token = if lowercase {
                Self::lower_term(&cleaned)
            } else {
                cleaned
            };
            stream.words.push(token);
            kept += 1;
        }
        stream
    }

    /// A term is a stop word iff it is shorter than two characters or sits
    /// in the configured set. Expects a lower-cased term.
    pub fn is_stop_word(&self, term: &str) -> bool {
        term.chars().count() < 2 || self.stopwords.contains(term)
    }

    /// ASCII lower-casing plus the fixed extended-letter mapping.
    pub fn lower_term(token: &str) -> String {
        token
            .chars()
            .map(|c| match c {
                'Å' => 'å',
                'Ä' => 'ä',
                'Ö' => 'ö',
                _ => c.to_ascii_lowercase(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_tokenizer() -> Tokenizer {
        Tokenizer::new(&TokenizerConfig {
            lowercase: false,
            remove_stopwords: false,
            ..TokenizerConfig::default()
        })
    }

    #[test]
    fn test_basic_tokenization() {
        let tokenizer = raw_tokenizer();
        let stream = tokenizer.tokenize("Hello, World! It's a test.");
        assert_eq!(stream.words, vec!["Hello", "World", "It", "s", "a", "test"]);
        assert!(stream.quotes.is_empty());
    }

    #[test]
    fn test_quote_positions() {
        let tokenizer = raw_tokenizer();
        let stream = tokenizer.tokenize("say \"hello world\" now");
        assert_eq!(stream.words, vec!["say", "hello", "world", "now"]);
        assert_eq!(stream.quotes, vec![1, 3]);
        assert_eq!(stream.quoted_ranges(), vec![(1, 3)]);
        assert!(stream.is_quoted(1));
        assert!(stream.is_quoted(2));
        assert!(!stream.is_quoted(0));
        assert_eq!(stream.free_indices(), vec![0, 3]);
    }

    #[test]
    fn test_unbalanced_quote_is_ignored() {
        let tokenizer = raw_tokenizer();
        let stream = tokenizer.tokenize("say \"hello world");
        assert_eq!(stream.quotes, vec![1]);
        assert!(stream.quoted_ranges().is_empty());
        assert!(!stream.is_quoted(1));
    }

    #[test]
    fn test_extended_letters_survive() {
        let tokenizer = raw_tokenizer();
        let stream = tokenizer.tokenize("Ångström växjö öl");
        assert_eq!(stream.words, vec!["Ångström", "växjö", "öl"]);
        assert_eq!(Tokenizer::lower_term("Ångström"), "ångström");
    }

    #[test]
    fn test_punctuation_splits_tokens() {
        let tokenizer = raw_tokenizer();
        let stream = tokenizer.tokenize("third-brightest two-and-a-half");
        assert_eq!(
            stream.words,
            vec!["third", "brightest", "two", "and", "a", "half"]
        );
    }

    #[test]
    fn test_lowercase_flag() {
        let tokenizer = raw_tokenizer();
        let stream = tokenizer.tokenize_with("Gas Giant", true, false);
        assert_eq!(stream.words, vec!["gas", "giant"]);
    }

    #[test]
    fn test_stopword_removal_keeps_quote_indexing() {
        let tokenizer = Tokenizer::new(&TokenizerConfig::default());
        // "the" is elided, so the quoted range starts at the kept token.
        let stream = tokenizer.tokenize_with("the \"gas giant\" planet", true, true);
        assert_eq!(stream.words, vec!["gas", "giant", "planet"]);
        assert_eq!(stream.quotes, vec![0, 2]);
    }

    #[test]
    fn test_single_letter_terms_are_stop_words() {
        let tokenizer = Tokenizer::new(&TokenizerConfig::default());
        assert!(tokenizer.is_stop_word("a"));
        assert!(tokenizer.is_stop_word("the"));
        assert!(!tokenizer.is_stop_word("jupiter"));
    }

    #[test]
    fn test_extra_stopwords() {
        let tokenizer = Tokenizer::new(&TokenizerConfig {
            extra_stopwords: vec!["planet".to_string()],
            ..TokenizerConfig::default()
        });
        assert!(tokenizer.is_stop_word("planet"));
    }

    #[test]
    fn test_retokenizing_joined_words_is_stable() {
        let tokenizer = raw_tokenizer();
        let first = tokenizer.tokenize("Jupiter, the \"gas giant\" planet!");
        let second = tokenizer.tokenize(&first.words.join(" "));
        assert_eq!(first.words, second.words);
        // quote marks do not survive the join; the word sequence does
        assert!(second.quotes.is_empty());
    }

    #[test]
    fn test_custom_stopwords_replace_builtin_list() {
        let tokenizer = Tokenizer::new(&TokenizerConfig {
            custom_stopwords: Some(vec!["the".to_string(), "and".to_string()]),
            ..TokenizerConfig::default()
        });
        assert!(tokenizer.is_stop_word("the"));
        // "of" is in the built-in list but not in the custom one
        assert!(!tokenizer.is_stop_word("of"));
    }
}
