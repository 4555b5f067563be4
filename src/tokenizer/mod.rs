//! Text tokenization with quote grouping.

mod tokenizer;

pub use tokenizer::{TokenStream, Tokenizer};
