pub mod document;
pub mod search;

pub use document::{DocId, DocumentInput, PageRecord, NO_DOC};
pub use search::SearchHit;
