use serde::{Deserialize, Serialize};

/// One search result: the document's title and URL plus a short contextual
/// snippet ("introduction") with matched runs wrapped in double quotes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub introduction: String,
}

impl SearchHit {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        introduction: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            introduction: introduction.into(),
        }
    }
}
