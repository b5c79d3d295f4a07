// file: src/models/query.rs
// description: search query model for free-text terms and classification codes

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Term,
    Classification,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub kind: QueryKind,
}

impl SearchQuery {
    pub fn term(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: QueryKind::Term,
        }
    }

    pub fn classification(code: impl Into<String>) -> Self {
        Self {
            text: code.into(),
            kind: QueryKind::Classification,
        }
    }

    pub fn is_classification(&self) -> bool {
        self.kind == QueryKind::Classification
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
