// file: src/models/patent.rs
// description: normalized patent record produced by every source
// reference: internal data structures

use crate::models::SourceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatentRecord {
    pub patent_number: String,

    #[serde(default)]
    pub title: String,

    #[serde(rename = "abstract", default)]
    pub abstract_text: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub source: SourceKind,

    #[serde(default)]
    pub inventors: Vec<String>,

    #[serde(default)]
    pub assignees: Vec<String>,

    #[serde(default)]
    pub classifications: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filing_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_date: Option<String>,

    #[serde(default)]
    pub claims: Vec<String>,

    /// Query text that first surfaced this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_query: Option<String>,

    pub download_timestamp: DateTime<Utc>,
}

/// Fields scraped from a patent's detail page. Empty values never replace
/// data already on the record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatentDetails {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub description: Option<String>,
    pub inventors: Vec<String>,
    pub assignees: Vec<String>,
    pub classifications: Vec<String>,
    pub claims: Vec<String>,
    pub filing_date: Option<String>,
    pub publication_date: Option<String>,
    pub priority_date: Option<String>,
}

impl PatentRecord {
    pub fn new(
        patent_number: impl Into<String>,
        title: impl Into<String>,
        source: SourceKind,
    ) -> Self {
        Self {
            patent_number: patent_number.into(),
            title: title.into(),
            abstract_text: String::new(),
            description: String::new(),
            url: None,
            source,
            inventors: Vec::new(),
            assignees: Vec::new(),
            classifications: Vec::new(),
            filing_date: None,
            publication_date: None,
            priority_date: None,
            claims: Vec::new(),
            matched_query: None,
            download_timestamp: Utc::now(),
        }
    }

    pub fn with_abstract(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = abstract_text.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Identifier reduced to ASCII alphanumerics, used in output file names.
    pub fn file_key(&self) -> String {
        clean_identifier(&self.patent_number)
    }

    /// Flattened text used as the training field of the JSONL corpus.
    pub fn corpus_text(&self) -> String {
        format!(
            "Patent {}: {}. {} {}",
            self.patent_number, self.title, self.abstract_text, self.description
        )
        .trim_end()
        .to_string()
    }

    /// Date reported in the CSV index: filing date, then publication date.
    pub fn index_date(&self) -> Option<&str> {
        self.filing_date
            .as_deref()
            .or(self.publication_date.as_deref())
    }

    pub fn merge_details(&mut self, details: PatentDetails) {
        fn take(slot: &mut String, value: Option<String>) {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                *slot = value;
            }
        }
        fn take_opt(slot: &mut Option<String>, value: Option<String>) {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                *slot = Some(value);
            }
        }
        fn take_vec(slot: &mut Vec<String>, value: Vec<String>) {
            if !value.is_empty() {
                *slot = value;
            }
        }

        take(&mut self.title, details.title);
        take(&mut self.abstract_text, details.abstract_text);
        take(&mut self.description, details.description);
        take_vec(&mut self.inventors, details.inventors);
        take_vec(&mut self.assignees, details.assignees);
        take_vec(&mut self.classifications, details.classifications);
        take_vec(&mut self.claims, details.claims);
        take_opt(&mut self.filing_date, details.filing_date);
        take_opt(&mut self.publication_date, details.publication_date);
        take_opt(&mut self.priority_date, details.priority_date);
    }
}

pub fn clean_identifier(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}
