// file: src/models/summary.rs
// description: end-of-run download report accumulated across query/source pairs

use crate::error::{FetchErrorKind, PipelineError};
use crate::models::{SearchQuery, SourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub query: String,
    pub source: SourceKind,
    pub kind: FetchErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilesCreated {
    pub json_files: usize,
    pub text_files: usize,
    pub corpus_file: String,
    pub index_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadSummary {
    pub run_id: Uuid,
    pub download_date: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub output_directory: String,
    pub search_terms_used: Vec<String>,
    pub classification_codes: Vec<String>,
    pub pairs_attempted: usize,
    pub pairs_succeeded: usize,
    pub pairs_failed: usize,
    /// query -> source key -> records returned for that pair
    pub counts: BTreeMap<String, BTreeMap<String, usize>>,
    pub per_source: BTreeMap<String, usize>,
    pub failures: Vec<FetchFailure>,
    pub duplicates_skipped: usize,
    pub enrichment_failures: usize,
    pub total_patents: usize,
    pub downloaded_patents: Vec<String>,
    pub files_created: FilesCreated,
}

impl DownloadSummary {
    pub fn new(output_directory: impl Into<String>, queries: &[SearchQuery]) -> Self {
        let (codes, terms): (Vec<_>, Vec<_>) =
            queries.iter().partition(|q| q.is_classification());

        Self {
            run_id: Uuid::new_v4(),
            download_date: Utc::now(),
            finished_at: None,
            output_directory: output_directory.into(),
            search_terms_used: terms.into_iter().map(|q| q.text.clone()).collect(),
            classification_codes: codes.into_iter().map(|q| q.text.clone()).collect(),
            pairs_attempted: 0,
            pairs_succeeded: 0,
            pairs_failed: 0,
            counts: BTreeMap::new(),
            per_source: BTreeMap::new(),
            failures: Vec::new(),
            duplicates_skipped: 0,
            enrichment_failures: 0,
            total_patents: 0,
            downloaded_patents: Vec::new(),
            files_created: FilesCreated::default(),
        }
    }

    pub fn record_success(&mut self, query: &SearchQuery, source: SourceKind, fetched: usize) {
        self.pairs_attempted += 1;
        self.pairs_succeeded += 1;
        self.counts
            .entry(query.text.clone())
            .or_default()
            .insert(source.key().to_string(), fetched);
        *self.per_source.entry(source.key().to_string()).or_default() += fetched;
    }

    pub fn record_failure(
        &mut self,
        query: &SearchQuery,
        source: SourceKind,
        error: &PipelineError,
    ) {
        self.pairs_attempted += 1;
        self.pairs_failed += 1;
        self.failures.push(FetchFailure {
            query: query.text.clone(),
            source,
            kind: error.fetch_kind(),
            message: error.to_string(),
        });
    }

    pub fn record_written(&mut self, patent_number: &str) {
        self.total_patents += 1;
        self.downloaded_patents.push(patent_number.to_string());
    }

    pub fn record_duplicate(&mut self) {
        self.duplicates_skipped += 1;
    }

    pub fn record_enrichment_failure(&mut self) {
        self.enrichment_failures += 1;
    }

    pub fn finish(&mut self, files_created: FilesCreated) {
        self.files_created = files_created;
        self.finished_at = Some(Utc::now());
    }

    pub fn count_for(&self, query: &str, source: SourceKind) -> Option<usize> {
        self.counts
            .get(query)
            .and_then(|by_source| by_source.get(source.key()))
            .copied()
    }

    pub fn has_failures(&self) -> bool {
        self.pairs_failed > 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.pairs_attempted == 0 {
            return 0.0;
        }
        (self.pairs_succeeded as f64 / self.pairs_attempted as f64) * 100.0
    }
}
