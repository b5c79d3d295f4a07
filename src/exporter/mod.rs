// file: src/exporter/mod.rs
// description: output artifact writers and the corpus exporter that drives them
// reference: internal module structure

pub mod corpus;
pub mod csv_index;
pub mod json;
pub mod summary;
pub mod text;

pub use corpus::{CORPUS_FILE, CorpusEntry, CorpusWriter};
pub use csv_index::{CsvIndex, INDEX_FILE};
pub use json::JsonExporter;
pub use summary::{SUMMARY_FILE, count_files, write_summary};
pub use text::TextExporter;

use crate::config::OutputConfig;
use crate::error::Result;
use crate::models::{DownloadSummary, PatentRecord};
use crate::utils::Validator;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    Written,
    Duplicate,
}

/// Writes every artifact for a record exactly once. The first record seen
/// for an identifier wins; identifiers already in an earlier run's index
/// count as seen. Callers pass records whose identifier has passed
/// `Validator::validate_patent_number`.
pub struct CorpusExporter {
    output_dir: PathBuf,
    json: JsonExporter,
    text: TextExporter,
    corpus: CorpusWriter,
    index: CsvIndex,
    seen: HashSet<String>,
}

impl CorpusExporter {
    pub fn new(config: &OutputConfig) -> Result<Self> {
        let output_dir = config.directory.clone();
        Validator::ensure_directory(&output_dir)?;

        let seen = CsvIndex::existing_keys(&output_dir)?;
        if !seen.is_empty() {
            info!(
                "Found {} patents from earlier runs in {}",
                seen.len(),
                output_dir.display()
            );
        }

        Ok(Self {
            json: JsonExporter::new(&output_dir, config.pretty_json),
            text: TextExporter::new(&output_dir),
            corpus: CorpusWriter::open(&output_dir)?,
            index: CsvIndex::open(&output_dir)?,
            output_dir,
            seen,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn is_known(&self, record: &PatentRecord) -> bool {
        self.seen.contains(&record.file_key())
    }

    pub fn export(&mut self, record: &PatentRecord) -> Result<ExportOutcome> {
        if !self.seen.insert(record.file_key()) {
            return Ok(ExportOutcome::Duplicate);
        }

        self.json.export(record)?;
        self.text.export(record)?;
        self.corpus.append(record)?;
        self.index.append(record)?;

        info!("Saved patent {} to corpus", record.patent_number);
        Ok(ExportOutcome::Written)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.corpus.flush()?;
        self.index.flush()
    }

    /// Flushes the append-only files and writes the summary report.
    pub fn finish(&mut self, summary: &mut DownloadSummary) -> Result<PathBuf> {
        self.flush()?;
        summary.finish(count_files(&self.output_dir));
        write_summary(&self.output_dir, summary)
    }
}
