// file: src/exporter/corpus.rs
// description: append-only line-delimited json corpus of patent records

use crate::error::{PipelineError, Result};
use crate::models::PatentRecord;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CORPUS_FILE: &str = "cannabis_patents_corpus.jsonl";

/// One corpus line: the full record plus a flattened training text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub text: String,
    #[serde(flatten)]
    pub record: PatentRecord,
}

impl From<&PatentRecord> for CorpusEntry {
    fn from(record: &PatentRecord) -> Self {
        Self {
            text: record.corpus_text(),
            record: record.clone(),
        }
    }
}

pub struct CorpusWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CorpusWriter {
    pub fn open(output_dir: &Path) -> Result<Self> {
        let path = output_dir.join(CORPUS_FILE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| PipelineError::file_operation(&path, e))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn append(&mut self, record: &PatentRecord) -> Result<()> {
        let line = serde_json::to_string(&CorpusEntry::from(record))?;
        writeln!(self.writer, "{}", line)
            .map_err(|e| PipelineError::file_operation(&self.path, e))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| PipelineError::file_operation(&self.path, e))
    }
}
