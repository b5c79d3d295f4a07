// file: src/exporter/csv_index.rs
// description: append-only csv index of exported patents
// reference: https://docs.rs/csv

use crate::error::{PipelineError, Result};
use crate::models::{PatentRecord, clean_identifier};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "cannabis_patents_index.csv";

const HEADERS: [&str; 5] = [
    "Patent Number",
    "Title",
    "Source",
    "Filing Date",
    "Download Date",
];

pub struct CsvIndex {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvIndex {
    /// Opens the index for appending, writing headers when the file is new.
    pub fn open(output_dir: &Path) -> Result<Self> {
        let path = output_dir.join(INDEX_FILE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| PipelineError::file_operation(&path, e))?;
        let is_new = file
            .metadata()
            .map_err(|e| PipelineError::file_operation(&path, e))?
            .len()
            == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer.write_record(HEADERS)?;
        }

        Ok(Self {
            path,
            writer,
        })
    }

    /// File keys of every patent already listed in an existing index.
    pub fn existing_keys(output_dir: &Path) -> Result<HashSet<String>> {
        let path = output_dir.join(INDEX_FILE);
        if !path.exists() {
            return Ok(HashSet::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)?;

        let mut keys = HashSet::new();
        for row in reader.records() {
            let row = row?;
            if let Some(number) = row.get(0) {
                let key = clean_identifier(number);
                if !key.is_empty() {
                    keys.insert(key);
                }
            }
        }
        Ok(keys)
    }

    pub fn append(&mut self, record: &PatentRecord) -> Result<()> {
        let download_date = record.download_timestamp.to_rfc3339();
        self.writer.write_record([
            record.patent_number.as_str(),
            record.title.as_str(),
            record.source.display_name(),
            record.index_date().unwrap_or(""),
            download_date.as_str(),
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| PipelineError::file_operation(&self.path, e))
    }
}
