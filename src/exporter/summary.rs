// file: src/exporter/summary.rs
// description: end-of-run summary report and output file census
// reference: https://docs.rs/walkdir

use crate::error::{PipelineError, Result};
use crate::exporter::corpus::CORPUS_FILE;
use crate::exporter::csv_index::INDEX_FILE;
use crate::exporter::json::RECORD_PREFIX;
use crate::models::{DownloadSummary, FilesCreated};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SUMMARY_FILE: &str = "download_summary.json";

pub fn count_files(output_dir: &Path) -> FilesCreated {
    let mut files = FilesCreated {
        corpus_file: CORPUS_FILE.to_string(),
        index_file: INDEX_FILE.to_string(),
        ..FilesCreated::default()
    };

    for entry in WalkDir::new(output_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let name = entry.file_name().to_string_lossy();
        if !name.starts_with(RECORD_PREFIX) {
            continue;
        }
        if name.ends_with(".json") {
            files.json_files += 1;
        } else if name.ends_with(".txt") {
            files.text_files += 1;
        }
    }

    files
}

pub fn write_summary(output_dir: &Path, summary: &DownloadSummary) -> Result<PathBuf> {
    let path = output_dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(&path, json).map_err(|e| PipelineError::file_operation(&path, e))?;
    Ok(path)
}
