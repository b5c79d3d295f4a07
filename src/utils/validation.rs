// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{PipelineError, Result};
use crate::models::clean_identifier;
use std::fs;
use std::path::Path;

pub struct Validator;

impl Validator {
    /// Creates the directory when missing and rejects paths that exist as files.
    pub fn ensure_directory(path: &Path) -> Result<()> {
        if path.exists() && !path.is_dir() {
            return Err(PipelineError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        fs::create_dir_all(path).map_err(|e| PipelineError::file_operation(path, e))
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PipelineError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_patent_number(patent_number: &str) -> Result<()> {
        if clean_identifier(patent_number).is_empty() {
            return Err(PipelineError::Validation(format!(
                "Patent number has no alphanumeric characters: {:?}",
                patent_number
            )));
        }
        Ok(())
    }

    /// Collapses runs of whitespace the way scraped HTML text needs.
    pub fn normalize_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
