// file: src/exporter/json.rs
// description: per-record json export and read-back

use crate::error::{PipelineError, Result};
use crate::models::PatentRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const RECORD_PREFIX: &str = "cannabis_patent_";

#[derive(Debug, Clone)]
pub struct JsonExporter {
    output_dir: PathBuf,
    pretty: bool,
}

impl JsonExporter {
    pub fn new(output_dir: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            pretty,
        }
    }

    pub fn path_for(&self, record: &PatentRecord) -> PathBuf {
        self.output_dir
            .join(format!("{}{}.json", RECORD_PREFIX, record.file_key()))
    }

    pub fn export(&self, record: &PatentRecord) -> Result<PathBuf> {
        let path = self.path_for(record);
        let json = if self.pretty {
            serde_json::to_string_pretty(record)?
        } else {
            serde_json::to_string(record)?
        };

        fs::write(&path, json).map_err(|e| PipelineError::file_operation(&path, e))?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    pub fn read(path: &Path) -> Result<PatentRecord> {
        let content =
            fs::read_to_string(path).map_err(|e| PipelineError::file_operation(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_export_and_read_back() {
        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path(), true);

        let mut record = PatentRecord::new("US 123", "CBD tincture", SourceKind::MetadataApi)
            .with_abstract("An oral tincture.");
        record.assignees = vec!["Green Labs LLC".to_string()];
        record.classifications = vec!["A61K31/05".to_string()];

        let path = exporter.export(&record).unwrap();
        assert_eq!(path, dir.path().join("cannabis_patent_US123.json"));

        let parsed = JsonExporter::read(&path).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_export_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path().join("missing"), false);
        let record = PatentRecord::new("US1", "x", SourceKind::GooglePatents);

        let err = exporter.export(&record).unwrap_err();
        assert!(matches!(err, PipelineError::FileOperation { .. }));
    }
}
