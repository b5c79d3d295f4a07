// file: src/exporter/text.rs
// description: human-readable plain text rendering of a patent record

use crate::error::{PipelineError, Result};
use crate::exporter::json::RECORD_PREFIX;
use crate::models::PatentRecord;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

const RULE_WIDTH: usize = 80;

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() { "N/A" } else { value }
}

pub fn render(record: &PatentRecord) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    // writing to a String cannot fail
    let _ = writeln!(out, "PATENT NUMBER: {}", record.patent_number);
    let _ = writeln!(out, "TITLE: {}", or_na(&record.title));
    let _ = writeln!(out, "SOURCE: {}", record.source.display_name());
    if let Some(date) = record.filing_date.as_deref() {
        let _ = writeln!(out, "FILING DATE: {}", date);
    }
    if let Some(date) = record.publication_date.as_deref() {
        let _ = writeln!(out, "PUBLICATION DATE: {}", date);
    }
    if !record.classifications.is_empty() {
        let _ = writeln!(out, "CLASSIFICATIONS: {}", record.classifications.join(", "));
    }
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "ABSTRACT:\n{}\n", or_na(&record.abstract_text));

    for (heading, names) in [("INVENTORS", &record.inventors), ("ASSIGNEES", &record.assignees)] {
        if names.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{}:", heading);
        for name in names {
            let _ = writeln!(out, "- {}", name);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "DESCRIPTION:\n{}\n", or_na(&record.description));

    if !record.claims.is_empty() {
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "CLAIMS:");
        for (i, claim) in record.claims.iter().enumerate() {
            let _ = writeln!(out, "Claim {}: {}\n", i + 1, claim);
        }
    }

    out
}

#[derive(Debug, Clone)]
pub struct TextExporter {
    output_dir: PathBuf,
}

impl TextExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path_for(&self, record: &PatentRecord) -> PathBuf {
        self.output_dir
            .join(format!("{}{}.txt", RECORD_PREFIX, record.file_key()))
    }

    pub fn export(&self, record: &PatentRecord) -> Result<PathBuf> {
        let path = self.path_for(record);
        fs::write(&path, render(record)).map_err(|e| PipelineError::file_operation(&path, e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;

    #[test]
    fn test_render_full_record() {
        let mut record =
            PatentRecord::new("US10123456B2", "Cannabis extraction", SourceKind::GooglePatents)
                .with_abstract("CO2 extraction.");
        record.inventors = vec!["Jane Roe".to_string()];
        record.claims = vec!["A method.".to_string(), "The method of claim 1.".to_string()];
        record.filing_date = Some("2017-03-01".to_string());

        let text = render(&record);

        let header = "PATENT NUMBER: US10123456B2\nTITLE: Cannabis extraction\nSOURCE: Google Patents\n";
        assert!(text.starts_with(header));
        assert!(text.contains("FILING DATE: 2017-03-01"));
        assert!(text.contains("ABSTRACT:\nCO2 extraction.\n"));
        assert!(text.contains("INVENTORS:\n- Jane Roe\n"));
        assert!(!text.contains("ASSIGNEES:"));
        assert!(text.contains("DESCRIPTION:\nN/A\n"));
        assert!(text.contains("Claim 2: The method of claim 1."));
        assert!(text.contains(&"=".repeat(80)));
    }

    #[test]
    fn test_render_minimal_record() {
        let record = PatentRecord::new("9876543", "", SourceKind::UsptoPatft);
        let text = render(&record);

        assert!(text.contains("TITLE: N/A"));
        assert!(text.contains("SOURCE: USPTO PatFT"));
        assert!(!text.contains("CLAIMS:"));
    }

    #[test]
    fn test_export_writes_txt_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = TextExporter::new(dir.path());
        let record = PatentRecord::new("US456", "CBD vaporizer", SourceKind::MetadataApi);

        let path = exporter.export(&record).unwrap();
        assert_eq!(path.file_name().unwrap(), "cannabis_patent_US456.txt");
        assert!(std::fs::read_to_string(path).unwrap().contains("CBD vaporizer"));
    }
}
