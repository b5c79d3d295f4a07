// file: src/models/source.rs
// description: identifiers for the public patent data sources

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    GooglePatents,
    UsptoPatft,
    MetadataApi,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::GooglePatents,
        SourceKind::UsptoPatft,
        SourceKind::MetadataApi,
    ];

    /// Stable key used in the summary report and configuration.
    pub fn key(&self) -> &'static str {
        match self {
            SourceKind::GooglePatents => "google_patents",
            SourceKind::UsptoPatft => "uspto_patft",
            SourceKind::MetadataApi => "metadata_api",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SourceKind::GooglePatents => "Google Patents",
            SourceKind::UsptoPatft => "USPTO PatFT",
            SourceKind::MetadataApi => "PatentsView API",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_keys_match_serde() {
        for kind in SourceKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.key()));
        }
    }
}
