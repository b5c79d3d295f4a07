// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod exporter;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod utils;

pub use config::{Config, OutputConfig, PipelineConfig, QueryConfig, SourceConfig, SourcesConfig};
pub use error::{FetchErrorKind, PipelineError, Result};
pub use exporter::{CorpusExporter, ExportOutcome};
pub use models::{DownloadSummary, PatentRecord, QueryKind, SearchQuery, SourceKind};
pub use pipeline::{Pipeline, PipelineStats, ProgressTracker};
pub use sources::{DetailFetcher, PatentSource, SourcePage, fetch_for_query};
pub use utils::Validator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        assert_eq!(config.queries.to_queries().len(), 70);
        assert_eq!(SourceKind::ALL.len(), 3);
    }
}
