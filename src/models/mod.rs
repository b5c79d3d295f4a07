// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod patent;
pub mod query;
pub mod source;
pub mod summary;

pub use patent::{PatentDetails, PatentRecord, clean_identifier};
pub use query::{QueryKind, SearchQuery};
pub use source::SourceKind;
pub use summary::{DownloadSummary, FetchFailure, FilesCreated};
