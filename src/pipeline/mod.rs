// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
mod progress;

pub use orchestrator::Pipeline;
pub use progress::{PipelineStats, ProgressTracker};
