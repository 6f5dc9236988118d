//! Ingestion orchestrator: the pipeline's public entry point.

mod orchestrator;
mod state;

pub use orchestrator::{IngestionPipeline, IngestionPipelineBuilder, UploadOutcome};
pub use state::{FileState, ScanDisposition};
