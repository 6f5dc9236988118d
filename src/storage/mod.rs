//! Storage backends, diagnostics, and backend selection.

mod backend;
mod diagnosis;
mod memory;

pub use backend::{decode_payload, encode_payload, ArcBackend, StorageBackend};
pub use diagnosis::{diagnose, PipelineSession, StorageDiagnosis};
pub use memory::MemoryBackend;
