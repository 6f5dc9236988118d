//! # Attachguard
//!
//! File ingestion and threat screening for support-ticket and chat
//! attachments: a pre-flight safety filter, a heuristic malware
//! scanner, a storage-backend selector with graceful degradation, and
//! an audit/notification trail.
//!
//! ## Overview
//!
//! Whenever a user attaches a file to a ticket or a message, the
//! pipeline:
//!
//! - Rejects unsafe sizes, extensions, and declared types before any
//!   scanning cost is paid
//! - Scans content against a known test-virus signature, a set of
//!   suspicious-content heuristics, and a pluggable deep-scan engine
//! - Probes the available storage backends once per session and
//!   degrades gracefully when one is down
//! - Writes one append-only scan record per scan attempt and alerts a
//!   configured channel on every positive detection
//!
//! Ambiguous or failed verdicts are treated as unsafe: the pipeline
//! fails closed. The screening runs client-side and is advisory; it
//! is not a security boundary.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use attachguard::core::{CandidateFile, FileCategory};
//! use attachguard::pipeline::IngestionPipeline;
//! use attachguard::storage::MemoryBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pipeline = IngestionPipeline::builder()
//!         .with_fallback_backend(MemoryBackend::new())
//!         .build();
//!
//!     // One session per attachment surface; backends are probed once.
//!     let session = pipeline.open_session("agent-7").await;
//!
//!     let file = CandidateFile::from_bytes("notes.txt", b"hello".to_vec())
//!         .with_mime_type("text/plain");
//!     let outcome = pipeline
//!         .upload_file(&session, file, "ticket-1", FileCategory::Ticket)
//!         .await;
//!
//!     if outcome.success() {
//!         println!("stored as {}", outcome.record().unwrap().id);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several layers:
//!
//! - **Core**: fundamental types and the terminal error taxonomy
//! - **Prefilter**: synchronous size/extension/MIME rejection
//! - **Scanner**: staged content scanning with a deep-scan seam
//! - **Storage**: backend trait, diagnostics, selection, persistence
//! - **Audit**: append-only scan records and structured audit events
//! - **Notify**: structured security alerts on positive detections
//! - **Pipeline**: the orchestrator sequencing it all per file

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod audit;
pub mod core;
pub mod notify;
pub mod pipeline;
pub mod prefilter;
pub mod scanner;
pub mod storage;

// Re-export commonly used types at the crate root
pub use crate::core::{
    CandidateFile, FileCategory, FileId, PipelineError, SafetyVerdict, ScanId, ScanRecord,
    ScanReport, StorageMethod, StoredFileRecord,
};
pub use crate::pipeline::{IngestionPipeline, UploadOutcome};
pub use crate::scanner::{DeepScanner, SimulatedDeepScanner, ThreatScanner};
pub use crate::storage::{MemoryBackend, PipelineSession, StorageBackend, StorageDiagnosis};

/// Prelude module for convenient imports.
///
/// ```rust
/// use attachguard::prelude::*;
/// ```
pub mod prelude {
    pub use crate::audit::{AuditSink, MemoryAuditLog};
    pub use crate::core::{
        CandidateFile, FileCategory, FileId, PipelineError, SafetyVerdict, ScanId, ScanRecord,
        ScanReport, StorageMethod, StoredFileRecord,
    };
    pub use crate::notify::{LoggingNotifier, MemoryNotifier, Notifier, ThreatAlert};
    pub use crate::pipeline::{IngestionPipeline, UploadOutcome};
    pub use crate::prefilter::SafetyFilter;
    pub use crate::scanner::{DeepScanner, SimulatedDeepScanner, ThreatScanner};
    pub use crate::storage::{MemoryBackend, PipelineSession, StorageBackend, StorageDiagnosis};
}
