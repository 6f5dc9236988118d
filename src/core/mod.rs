//! Core types, traits, and error handling.

pub mod error;
pub mod types;

pub use error::{
    AuditError, AuditResult, NotifyError, NotifyResult, PipelineError, PipelineResult,
    StorageError, StorageResult,
};
pub use types::{
    CandidateFile, FileCategory, FileId, SafetyVerdict, ScanId, ScanRecord, ScanReport,
    StorageMethod, StoredFileRecord,
};
