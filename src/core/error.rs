//! Error types for the attachguard library.
//!
//! This module provides structured, typed errors for all failure
//! scenarios. The library never panics; all errors are returned as
//! `Result` values. The six pipeline errors are terminal and
//! non-retriable; a caller may re-submit a file, which restarts the
//! full state machine from the beginning.

use crate::core::types::{FileId, ScanId};
use thiserror::Error;

/// The main error type for ingestion pipeline operations.
///
/// Every variant is a terminal per-file outcome. `ScanFailed` and
/// `ThreatDetected` are handled identically by the orchestrator
/// (fail closed) but surface different messages, and only
/// `ThreatDetected` triggers a security notification.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// The safety pre-filter rejected the file before any scanning.
    #[error("file rejected by safety pre-filter: {reason}")]
    SafetyRejected {
        /// The first violated pre-filter rule.
        reason: String,
    },

    /// No storage backend is reachable for this session.
    ///
    /// Checked before scanning, so a guaranteed-unstorable file never
    /// pays the scan cost.
    #[error("no storage backend available")]
    NoBackendAvailable,

    /// The scanner hit an unexpected read or decoding error.
    #[error("scan {scan_id} failed: {message}")]
    ScanFailed {
        /// Identifier of the failed scan attempt.
        scan_id: ScanId,
        /// Description of the failure.
        message: String,
    },

    /// The scanner found one or more threats.
    #[error("threat detected by scan {scan_id}: {}", threats.join(", "))]
    ThreatDetected {
        /// Identifier of the scan attempt.
        scan_id: ScanId,
        /// Detected threats in detection order.
        threats: Vec<String>,
    },

    /// The file passed screening but the backend write failed.
    #[error("persistence to backend '{backend}' failed: {message}")]
    PersistenceFailed {
        /// Name of the backend that failed.
        backend: String,
        /// Description of the failure.
        message: String,
    },

    /// No stored file record exists for the requested ID.
    #[error("stored file not found: {id}")]
    NotFound {
        /// The file ID that was not found.
        id: FileId,
    },
}

impl PipelineError {
    /// Returns `true` if this error carries a positive threat match.
    pub fn is_threat(&self) -> bool {
        matches!(self, Self::ThreatDetected { .. })
    }

    /// Returns `true` if the file was turned away before scanning.
    pub fn rejected_before_scan(&self) -> bool {
        matches!(self, Self::SafetyRejected { .. } | Self::NoBackendAvailable)
    }

    /// Returns the scan ID associated with this error, if any.
    pub fn scan_id(&self) -> Option<&ScanId> {
        match self {
            Self::ScanFailed { scan_id, .. } | Self::ThreatDetected { scan_id, .. } => {
                Some(scan_id)
            }
            _ => None,
        }
    }

    /// Creates a `SafetyRejected` error.
    pub fn safety_rejected(reason: impl Into<String>) -> Self {
        Self::SafetyRejected {
            reason: reason.into(),
        }
    }

    /// Creates a `PersistenceFailed` error.
    pub fn persistence_failed(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PersistenceFailed {
            backend: backend.into(),
            message: message.into(),
        }
    }
}

/// Error type for storage backend operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend is not reachable.
    #[error("backend '{backend}' is unavailable: {reason}")]
    Unavailable {
        /// Name of the backend.
        backend: String,
        /// Human-readable reason for unavailability.
        reason: String,
    },

    /// The payload exceeds what this backend can hold.
    #[error("payload of {size} bytes exceeds backend maximum of {max} bytes")]
    PayloadTooLarge {
        /// Actual payload size in bytes.
        size: u64,
        /// Maximum the backend accepts.
        max: u64,
    },

    /// The backend write failed.
    #[error("backend write failed: {reason}")]
    WriteFailed {
        /// Description of the failure.
        reason: String,
    },

    /// No record exists for the requested ID.
    #[error("record not found: {id}")]
    NotFound {
        /// The file ID that was not found.
        id: FileId,
    },

    /// The stored payload could not be decoded back into bytes.
    #[error("payload decoding failed: {reason}")]
    Decode {
        /// Description of the decoding failure.
        reason: String,
    },
}

impl StorageError {
    /// Creates an `Unavailable` error.
    pub fn unavailable(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `WriteFailed` error.
    pub fn write_failed(reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            reason: reason.into(),
        }
    }
}

/// Error type for the append-only audit sink.
///
/// Audit writes are best-effort: a failure is logged to the operator
/// but never changes a file's accept/reject outcome.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The sink could not append the record.
    #[error("audit write failed: {reason}")]
    WriteFailed {
        /// Description of the failure.
        reason: String,
    },
}

/// Error type for notification dispatch.
///
/// Dispatch is best-effort: rejection is authoritative whether or not
/// the alert goes out.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The configured channel refused or dropped the alert.
    #[error("notification dispatch via '{channel}' failed: {reason}")]
    DispatchFailed {
        /// Name of the channel (email, webhook, ...).
        channel: String,
        /// Description of the failure.
        reason: String,
    },
}

/// A specialized `Result` type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// A specialized `Result` type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A specialized `Result` type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

/// A specialized `Result` type for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;
