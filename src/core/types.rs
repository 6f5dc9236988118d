//! Core types used throughout the attachguard library.
//!
//! This module defines the data structures flowing through the
//! ingestion pipeline: the candidate file submitted by a caller, the
//! pre-filter verdict, the scanner report, the durable scan record,
//! and the stored file record produced on acceptance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one scan attempt.
///
/// Every scanner invocation mints exactly one `ScanId`, whether the
/// scan came back clean, dirty, or failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanId(pub String);

impl ScanId {
    /// Creates a new random scan ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a stored file record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub String);

impl FileId {
    /// Creates a new random file ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a file ID from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for FileId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What a stored file is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    /// Attached to a support ticket.
    Ticket,
    /// Attached to a chat message.
    Message,
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ticket => write!(f, "ticket"),
            Self::Message => write!(f, "message"),
        }
    }
}

/// How a file was (or was not) persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMethod {
    /// Object-store backend: larger payloads, richer metadata.
    Bucket,
    /// Database-backed store with inline-encoded payloads.
    Database,
    /// The file was not stored.
    Failed,
}

impl fmt::Display for StorageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bucket => write!(f, "bucket"),
            Self::Database => write!(f, "database"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A file submitted for ingestion.
///
/// Candidate files are transient and owned by the caller; nothing is
/// persisted unless the file passes both the safety pre-filter and
/// the threat scanner.
///
/// # Examples
///
/// ```rust
/// use attachguard::core::CandidateFile;
///
/// let file = CandidateFile::from_bytes("report.pdf", b"%PDF-1.7".to_vec())
///     .with_mime_type("application/pdf");
/// assert_eq!(file.byte_size, 8);
/// assert_eq!(file.extension(), Some("pdf".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFile {
    /// Original filename as supplied by the caller.
    pub name: String,

    /// Size of the content in bytes.
    pub byte_size: u64,

    /// MIME type declared by the caller, if any.
    ///
    /// Many browsers omit this; `None` is tolerated by the pre-filter
    /// and deferred to the scanner.
    pub declared_mime_type: Option<String>,

    /// The file bytes.
    pub content: Vec<u8>,
}

impl CandidateFile {
    /// Creates a candidate file from in-memory bytes.
    pub fn from_bytes(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            byte_size: content.len() as u64,
            declared_mime_type: None,
            content,
        }
    }

    /// Sets the declared MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.declared_mime_type = Some(mime_type.into());
        self
    }

    /// Returns the lowercased filename extension, if any.
    ///
    /// Trailing dots are ignored: Windows strips them on save, so
    /// `tool.exe.` has the same effective extension as `tool.exe`.
    pub fn extension(&self) -> Option<String> {
        let name = self.name.trim_end_matches('.');
        let (_, ext) = name.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Decodes the content as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// The verdict of the safety pre-filter.
///
/// Produced once per candidate file and never persisted. Carries the
/// first violated rule's reason; rules are not aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    /// Whether the file passed every pre-filter rule.
    pub safe: bool,

    /// Reason for the first violated rule, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SafetyVerdict {
    /// Creates a passing verdict.
    pub fn safe() -> Self {
        Self {
            safe: true,
            reason: None,
        }
    }

    /// Creates a failing verdict with the given reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            safe: false,
            reason: Some(reason.into()),
        }
    }
}

/// The result of one threat-scanner invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Unique identifier minted for this scan attempt.
    pub scan_id: ScanId,

    /// Whether the scan itself completed without error.
    ///
    /// `false` only on an unexpected read or decoding failure; in
    /// that case `clean` is also `false` (fail closed).
    pub success: bool,

    /// Whether no threats were found.
    pub clean: bool,

    /// Human-readable descriptions of detected threats, in detection
    /// order. Empty when clean.
    pub threats: Vec<String>,

    /// Error message when `success` is `false`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanReport {
    /// Creates a clean report.
    pub fn clean(scan_id: ScanId) -> Self {
        Self {
            scan_id,
            success: true,
            clean: true,
            threats: Vec::new(),
            error: None,
        }
    }

    /// Creates a report for detected threats.
    pub fn infected(scan_id: ScanId, threats: Vec<String>) -> Self {
        Self {
            scan_id,
            success: true,
            clean: false,
            threats,
            error: None,
        }
    }

    /// Creates a failed report. Failed scans are never clean.
    pub fn failed(scan_id: ScanId, error: impl Into<String>) -> Self {
        Self {
            scan_id,
            success: false,
            clean: false,
            threats: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Returns `true` if the scan completed and found nothing.
    pub fn is_clean(&self) -> bool {
        self.success && self.clean
    }

    /// Returns `true` if the scan completed and found threats.
    pub fn is_infected(&self) -> bool {
        self.success && !self.threats.is_empty()
    }

    /// Returns `true` if the scan itself errored.
    pub fn is_failed(&self) -> bool {
        !self.success
    }
}

/// Durable, append-only audit entry for one scan attempt.
///
/// A record is written for every completed scan, clean or not,
/// independent of whether the file is ultimately stored. Records are
/// immutable once written; the pipeline never updates or deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Unique scan identifier.
    pub scan_id: ScanId,

    /// Name of the scanned file.
    pub file_name: String,

    /// Size of the scanned file in bytes.
    pub file_size: u64,

    /// Declared MIME type, empty when the caller omitted it.
    pub mime_type: String,

    /// Whether the scan found nothing.
    pub is_clean: bool,

    /// Detected threats in detection order; empty when clean.
    pub threats: Vec<String>,

    /// BLAKE3 hash of the file content.
    ///
    /// Gives security review a stable identity for the same bytes
    /// across independent re-uploads.
    pub content_hash: String,

    /// Identity of the user who submitted the file.
    pub scanned_by: String,

    /// When the scan completed.
    pub scanned_at: DateTime<Utc>,
}

impl ScanRecord {
    /// Builds a record from a scan report and the scanned file.
    pub fn from_report(
        report: &ScanReport,
        file: &CandidateFile,
        scanned_by: impl Into<String>,
    ) -> Self {
        Self {
            scan_id: report.scan_id.clone(),
            file_name: file.name.clone(),
            file_size: file.byte_size,
            mime_type: file.declared_mime_type.clone().unwrap_or_default(),
            is_clean: report.is_clean(),
            threats: report.threats.clone(),
            content_hash: blake3::hash(&file.content).to_hex().to_string(),
            scanned_by: scanned_by.into(),
            scanned_at: Utc::now(),
        }
    }
}

/// Durable record of an accepted, persisted file.
///
/// Exists if and only if a corresponding [`ScanRecord`] with
/// `is_clean = true` exists. Owned by the ticket or message it is
/// attached to; deletion cascades from the owner, never from the
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFileRecord {
    /// Unique identifier assigned by the backend.
    pub id: FileId,

    /// Storage name of the file (may be sanitized by the backend).
    pub name: String,

    /// Filename as originally submitted.
    pub original_name: String,

    /// Size of the original content in bytes.
    pub byte_size: u64,

    /// Declared MIME type, empty when the caller omitted it.
    pub mime_type: String,

    /// Backend-specific opaque payload encoding.
    pub payload: String,

    /// Ticket or message identifier this file is attached to.
    pub related_id: String,

    /// Whether the owner is a ticket or a message.
    pub category: FileCategory,

    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_id_unique() {
        assert_ne!(ScanId::new(), ScanId::new());
    }

    #[test]
    fn test_candidate_file_extension() {
        let file = CandidateFile::from_bytes("Photo.JPG", vec![1, 2, 3]);
        assert_eq!(file.extension(), Some("jpg".to_string()));

        let file = CandidateFile::from_bytes("README", vec![]);
        assert_eq!(file.extension(), None);

        let file = CandidateFile::from_bytes("archive.tar.gz", vec![]);
        assert_eq!(file.extension(), Some("gz".to_string()));

        let file = CandidateFile::from_bytes("dotfile.", vec![]);
        assert_eq!(file.extension(), None);

        // Windows strips trailing dots on save.
        let file = CandidateFile::from_bytes("tool.exe.", vec![]);
        assert_eq!(file.extension(), Some("exe".to_string()));

        let file = CandidateFile::from_bytes("tool.exe...", vec![]);
        assert_eq!(file.extension(), Some("exe".to_string()));
    }

    #[test]
    fn test_scan_report_states() {
        let clean = ScanReport::clean(ScanId::new());
        assert!(clean.is_clean());
        assert!(!clean.is_infected());
        assert!(!clean.is_failed());

        let infected = ScanReport::infected(ScanId::new(), vec!["Test.Threat".into()]);
        assert!(!infected.is_clean());
        assert!(infected.is_infected());

        let failed = ScanReport::failed(ScanId::new(), "unreadable stream");
        assert!(failed.is_failed());
        assert!(!failed.is_clean());
        assert!(!failed.clean);
    }

    #[test]
    fn test_scan_record_from_report() {
        let file =
            CandidateFile::from_bytes("notes.txt", b"hello".to_vec()).with_mime_type("text/plain");
        let report = ScanReport::clean(ScanId::new());
        let record = ScanRecord::from_report(&report, &file, "user-42");

        assert_eq!(record.file_name, "notes.txt");
        assert_eq!(record.file_size, 5);
        assert_eq!(record.mime_type, "text/plain");
        assert!(record.is_clean);
        assert!(record.threats.is_empty());
        assert_eq!(record.scanned_by, "user-42");
        assert_eq!(
            record.content_hash,
            blake3::hash(b"hello").to_hex().to_string()
        );
    }

    #[test]
    fn test_category_serde_shape() {
        assert_eq!(
            serde_json::to_string(&FileCategory::Ticket).unwrap(),
            "\"ticket\""
        );
        assert_eq!(
            serde_json::to_string(&StorageMethod::Failed).unwrap(),
            "\"failed\""
        );
    }
}
