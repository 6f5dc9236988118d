//! Structured audit event emission.
//!
//! Every pipeline decision is also emitted as a structured `tracing`
//! event under the `attachguard::audit` target, so any subscriber
//! (JSON file, OpenTelemetry, ...) can capture a tamper-resistant
//! trail alongside the durable scan records.

use crate::core::{PipelineError, ScanRecord, StoredFileRecord};

/// Emits an audit event for a written scan record.
pub fn emit_scan_recorded(record: &ScanRecord) {
    tracing::info!(
        target: "attachguard::audit",
        event_type = "scan_recorded",
        scan_id = %record.scan_id,
        file_name = %record.file_name,
        file_size = record.file_size,
        mime_type = %record.mime_type,
        is_clean = record.is_clean,
        threats = ?record.threats,
        threat_count = record.threats.len(),
        content_hash = %record.content_hash,
        scanned_by = %record.scanned_by,
        "Scan recorded"
    );
}

/// Emits an audit event for an accepted, persisted file.
pub fn emit_file_stored(record: &StoredFileRecord, scan_id: &crate::core::ScanId) {
    tracing::info!(
        target: "attachguard::audit",
        event_type = "file_stored",
        file_id = %record.id,
        scan_id = %scan_id,
        file_name = %record.original_name,
        byte_size = record.byte_size,
        related_id = %record.related_id,
        category = %record.category,
        "File stored"
    );
}

/// Emits an audit event for a rejected file.
pub fn emit_file_rejected(file_name: &str, error: &PipelineError) {
    tracing::info!(
        target: "attachguard::audit",
        event_type = "file_rejected",
        file_name = %file_name,
        scan_id = ?error.scan_id().map(|id| id.as_str()),
        threat = error.is_threat(),
        reason = %error,
        "File rejected"
    );
}
