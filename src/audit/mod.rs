//! Append-only audit trail for scan attempts.
//!
//! One [`ScanRecord`] is written per completed scan, clean or not,
//! whether or not the file is ultimately stored. The sink is
//! best-effort from the pipeline's point of view: a failed audit
//! write is logged to the operator but never changes a file's
//! accept/reject outcome.

mod events;

pub use events::{emit_file_rejected, emit_file_stored, emit_scan_recorded};

use crate::core::{AuditError, AuditResult, ScanRecord};

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// A durable sink for scan records.
///
/// `record_scan` is append-only: one row per scan attempt, never
/// updated in place. A re-uploaded file is a new, independent scan
/// with its own record. Implementations on platforms with real
/// concurrency must serialize writes per session to preserve the
/// log's submission order.
#[async_trait]
pub trait AuditSink: Send + Sync + Debug {
    /// Appends one scan record.
    async fn record_scan(&self, record: &ScanRecord) -> AuditResult<()>;

    /// Returns all records in append order, for security review.
    async fn records(&self) -> AuditResult<Vec<ScanRecord>>;
}

/// An in-memory, append-only audit log.
///
/// The shipped reference sink; production deployments implement
/// [`AuditSink`] over their platform's durable table. Write failures
/// can be injected to exercise the pipeline's best-effort handling.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: RwLock<Vec<ScanRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryAuditLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of appended records.
    pub fn record_count(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditLog {
    async fn record_scan(&self, record: &ScanRecord) -> AuditResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AuditError::WriteFailed {
                reason: "injected audit failure".to_string(),
            });
        }
        self.entries.write().unwrap().push(record.clone());
        Ok(())
    }

    async fn records(&self) -> AuditResult<Vec<ScanRecord>> {
        Ok(self.entries.read().unwrap().clone())
    }
}
