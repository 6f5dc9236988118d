//! In-memory storage backend.
//!
//! A database-style backend holding records in process memory with
//! base64 inline payload encoding. Used in tests and demos, and as
//! the reference implementation of the [`StorageBackend`] contract:
//! availability, capacity, and write failures are all configurable so
//! the pipeline's degradation paths can be exercised deterministically.

use crate::core::{
    CandidateFile, FileCategory, FileId, StorageError, StorageMethod, StorageResult,
    StoredFileRecord,
};
use crate::storage::backend::{decode_payload, encode_payload, StorageBackend};

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// An in-memory [`StorageBackend`].
///
/// # Examples
///
/// ```rust
/// use attachguard::storage::MemoryBackend;
///
/// let backend = MemoryBackend::new();
/// backend.set_available(false); // simulate an outage
/// ```
#[derive(Debug)]
pub struct MemoryBackend {
    name: String,
    method: StorageMethod,
    max_payload_size: u64,
    available: AtomicBool,
    fail_writes: AtomicBool,
    records: RwLock<Vec<StoredFileRecord>>,
}

impl MemoryBackend {
    /// Creates a database-style backend with a 10 MB payload ceiling.
    pub fn new() -> Self {
        Self {
            name: "memory-db".to_string(),
            method: StorageMethod::Database,
            max_payload_size: 10 * 1024 * 1024,
            available: AtomicBool::new(true),
            fail_writes: AtomicBool::new(false),
            records: RwLock::new(Vec::new()),
        }
    }

    /// Creates a bucket-style backend with a 50 MB payload ceiling.
    ///
    /// Stands in for an object-store backend in tests that exercise
    /// the selection policy.
    pub fn new_bucket() -> Self {
        Self {
            name: "memory-bucket".to_string(),
            method: StorageMethod::Bucket,
            max_payload_size: 50 * 1024 * 1024,
            ..Self::new()
        }
    }

    /// Sets the backend name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the payload ceiling in bytes.
    pub fn with_max_payload_size(mut self, size: u64) -> Self {
        self.max_payload_size = size;
        self
    }

    /// Marks the backend reachable or unreachable.
    ///
    /// An unreachable backend fails probes and writes, modelling a
    /// platform outage.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Makes every subsequent write fail while probes keep passing.
    ///
    /// Models a backend that degrades mid-session, after diagnosis.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored records.
    pub fn record_count(&self) -> usize {
        self.records.read().unwrap().len()
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::unavailable(&self.name, "backend offline"))
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn method(&self) -> StorageMethod {
        self.method
    }

    fn max_payload_size(&self) -> u64 {
        self.max_payload_size
    }

    async fn probe(&self) -> StorageResult<()> {
        self.check_available()
    }

    async fn persist(
        &self,
        file: &CandidateFile,
        category: FileCategory,
        related_id: &str,
    ) -> StorageResult<StoredFileRecord> {
        self.check_available()?;

        if file.byte_size > self.max_payload_size {
            return Err(StorageError::PayloadTooLarge {
                size: file.byte_size,
                max: self.max_payload_size,
            });
        }

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::write_failed("injected write failure"));
        }

        let record = StoredFileRecord {
            id: FileId::new(),
            name: file.name.clone(),
            original_name: file.name.clone(),
            byte_size: file.byte_size,
            mime_type: file.declared_mime_type.clone().unwrap_or_default(),
            payload: encode_payload(&file.content),
            related_id: related_id.to_string(),
            category,
            created_at: Utc::now(),
        };

        self.records.write().unwrap().push(record.clone());

        tracing::debug!(
            backend = %self.name,
            file_id = %record.id,
            related_id = %related_id,
            category = %category,
            "Stored file record written"
        );

        Ok(record)
    }

    async fn retrieve(&self, id: &FileId) -> StorageResult<Vec<u8>> {
        self.check_available()?;

        let records = self.records.read().unwrap();
        let record = records
            .iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| StorageError::NotFound { id: id.clone() })?;

        decode_payload(&record.payload)
    }

    async fn list(
        &self,
        related_id: &str,
        category: FileCategory,
    ) -> StorageResult<Vec<StoredFileRecord>> {
        self.check_available()?;

        Ok(self
            .records
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.related_id == related_id && r.category == category)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_file(name: &str, content: &[u8]) -> CandidateFile {
        CandidateFile::from_bytes(name, content.to_vec()).with_mime_type("text/plain")
    }

    #[tokio::test]
    async fn test_persist_and_retrieve_round_trip() {
        let backend = MemoryBackend::new();
        let file = text_file("notes.txt", b"important notes");

        let record = backend
            .persist(&file, FileCategory::Ticket, "ticket-1")
            .await
            .unwrap();
        assert_eq!(record.byte_size, 15);
        assert_eq!(record.original_name, "notes.txt");

        let bytes = backend.retrieve(&record.id).await.unwrap();
        assert_eq!(bytes, b"important notes");
    }

    #[tokio::test]
    async fn test_retrieve_missing_is_not_found() {
        let backend = MemoryBackend::new();
        let err = backend.retrieve(&FileId::from("nope")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_unavailable_backend_rejects_everything() {
        let backend = MemoryBackend::new();
        backend.set_available(false);

        assert!(backend.probe().await.is_err());

        let file = text_file("a.txt", b"x");
        let err = backend
            .persist(&file, FileCategory::Message, "msg-1")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let backend = MemoryBackend::new();
        backend.set_fail_writes(true);

        // Probe still passes: the outage is write-only.
        assert!(backend.probe().await.is_ok());

        let file = text_file("a.txt", b"x");
        let err = backend
            .persist(&file, FileCategory::Ticket, "ticket-1")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed { .. }));
        assert_eq!(backend.record_count(), 0);
    }

    #[tokio::test]
    async fn test_payload_ceiling() {
        let backend = MemoryBackend::new().with_max_payload_size(4);
        let file = text_file("big.txt", b"12345");
        let err = backend
            .persist(&file, FileCategory::Ticket, "ticket-1")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::PayloadTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_by_owner() {
        let backend = MemoryBackend::new();
        let file = text_file("a.txt", b"x");

        backend
            .persist(&file, FileCategory::Ticket, "ticket-1")
            .await
            .unwrap();
        backend
            .persist(&file, FileCategory::Ticket, "ticket-2")
            .await
            .unwrap();
        backend
            .persist(&file, FileCategory::Message, "ticket-1")
            .await
            .unwrap();

        let listed = backend.list("ticket-1", FileCategory::Ticket).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].related_id, "ticket-1");
    }
}
