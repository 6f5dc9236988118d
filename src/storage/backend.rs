//! Storage backend trait and payload encoding.
//!
//! A backend is a destination capable of persisting a
//! [`StoredFileRecord`]. Backends are probed for availability before
//! a session starts and are only handed files that passed both the
//! safety pre-filter and the threat scanner.

use crate::core::{CandidateFile, FileCategory, FileId, StorageMethod, StorageResult, StoredFileRecord};
use crate::core::StorageError;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fmt::Debug;
use std::sync::Arc;

/// A storage destination for accepted files.
///
/// Implementations must be `Send + Sync` and should never panic;
/// failures are returned as [`StorageError`].
#[async_trait]
pub trait StorageBackend: Send + Sync + Debug {
    /// Returns a stable, human-readable backend name.
    fn name(&self) -> &str;

    /// Returns the storage method this backend reports on success.
    fn method(&self) -> StorageMethod;

    /// Returns the largest payload this backend accepts, in bytes.
    ///
    /// The pre-filter's size ceiling is derived from the active
    /// backend's value.
    fn max_payload_size(&self) -> u64;

    /// Checks whether the backend is currently reachable.
    ///
    /// Probes must be lightweight and must not require file data.
    async fn probe(&self) -> StorageResult<()>;

    /// Persists an accepted file and returns its durable record.
    ///
    /// Must only be called for files with a clean safety verdict and
    /// a clean scan report; the orchestrator enforces this ordering.
    async fn persist(
        &self,
        file: &CandidateFile,
        category: FileCategory,
        related_id: &str,
    ) -> StorageResult<StoredFileRecord>;

    /// Retrieves the original bytes of a stored file.
    ///
    /// A missing record is a distinct [`StorageError::NotFound`], not
    /// a generic failure.
    async fn retrieve(&self, id: &FileId) -> StorageResult<Vec<u8>>;

    /// Lists stored records attached to the given ticket or message.
    async fn list(
        &self,
        related_id: &str,
        category: FileCategory,
    ) -> StorageResult<Vec<StoredFileRecord>>;
}

/// An arc-wrapped backend for shared ownership.
pub type ArcBackend = Arc<dyn StorageBackend>;

/// Encodes file bytes into the inline payload representation used by
/// database-backed storage.
pub fn encode_payload(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Reverses [`encode_payload`], handing the original bytes back.
pub fn decode_payload(payload: &str) -> StorageResult<Vec<u8>> {
    BASE64.decode(payload).map_err(|e| StorageError::Decode {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_round_trip() {
        let original: Vec<u8> = (0u8..=255).collect();
        let encoded = encode_payload(&original);
        let decoded = decode_payload(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_payload("not base64 at all!!!").unwrap_err();
        assert!(matches!(err, StorageError::Decode { .. }));
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(decode_payload(&encode_payload(&[])).unwrap(), Vec::<u8>::new());
    }
}
