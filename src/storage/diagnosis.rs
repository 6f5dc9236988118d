//! Storage diagnostics, backend selection, and the pipeline session.
//!
//! The diagnosis probes each known backend independently and picks
//! one according to a fixed degradation policy. It is recomputed once
//! per session (for example, when a ticket or chat view mounts), not
//! per file; callers that need a fresh check refresh the session
//! explicitly.

use crate::core::StorageMethod;
use crate::storage::backend::ArcBackend;

use serde::{Deserialize, Serialize};

/// The result of probing the known storage backends.
///
/// Transient: recomputed per session, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageDiagnosis {
    /// Whether the primary (larger payloads, richer metadata)
    /// backend answered its probe.
    pub primary_available: bool,

    /// Whether the fallback backend answered its probe.
    pub fallback_available: bool,

    /// Human-readable summary of the selection outcome.
    pub recommendation: String,
}

impl StorageDiagnosis {
    /// Returns `true` if at least one backend is reachable.
    pub fn any_available(&self) -> bool {
        self.primary_available || self.fallback_available
    }
}

/// Probes both backend slots and builds a diagnosis.
///
/// Probes are isolated: a failure (or absence) of one backend never
/// prevents the other probe from running.
pub async fn diagnose(
    primary: Option<&ArcBackend>,
    fallback: Option<&ArcBackend>,
) -> StorageDiagnosis {
    let primary_available = probe_slot(primary, "primary").await;
    let fallback_available = probe_slot(fallback, "fallback").await;

    let recommendation = match (primary_available, fallback_available) {
        (true, _) => {
            let name = primary.map(|b| b.name()).unwrap_or("primary");
            format!("primary backend '{}' selected", name)
        }
        (false, true) => {
            let name = fallback.map(|b| b.name()).unwrap_or("fallback");
            format!(
                "primary backend unreachable; degraded to fallback '{}'",
                name
            )
        }
        (false, false) => "no storage backend reachable; uploads will be rejected".to_string(),
    };

    tracing::info!(
        primary_available,
        fallback_available,
        recommendation = %recommendation,
        "Storage diagnosis completed"
    );

    StorageDiagnosis {
        primary_available,
        fallback_available,
        recommendation,
    }
}

async fn probe_slot(backend: Option<&ArcBackend>, slot: &str) -> bool {
    let Some(backend) = backend else {
        return false;
    };
    match backend.probe().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(
                slot,
                backend = backend.name(),
                error = %err,
                "Backend probe failed"
            );
            false
        }
    }
}

/// Session-scoped pipeline context.
///
/// Carries the acting-user identity and the cached diagnosis with the
/// selected backend. Each UI surface opens its own session, so two
/// open ticket threads never share a stale diagnosis; the diagnosis
/// is read-only for the life of the session unless explicitly
/// refreshed.
#[derive(Debug, Clone)]
pub struct PipelineSession {
    user_id: String,
    diagnosis: StorageDiagnosis,
    backend: Option<ArcBackend>,
}

impl PipelineSession {
    /// Probes the backend slots and establishes a session for the
    /// given user.
    ///
    /// Selection policy, in priority order: the primary backend when
    /// reachable, otherwise the fallback, otherwise no backend (in
    /// which case every upload fails immediately without scanning).
    pub async fn establish(
        user_id: impl Into<String>,
        primary: Option<ArcBackend>,
        fallback: Option<ArcBackend>,
    ) -> Self {
        let diagnosis = diagnose(primary.as_ref(), fallback.as_ref()).await;

        let backend = if diagnosis.primary_available {
            primary
        } else if diagnosis.fallback_available {
            fallback
        } else {
            None
        };

        Self {
            user_id: user_id.into(),
            diagnosis,
            backend,
        }
    }

    /// Re-probes the backend slots and replaces the cached diagnosis.
    pub async fn refresh(&mut self, primary: Option<ArcBackend>, fallback: Option<ArcBackend>) {
        let fresh = Self::establish(self.user_id.clone(), primary, fallback).await;
        self.diagnosis = fresh.diagnosis;
        self.backend = fresh.backend;
    }

    /// Returns the acting-user identity recorded on every scan record.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the cached diagnosis.
    pub fn diagnosis(&self) -> &StorageDiagnosis {
        &self.diagnosis
    }

    /// Returns the selected backend, if any.
    pub fn backend(&self) -> Option<&ArcBackend> {
        self.backend.as_ref()
    }

    /// Returns the storage method uploads through this session will
    /// report.
    pub fn method(&self) -> StorageMethod {
        self.backend
            .as_ref()
            .map(|b| b.method())
            .unwrap_or(StorageMethod::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryBackend;
    use std::sync::Arc;

    fn arc(backend: MemoryBackend) -> ArcBackend {
        Arc::new(backend)
    }

    #[tokio::test]
    async fn test_prefers_primary() {
        let primary = arc(MemoryBackend::new_bucket());
        let fallback = arc(MemoryBackend::new());

        let session =
            PipelineSession::establish("user-1", Some(primary), Some(fallback)).await;
        assert!(session.diagnosis().primary_available);
        assert!(session.diagnosis().fallback_available);
        assert_eq!(session.method(), StorageMethod::Bucket);
    }

    #[tokio::test]
    async fn test_degrades_to_fallback() {
        let bucket = MemoryBackend::new_bucket();
        bucket.set_available(false);
        let fallback = arc(MemoryBackend::new());

        let session =
            PipelineSession::establish("user-1", Some(arc(bucket)), Some(fallback)).await;
        assert!(!session.diagnosis().primary_available);
        assert!(session.diagnosis().fallback_available);
        assert_eq!(session.method(), StorageMethod::Database);
        assert!(session.diagnosis().recommendation.contains("degraded"));
    }

    #[tokio::test]
    async fn test_no_backend_available() {
        let session = PipelineSession::establish("user-1", None, None).await;
        assert!(!session.diagnosis().any_available());
        assert!(session.backend().is_none());
        assert_eq!(session.method(), StorageMethod::Failed);
    }

    #[tokio::test]
    async fn test_failed_primary_probe_does_not_skip_fallback() {
        let bucket = MemoryBackend::new_bucket();
        bucket.set_available(false);
        let fallback = arc(MemoryBackend::new());

        // The fallback probe must run even though the primary errored.
        let diagnosis = diagnose(Some(&arc(bucket)), Some(&fallback)).await;
        assert!(!diagnosis.primary_available);
        assert!(diagnosis.fallback_available);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_recovery() {
        let db = Arc::new(MemoryBackend::new());
        db.set_available(false);
        let backend: ArcBackend = db.clone();

        let mut session =
            PipelineSession::establish("user-1", None, Some(backend.clone())).await;
        assert!(!session.diagnosis().any_available());

        db.set_available(true);
        session.refresh(None, Some(backend)).await;
        assert!(session.diagnosis().fallback_available);
        assert_eq!(session.method(), StorageMethod::Database);
    }
}
