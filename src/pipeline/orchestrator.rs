//! The ingestion pipeline orchestrator.

use crate::audit::{emit_file_rejected, emit_file_stored, emit_scan_recorded, AuditSink, MemoryAuditLog};
use crate::core::{
    CandidateFile, FileCategory, FileId, PipelineError, PipelineResult, SafetyVerdict, ScanId,
    ScanRecord, StorageError, StorageMethod, StoredFileRecord,
};
use crate::notify::{LoggingNotifier, Notifier, ThreatAlert};
use crate::pipeline::state::{FileState, ScanDisposition};
use crate::prefilter::SafetyFilter;
use crate::scanner::{DeepScanner, SimulatedDeepScanner, ThreatScanner};
use crate::storage::{diagnose, ArcBackend, PipelineSession, StorageDiagnosis};

use std::sync::Arc;

/// Size ceiling applied when no backend is selected, so the
/// pre-filter can still give instant feedback.
const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Per-file outcome of an upload attempt.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Name of the submitted file.
    pub file_name: String,

    /// How the file was (or was not) stored.
    pub method: StorageMethod,

    /// Identifier of the scan attempt, when a scan ran.
    ///
    /// `None` when the file was turned away before scanning (safety
    /// pre-filter or no backend); those rejections produce no scan
    /// record.
    pub scan_id: Option<ScanId>,

    /// The stored record on acceptance, or the terminal error.
    pub result: PipelineResult<StoredFileRecord>,
}

impl UploadOutcome {
    /// Returns `true` if the file was accepted and stored.
    pub fn success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the stored record on acceptance.
    pub fn record(&self) -> Option<&StoredFileRecord> {
        self.result.as_ref().ok()
    }

    /// Returns the terminal error on rejection.
    pub fn error(&self) -> Option<&PipelineError> {
        self.result.as_ref().err()
    }

    fn rejected(file_name: impl Into<String>, scan_id: Option<ScanId>, error: PipelineError) -> Self {
        Self {
            file_name: file_name.into(),
            method: StorageMethod::Failed,
            scan_id,
            result: Err(error),
        }
    }
}

/// Builder for creating an [`IngestionPipeline`].
pub struct IngestionPipelineBuilder {
    primary: Option<ArcBackend>,
    fallback: Option<ArcBackend>,
    deep: Option<Arc<dyn DeepScanner>>,
    audit: Option<Arc<dyn AuditSink>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl IngestionPipelineBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            primary: None,
            fallback: None,
            deep: None,
            audit: None,
            notifier: None,
        }
    }

    /// Sets the primary storage backend (larger payloads, richer
    /// metadata; preferred by selection).
    pub fn with_primary_backend<B: crate::storage::StorageBackend + 'static>(
        mut self,
        backend: B,
    ) -> Self {
        self.primary = Some(Arc::new(backend));
        self
    }

    /// Sets the primary backend from an existing `Arc`.
    pub fn with_primary_arc(mut self, backend: ArcBackend) -> Self {
        self.primary = Some(backend);
        self
    }

    /// Sets the fallback storage backend.
    pub fn with_fallback_backend<B: crate::storage::StorageBackend + 'static>(
        mut self,
        backend: B,
    ) -> Self {
        self.fallback = Some(Arc::new(backend));
        self
    }

    /// Sets the fallback backend from an existing `Arc`.
    pub fn with_fallback_arc(mut self, backend: ArcBackend) -> Self {
        self.fallback = Some(backend);
        self
    }

    /// Sets the deep-scan engine.
    pub fn with_deep_scanner<D: DeepScanner + 'static>(mut self, deep: D) -> Self {
        self.deep = Some(Arc::new(deep));
        self
    }

    /// Sets the audit sink.
    pub fn with_audit_sink<A: AuditSink + 'static>(mut self, sink: A) -> Self {
        self.audit = Some(Arc::new(sink));
        self
    }

    /// Sets the audit sink from an existing `Arc`.
    pub fn with_audit_arc(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Sets the notification channel.
    pub fn with_notifier<N: Notifier + 'static>(mut self, notifier: N) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Sets the notifier from an existing `Arc`.
    pub fn with_notifier_arc(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Builds the pipeline.
    ///
    /// Missing collaborators get defaults: a [`SimulatedDeepScanner`],
    /// an in-memory audit log, and a logging notifier. Backends stay
    /// unset; a pipeline with no backend rejects every upload with a
    /// distinct "no backend" error before scanning.
    pub fn build(self) -> IngestionPipeline {
        let deep = self
            .deep
            .unwrap_or_else(|| Arc::new(SimulatedDeepScanner::new()));

        IngestionPipeline {
            scanner: ThreatScanner::with_engine(deep),
            primary: self.primary,
            fallback: self.fallback,
            audit: self.audit.unwrap_or_else(|| Arc::new(MemoryAuditLog::new())),
            notifier: self
                .notifier
                .unwrap_or_else(|| Arc::new(LoggingNotifier::new())),
        }
    }
}

impl Default for IngestionPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The pipeline's public entry point.
///
/// Sequences the safety pre-filter, the backend availability check,
/// the threat scanner, and persistence for each submitted file, and
/// emits the audit record and any security alert after the
/// authoritative accept/reject decision is made.
///
/// # Examples
///
/// ```rust,ignore
/// use attachguard::core::{CandidateFile, FileCategory};
/// use attachguard::pipeline::IngestionPipeline;
/// use attachguard::storage::MemoryBackend;
///
/// let pipeline = IngestionPipeline::builder()
///     .with_fallback_backend(MemoryBackend::new())
///     .build();
///
/// let session = pipeline.open_session("agent-7").await;
/// let file = CandidateFile::from_bytes("notes.txt", b"hello".to_vec());
/// let outcome = pipeline
///     .upload_file(&session, file, "ticket-1", FileCategory::Ticket)
///     .await;
/// assert!(outcome.success());
/// ```
pub struct IngestionPipeline {
    scanner: ThreatScanner,
    primary: Option<ArcBackend>,
    fallback: Option<ArcBackend>,
    audit: Arc<dyn AuditSink>,
    notifier: Arc<dyn Notifier>,
}

impl IngestionPipeline {
    /// Creates a new builder.
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::new()
    }

    /// Probes the configured backends and reports availability.
    ///
    /// Called once when a file-attachment surface becomes visible;
    /// the result is cached in the session, not recomputed per file.
    pub async fn diagnose_storage(&self) -> StorageDiagnosis {
        diagnose(self.primary.as_ref(), self.fallback.as_ref()).await
    }

    /// Opens a session for the given user, probing backends once.
    pub async fn open_session(&self, user_id: impl Into<String>) -> PipelineSession {
        PipelineSession::establish(user_id, self.primary.clone(), self.fallback.clone()).await
    }

    /// Re-probes the backends for an existing session.
    pub async fn refresh_session(&self, session: &mut PipelineSession) {
        session
            .refresh(self.primary.clone(), self.fallback.clone())
            .await;
    }

    /// Runs the safety pre-filter alone, for instant UI feedback
    /// before the async pipeline runs.
    ///
    /// The size ceiling comes from the session's active backend.
    pub fn is_file_safe(&self, session: &PipelineSession, file: &CandidateFile) -> SafetyVerdict {
        self.filter_for(session).check(file)
    }

    /// Ingests one file attached to the given ticket or message.
    ///
    /// Stage order: pre-filter, backend availability, scanner,
    /// persistence. Rejections before the scanner produce no scan
    /// record; every scan produces exactly one.
    pub async fn upload_file(
        &self,
        session: &PipelineSession,
        file: CandidateFile,
        related_id: &str,
        category: FileCategory,
    ) -> UploadOutcome {
        let mut state = FileState::Pending;

        tracing::info!(
            file_name = %file.name,
            file_size = file.byte_size,
            related_id = %related_id,
            category = %category,
            user_id = %session.user_id(),
            "Upload started"
        );

        // Pre-filter: synchronous, short-circuits before any network
        // or scanning cost.
        let verdict = self.filter_for(session).check(&file);
        if !verdict.safe {
            let reason = verdict.reason.unwrap_or_else(|| "unspecified".to_string());
            let error = PipelineError::safety_rejected(reason);
            state.advance(FileState::Rejected(error.clone()));
            emit_file_rejected(&file.name, &error);
            return UploadOutcome::rejected(file.name, None, error);
        }
        state.advance(FileState::PreFiltered);

        // Backend availability: checked before scanning so a
        // guaranteed-unstorable file never pays the scan cost.
        let Some(backend) = session.backend() else {
            let error = PipelineError::NoBackendAvailable;
            state.advance(FileState::Rejected(error.clone()));
            emit_file_rejected(&file.name, &error);
            return UploadOutcome::rejected(file.name, None, error);
        };

        state.advance(FileState::Scanning);
        let report = self.scanner.scan(&file).await;
        let disposition = ScanDisposition::from_report(&report);
        state.advance(FileState::Scanned(disposition));

        // The decision is made; emit the audit record and any alert
        // as best-effort side channels that cannot change it.
        let scan_record = ScanRecord::from_report(&report, &file, session.user_id());
        self.emit_scan_events(&scan_record).await;

        match disposition {
            ScanDisposition::Failed => {
                let error = PipelineError::ScanFailed {
                    scan_id: report.scan_id.clone(),
                    message: report
                        .error
                        .unwrap_or_else(|| "scan did not complete".to_string()),
                };
                state.advance(FileState::Rejected(error.clone()));
                emit_file_rejected(&file.name, &error);
                UploadOutcome::rejected(file.name, Some(report.scan_id), error)
            }
            ScanDisposition::Dirty => {
                let error = PipelineError::ThreatDetected {
                    scan_id: report.scan_id.clone(),
                    threats: report.threats.clone(),
                };
                state.advance(FileState::Rejected(error.clone()));
                emit_file_rejected(&file.name, &error);
                UploadOutcome::rejected(file.name, Some(report.scan_id), error)
            }
            ScanDisposition::Clean => {
                match backend.persist(&file, category, related_id).await {
                    Ok(stored) => {
                        state.advance(FileState::Stored);
                        emit_file_stored(&stored, &report.scan_id);
                        UploadOutcome {
                            file_name: file.name,
                            method: backend.method(),
                            scan_id: Some(report.scan_id),
                            result: Ok(stored),
                        }
                    }
                    Err(err) => {
                        // The one case where a file passes screening
                        // but is still not stored: the backend
                        // degraded mid-session.
                        let error =
                            PipelineError::persistence_failed(backend.name(), err.to_string());
                        state.advance(FileState::Rejected(error.clone()));
                        emit_file_rejected(&file.name, &error);
                        UploadOutcome::rejected(file.name, Some(report.scan_id), error)
                    }
                }
            }
        }
    }

    /// Ingests a batch of files attached to the same ticket or
    /// message.
    ///
    /// Files are processed strictly sequentially: each file's scan
    /// completes before the next begins, bounding memory use and
    /// keeping the audit log ordered by submission order. A later
    /// file's rejection never rolls back an earlier file's
    /// acceptance; the caller decides how to present partial success.
    pub async fn upload_batch(
        &self,
        session: &PipelineSession,
        files: Vec<CandidateFile>,
        related_id: &str,
        category: FileCategory,
    ) -> Vec<UploadOutcome> {
        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            outcomes.push(self.upload_file(session, file, related_id, category).await);
        }
        outcomes
    }

    /// Retrieves the original bytes of a stored file for local save.
    ///
    /// Retrieval skips scanning. A missing record is a distinct
    /// [`PipelineError::NotFound`].
    pub async fn download_file(
        &self,
        session: &PipelineSession,
        id: &FileId,
    ) -> PipelineResult<Vec<u8>> {
        let Some(backend) = session.backend() else {
            return Err(PipelineError::NoBackendAvailable);
        };

        backend.retrieve(id).await.map_err(|err| match err {
            StorageError::NotFound { id } => PipelineError::NotFound { id },
            other => PipelineError::persistence_failed(backend.name(), other.to_string()),
        })
    }

    /// Lists previously stored files for a ticket or message thread.
    pub async fn get_files(
        &self,
        session: &PipelineSession,
        related_id: &str,
        category: FileCategory,
    ) -> PipelineResult<Vec<StoredFileRecord>> {
        let Some(backend) = session.backend() else {
            return Err(PipelineError::NoBackendAvailable);
        };

        backend
            .list(related_id, category)
            .await
            .map_err(|err| PipelineError::persistence_failed(backend.name(), err.to_string()))
    }

    /// Returns the audit sink, for security review queries.
    pub fn audit_sink(&self) -> &Arc<dyn AuditSink> {
        &self.audit
    }

    fn filter_for(&self, session: &PipelineSession) -> SafetyFilter {
        let ceiling = session
            .backend()
            .map(|b| b.max_payload_size())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE);
        SafetyFilter::new(ceiling)
    }

    /// Writes the audit record and dispatches an alert on a positive
    /// detection. Both are best-effort: failures are logged to the
    /// operator and never change the accept/reject outcome.
    async fn emit_scan_events(&self, record: &ScanRecord) {
        if let Err(err) = self.audit.record_scan(record).await {
            tracing::error!(
                scan_id = %record.scan_id,
                error = %err,
                "Audit write failed; screening decision unaffected"
            );
        }
        emit_scan_recorded(record);

        if !record.threats.is_empty() {
            let alert = ThreatAlert::from_record(record);
            if let Err(err) = self.notifier.notify(&alert).await {
                tracing::error!(
                    scan_id = %record.scan_id,
                    channel = self.notifier.channel(),
                    error = %err,
                    "Alert dispatch failed; rejection stands"
                );
            }
        }
    }
}

impl std::fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("engine", &self.scanner.engine_name())
            .field("has_primary", &self.primary.is_some())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}
