//! Threat scanner: judges file content for malicious indicators.
//!
//! The scanner runs three stages in strict order, first positive
//! match wins:
//!
//! 1. Containment of the industry-standard antivirus test signature.
//! 2. Suspicious-content heuristics (aggregating).
//! 3. A deep-scan engine behind the [`DeepScanner`] trait.
//!
//! Ambiguous or failed scans are treated as not clean: the pipeline
//! fails closed.

mod deep;
mod heuristics;
mod signature;

pub use deep::{DeepScanError, DeepScanner, SimulatedDeepScanner};

use crate::core::{CandidateFile, ScanId, ScanReport};

use std::sync::Arc;

/// Asynchronous threat scanner over one file at a time.
///
/// # Examples
///
/// ```rust,ignore
/// use attachguard::core::CandidateFile;
/// use attachguard::scanner::{SimulatedDeepScanner, ThreatScanner};
///
/// let scanner = ThreatScanner::new(SimulatedDeepScanner::new());
/// let file = CandidateFile::from_bytes("notes.txt", b"hello".to_vec());
/// let report = scanner.scan(&file).await;
/// assert!(report.is_clean());
/// ```
#[derive(Debug, Clone)]
pub struct ThreatScanner {
    deep: Arc<dyn DeepScanner>,
}

impl ThreatScanner {
    /// Creates a scanner backed by the given deep-scan engine.
    pub fn new<D: DeepScanner + 'static>(deep: D) -> Self {
        Self {
            deep: Arc::new(deep),
        }
    }

    /// Creates a scanner backed by an already-shared engine.
    pub fn with_engine(deep: Arc<dyn DeepScanner>) -> Self {
        Self { deep }
    }

    /// Returns the name of the deep-scan engine in use.
    pub fn engine_name(&self) -> &str {
        self.deep.name()
    }

    /// Scans one file and produces a report.
    ///
    /// Every invocation mints exactly one [`ScanId`], whether the
    /// outcome is clean, dirty, or failed. The scanner itself has no
    /// side effects; the orchestrator turns each report into an audit
    /// record after the accept/reject decision is made.
    pub async fn scan(&self, file: &CandidateFile) -> ScanReport {
        let scan_id = ScanId::new();

        tracing::debug!(
            scan_id = %scan_id,
            file_name = %file.name,
            file_size = file.byte_size,
            "Scan started"
        );

        // Stage 1: test-virus signature. A hit short-circuits the
        // remaining stages.
        if let Some(threat) = signature::check(&file.text()) {
            tracing::info!(
                scan_id = %scan_id,
                file_name = %file.name,
                threat = %threat,
                "Test signature detected"
            );
            return ScanReport::infected(scan_id, vec![threat]);
        }

        // Stage 2: suspicious-content heuristics, aggregating.
        let patterns = heuristics::check(file);
        if !patterns.is_empty() {
            tracing::info!(
                scan_id = %scan_id,
                file_name = %file.name,
                threat_count = patterns.len(),
                "Heuristic patterns detected"
            );
            return ScanReport::infected(scan_id, patterns);
        }

        // Stage 3: deep-scan engine. An engine failure is fail
        // closed: the report is not clean.
        match self.deep.scan(file).await {
            Ok(threats) if threats.is_empty() => {
                tracing::debug!(scan_id = %scan_id, file_name = %file.name, "Scan clean");
                ScanReport::clean(scan_id)
            }
            Ok(threats) => {
                tracing::info!(
                    scan_id = %scan_id,
                    file_name = %file.name,
                    engine = self.deep.name(),
                    threat_count = threats.len(),
                    "Deep scan detected threats"
                );
                ScanReport::infected(scan_id, threats)
            }
            Err(err) => {
                tracing::warn!(
                    scan_id = %scan_id,
                    file_name = %file.name,
                    engine = self.deep.name(),
                    error = %err,
                    "Deep scan failed; treating file as not clean"
                );
                ScanReport::failed(scan_id, err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn scanner() -> ThreatScanner {
        ThreatScanner::new(SimulatedDeepScanner::new().with_latency(Duration::from_millis(1)))
    }

    fn eicar_file() -> CandidateFile {
        CandidateFile::from_bytes("eicar.txt", signature_bytes()).with_mime_type("text/plain")
    }

    fn signature_bytes() -> Vec<u8> {
        deep_signature().into_bytes()
    }

    fn deep_signature() -> String {
        r"X5O!P%@AP[4\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*".to_string()
    }

    #[tokio::test]
    async fn test_eicar_detected() {
        let report = scanner().scan(&eicar_file()).await;
        assert!(report.is_infected());
        assert_eq!(
            report.threats,
            vec!["EICAR-Test-Signature (Test Virus)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_signature_short_circuits_heuristics() {
        // A file that would also trip heuristics reports only the
        // signature threat.
        let content = format!("<script>{}</script>", deep_signature());
        let file = CandidateFile::from_bytes("page.html", content.into_bytes());
        let report = scanner().scan(&file).await;
        assert_eq!(report.threats.len(), 1);
    }

    #[tokio::test]
    async fn test_clean_file() {
        let file = CandidateFile::from_bytes("minutes.txt", b"meeting notes".to_vec())
            .with_mime_type("text/plain");
        let report = scanner().scan(&file).await;
        assert!(report.is_clean());
        assert!(report.threats.is_empty());
    }

    #[tokio::test]
    async fn test_each_scan_gets_fresh_id() {
        let scanner = scanner();
        let file = eicar_file();
        let first = scanner.scan(&file).await;
        let second = scanner.scan(&file).await;
        assert_ne!(first.scan_id, second.scan_id);
        assert_eq!(first.threats, second.threats);
    }

    #[tokio::test]
    async fn test_engine_failure_fails_closed() {
        let scanner = ThreatScanner::new(
            SimulatedDeepScanner::new()
                .with_latency(Duration::from_millis(1))
                .failing("service unreachable"),
        );
        let file = CandidateFile::from_bytes("photo.png", vec![0u8; 16]);
        let report = scanner.scan(&file).await;
        assert!(report.is_failed());
        assert!(!report.clean);
        assert!(report.error.unwrap().contains("service unreachable"));
    }

    #[tokio::test]
    async fn test_deep_stage_skipped_on_heuristic_hit() {
        // With a failing engine, a heuristic hit must still produce a
        // successful infected report because stage 3 never runs.
        let scanner = ThreatScanner::new(
            SimulatedDeepScanner::new()
                .with_latency(Duration::from_millis(1))
                .failing("down"),
        );
        let file = CandidateFile::from_bytes("keylogger.txt", b"data".to_vec());
        let report = scanner.scan(&file).await;
        assert!(report.is_infected());
        assert!(report.success);
    }
}
