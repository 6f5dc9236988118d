//! Deep-scan engine seam.
//!
//! Stage three of the scanner, run only when the signature and
//! heuristic stages are negative. The [`DeepScanner`] trait is the
//! integration point for a real scanning service; the shipped
//! [`SimulatedDeepScanner`] models one with an artificial delay and
//! construction-time synthetic rules, so real engines can be swapped
//! in without touching the earlier stages.

use crate::core::CandidateFile;

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

/// Error from a deep-scan engine.
#[derive(Debug, Clone, Error)]
#[error("deep scan engine '{engine}' failed: {reason}")]
pub struct DeepScanError {
    /// Name of the engine that failed.
    pub engine: String,
    /// Description of the failure.
    pub reason: String,
}

impl DeepScanError {
    /// Creates a new deep-scan error.
    pub fn new(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            reason: reason.into(),
        }
    }
}

/// A content-scanning engine consulted when the static stages find
/// nothing.
///
/// Implementations must be `Send + Sync` for use in async contexts
/// and should never panic; failures are returned as [`DeepScanError`]
/// and treated as not clean by the pipeline (fail closed).
#[async_trait]
pub trait DeepScanner: Send + Sync + Debug {
    /// Returns a stable, human-readable engine name.
    fn name(&self) -> &str;

    /// Scans the file and returns descriptions of detected threats.
    ///
    /// An empty list means the engine found nothing.
    async fn scan(&self, file: &CandidateFile) -> Result<Vec<String>, DeepScanError>;
}

/// A deterministic stand-in for a real scanning service.
///
/// Introduces a short artificial delay to model the network latency
/// of a scanning API, then applies synthetic rules configured at
/// construction time. The rules are test fixtures, not detection
/// logic: production deployments replace this engine via the
/// [`DeepScanner`] trait.
///
/// # Examples
///
/// ```rust
/// use attachguard::scanner::SimulatedDeepScanner;
/// use std::time::Duration;
///
/// let engine = SimulatedDeepScanner::new()
///     .with_latency(Duration::from_millis(10))
///     .flag_name_containing("infected-sample", "Simulated.TestThreat");
/// ```
#[derive(Debug, Clone)]
pub struct SimulatedDeepScanner {
    latency: Duration,
    flagged_name_fragments: Vec<(String, String)>,
    flagged_sizes: Vec<(u64, String)>,
    failure: Option<String>,
}

impl SimulatedDeepScanner {
    /// Creates a simulated engine with a short default latency and no
    /// synthetic rules.
    pub fn new() -> Self {
        Self {
            latency: Duration::from_millis(150),
            flagged_name_fragments: Vec::new(),
            flagged_sizes: Vec::new(),
            failure: None,
        }
    }

    /// Sets the artificial scan latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Flags any file whose name contains the fragment.
    pub fn flag_name_containing(
        mut self,
        fragment: impl Into<String>,
        threat: impl Into<String>,
    ) -> Self {
        self.flagged_name_fragments
            .push((fragment.into(), threat.into()));
        self
    }

    /// Flags any file of exactly the given size in bytes.
    pub fn flag_exact_size(mut self, size: u64, threat: impl Into<String>) -> Self {
        self.flagged_sizes.push((size, threat.into()));
        self
    }

    /// Makes every scan fail with the given reason.
    ///
    /// Models an unreachable scanning service for fail-closed tests.
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }
}

impl Default for SimulatedDeepScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeepScanner for SimulatedDeepScanner {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn scan(&self, file: &CandidateFile) -> Result<Vec<String>, DeepScanError> {
        tokio::time::sleep(self.latency).await;

        if let Some(reason) = &self.failure {
            return Err(DeepScanError::new(self.name(), reason.clone()));
        }

        let mut threats = Vec::new();
        let name_lower = file.name.to_ascii_lowercase();

        for (fragment, threat) in &self.flagged_name_fragments {
            if name_lower.contains(&fragment.to_ascii_lowercase()) {
                threats.push(threat.clone());
            }
        }

        for (size, threat) in &self.flagged_sizes {
            if file.byte_size == *size {
                threats.push(threat.clone());
            }
        }

        Ok(threats)
    }
}
