//! Security alerting for positive threat detections.
//!
//! When a scan finds threats, the orchestrator formats a structured
//! [`ThreatAlert`] and dispatches it through the configured
//! [`Notifier`]. Dispatch is best-effort: a failure is logged but the
//! file's rejection stands regardless. Scan failures are audited but
//! do not page security; only positive detections do.

use crate::core::{NotifyError, NotifyResult, ScanRecord};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// A structured security alert for one threat detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatAlert {
    /// Short subject line for the alert channel.
    pub subject: String,

    /// Human-readable body.
    pub message: String,

    /// Ordered key/value detail table for the alert body.
    pub details: BTreeMap<String, String>,
}

impl ThreatAlert {
    /// Builds an alert from a non-clean scan record.
    pub fn from_record(record: &ScanRecord) -> Self {
        let subject = format!("Threat detected in uploaded file '{}'", record.file_name);
        let message = format!(
            "The file '{}' uploaded by {} was blocked: {}. The file was not stored.",
            record.file_name,
            record.scanned_by,
            record.threats.join(", "),
        );

        let mut details = BTreeMap::new();
        details.insert("file_name".to_string(), record.file_name.clone());
        details.insert("file_size".to_string(), record.file_size.to_string());
        details.insert("declared_type".to_string(), record.mime_type.clone());
        details.insert("threats".to_string(), record.threats.join(", "));
        details.insert("uploaded_by".to_string(), record.scanned_by.clone());
        details.insert("scan_id".to_string(), record.scan_id.to_string());

        Self {
            subject,
            message,
            details,
        }
    }
}

/// An out-of-band alert channel (email, webhook, ...), owned by an
/// external collaborator.
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Returns the channel name, for operator logs.
    fn channel(&self) -> &str;

    /// Dispatches one alert.
    async fn notify(&self, alert: &ThreatAlert) -> NotifyResult<()>;
}

/// A notifier that writes alerts to the tracing log.
///
/// The default channel when no external collaborator is configured.
#[derive(Debug, Default)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    /// Creates a logging notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LoggingNotifier {
    fn channel(&self) -> &str {
        "log"
    }

    async fn notify(&self, alert: &ThreatAlert) -> NotifyResult<()> {
        tracing::warn!(
            target: "attachguard::alerts",
            subject = %alert.subject,
            message = %alert.message,
            details = ?alert.details,
            "Security alert"
        );
        Ok(())
    }
}

/// An in-memory notifier for tests.
///
/// Captures every dispatched alert and can be made to fail, to
/// exercise the pipeline's best-effort dispatch handling.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    alerts: RwLock<Vec<ThreatAlert>>,
    fail: AtomicBool,
}

impl MemoryNotifier {
    /// Creates an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent dispatch fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of dispatched alerts.
    pub fn dispatch_count(&self) -> usize {
        self.alerts.read().unwrap().len()
    }

    /// Returns all captured alerts in dispatch order.
    pub fn alerts(&self) -> Vec<ThreatAlert> {
        self.alerts.read().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    fn channel(&self) -> &str {
        "memory"
    }

    async fn notify(&self, alert: &ThreatAlert) -> NotifyResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::DispatchFailed {
                channel: self.channel().to_string(),
                reason: "injected dispatch failure".to_string(),
            });
        }
        self.alerts.write().unwrap().push(alert.clone());
        Ok(())
    }
}
