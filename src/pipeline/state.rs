//! Per-file ingestion state machine.
//!
//! Each submitted file walks `Pending → PreFiltered → Scanning →
//! Scanned → Stored | Rejected`. The transitions are encoded in a
//! type rather than loop-body discipline, so the fail-closed and
//! ordering invariants hold structurally: a file cannot reach
//! `Stored` without passing through a clean `Scanned`, and a rejected
//! file cannot leave its terminal state.

use crate::core::{PipelineError, ScanReport};

/// How a completed scan resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDisposition {
    /// The scan completed and found nothing.
    Clean,
    /// The scan completed and found threats.
    Dirty,
    /// The scan itself errored; treated like dirty (fail closed) but
    /// surfaced with a different reason.
    Failed,
}

impl ScanDisposition {
    /// Classifies a scan report.
    pub fn from_report(report: &ScanReport) -> Self {
        if report.is_failed() {
            Self::Failed
        } else if report.is_clean() {
            Self::Clean
        } else {
            Self::Dirty
        }
    }
}

/// The ingestion state of one file.
#[derive(Debug, Clone)]
pub enum FileState {
    /// Submitted, nothing checked yet.
    Pending,
    /// Passed the safety pre-filter.
    PreFiltered,
    /// Handed to the threat scanner.
    Scanning,
    /// Scan completed with the given disposition.
    Scanned(ScanDisposition),
    /// Accepted and persisted. Terminal.
    Stored,
    /// Turned away at some stage. Terminal.
    Rejected(PipelineError),
}

impl FileState {
    /// Returns `true` for the two terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stored | Self::Rejected(_))
    }

    /// Returns the name of the state, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PreFiltered => "pre_filtered",
            Self::Scanning => "scanning",
            Self::Scanned(_) => "scanned",
            Self::Stored => "stored",
            Self::Rejected(_) => "rejected",
        }
    }

    /// Returns `true` if moving to `next` is a legal transition.
    ///
    /// Legal edges: `Pending → PreFiltered`, `PreFiltered → Scanning`,
    /// `Scanning → Scanned`, `Scanned(Clean) → Stored`, and any
    /// non-terminal state `→ Rejected`. Everything else is a
    /// programming error in the orchestrator.
    pub fn can_advance_to(&self, next: &FileState) -> bool {
        match (self, next) {
            (Self::Pending, Self::PreFiltered) => true,
            (Self::PreFiltered, Self::Scanning) => true,
            (Self::Scanning, Self::Scanned(_)) => true,
            (Self::Scanned(ScanDisposition::Clean), Self::Stored) => true,
            (state, Self::Rejected(_)) => !state.is_terminal(),
            _ => false,
        }
    }

    /// Advances to `next`, panicking in debug builds on an illegal
    /// edge.
    pub fn advance(&mut self, next: FileState) {
        debug_assert!(
            self.can_advance_to(&next),
            "illegal transition {} -> {}",
            self.name(),
            next.name()
        );
        *self = next;
    }
}

impl Default for FileState {
    fn default() -> Self {
        Self::Pending
    }
}
