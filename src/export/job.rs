use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::archive::SkippedElement;
use crate::document::DocumentId;
use crate::error::ExportError;
use crate::id_generator;
use crate::snapshot::Snapshot;

/// Identifier of an export job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    pub(crate) fn next() -> Self {
        Self(id_generator::generate_job_id())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of an export job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportStatus {
    Pending,
    Writing,
    Completed,
    Failed,
    Cancelled,
}

impl ExportStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExportStatus::Completed | ExportStatus::Failed | ExportStatus::Cancelled
        )
    }

    fn can_transition_to(&self, next: ExportStatus) -> bool {
        match self {
            ExportStatus::Pending => next == ExportStatus::Writing,
            ExportStatus::Writing => next.is_terminal(),
            _ => false,
        }
    }
}

/// Details of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub job: JobId,
    pub path: PathBuf,
    pub element_count: usize,
    /// Mutation counter of the document when the snapshot was captured
    pub sequence: u64,
    pub skipped: Vec<SkippedElement>,
}

/// Terminal result of an export, delivered exactly once
#[derive(Debug, Clone)]
pub enum ExportOutcome {
    Completed(ExportReport),
    Failed(ExportError),
    Cancelled,
}

impl ExportOutcome {
    pub fn status(&self) -> ExportStatus {
        match self {
            ExportOutcome::Completed(_) => ExportStatus::Completed,
            ExportOutcome::Failed(_) => ExportStatus::Failed,
            ExportOutcome::Cancelled => ExportStatus::Cancelled,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ExportOutcome::Completed(_))
    }

    pub fn report(&self) -> Option<&ExportReport> {
        match self {
            ExportOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ExportError> {
        match self {
            ExportOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// One in-flight export: the snapshot being written and where it goes
#[derive(Debug)]
pub struct ExportJob {
    id: JobId,
    snapshot: Snapshot,
    destination: PathBuf,
    status: Mutex<ExportStatus>,
    cancelled: AtomicBool,
}

impl ExportJob {
    pub(crate) fn new(snapshot: Snapshot, destination: PathBuf) -> Self {
        Self {
            id: JobId::next(),
            snapshot,
            destination,
            status: Mutex::new(ExportStatus::Pending),
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn document_id(&self) -> DocumentId {
        self.snapshot.document_id()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn status(&self) -> ExportStatus {
        *self.status.lock()
    }

    /// Ask the writer to stop at the next entry boundary
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            log::info!("Cancellation requested for export {}", self.id);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Move to `next`, returning false when the state machine forbids it
    pub(crate) fn transition(&self, next: ExportStatus) -> bool {
        let mut status = self.status.lock();
        if !status.can_transition_to(next) {
            log::warn!(
                "Export {} cannot move from {:?} to {:?}",
                self.id,
                *status,
                next
            );
            return false;
        }
        log::debug!("Export {}: {:?} -> {:?}", self.id, *status, next);
        *status = next;
        true
    }
}
