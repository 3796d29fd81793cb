use crate::document::DocumentId;
use crate::export::{ExportStatus, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    StatusChanged {
        job: JobId,
        document: DocumentId,
        status: ExportStatus,
    },
    Progress {
        job: JobId,
        done: usize,
        total: usize,
    },
}

impl ExportEvent {
    pub fn job(&self) -> JobId {
        match self {
            ExportEvent::StatusChanged { job, .. } | ExportEvent::Progress { job, .. } => *job,
        }
    }
}
