mod coordinator;
mod job;

pub use coordinator::{ExportCoordinator, ExportHandle};
pub use job::{ExportJob, ExportOutcome, ExportReport, ExportStatus, JobId};
