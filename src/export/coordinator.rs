use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::executor::{self, ThreadPool};
use parking_lot::Mutex;

use super::job::{ExportJob, ExportOutcome, ExportReport, ExportStatus, JobId};
use crate::archive::{self, WriteError, WriteObserver, WriteOptions};
use crate::config::ExportConfig;
use crate::document::{Document, DocumentId};
use crate::error::ExportError;
use crate::event::{EventBus, ExportEvent};
use crate::snapshot::Snapshot;

type JobTable = Arc<Mutex<HashMap<JobId, Arc<ExportJob>>>>;

/// Runs exports in the background while the document stays editable.
///
/// `export_async` captures a [`Snapshot`] on the calling thread and hands it
/// to a worker pool. The workers only ever see the snapshot, never the live
/// document, so editing can continue while the archive is written.
pub struct ExportCoordinator {
    config: ExportConfig,
    pool: ThreadPool,
    jobs: JobTable,
    events: Arc<EventBus>,
}

impl std::fmt::Debug for ExportCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportCoordinator")
            .field("config", &self.config)
            .field("in_flight", &self.jobs.lock().len())
            .finish()
    }
}

impl ExportCoordinator {
    /// Create a coordinator with its own pool of writer threads
    pub fn new(config: ExportConfig) -> io::Result<Self> {
        let pool = ThreadPool::builder()
            .pool_size(config.worker_threads.max(1))
            .name_prefix("paper-export-")
            .create()?;
        Ok(Self {
            config,
            pool,
            jobs: Arc::new(Mutex::new(HashMap::new())),
            events: Arc::new(EventBus::new()),
        })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Bus carrying status and progress events for every job
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Start exporting `document` to `destination`.
    ///
    /// Returns as soon as the snapshot is captured. `on_complete` runs exactly
    /// once, on a worker thread, when the job reaches a terminal state; the
    /// returned handle resolves to the same outcome.
    ///
    /// Fails immediately, without scheduling any work, when the destination
    /// is unusable or the document already has an export in flight.
    pub fn export_async<F>(
        &self,
        document: &Document,
        destination: impl AsRef<Path>,
        on_complete: F,
    ) -> Result<ExportHandle, ExportError>
    where
        F: FnOnce(ExportOutcome) + Send + 'static,
    {
        let destination = destination.as_ref();
        validate_destination(destination)?;

        let job = {
            let mut jobs = self.jobs.lock();
            if !self.config.allow_concurrent_exports
                && jobs.values().any(|job| job.document_id() == document.id())
            {
                return Err(ExportError::AlreadyExporting(document.id()));
            }
            if jobs.values().any(|job| job.destination() == destination) {
                return Err(ExportError::InvalidDestination {
                    path: destination.to_path_buf(),
                    reason: "another export is writing to this path".to_owned(),
                });
            }

            let job = Arc::new(ExportJob::new(
                Snapshot::capture(document),
                destination.to_path_buf(),
            ));
            jobs.insert(job.id(), Arc::clone(&job));
            job
        };

        log::info!(
            "Exporting document {} ({} elements, sequence {}) to {} as job {}",
            job.document_id(),
            job.snapshot().len(),
            job.snapshot().sequence(),
            destination.display(),
            job.id()
        );
        self.events.emit(ExportEvent::StatusChanged {
            job: job.id(),
            document: job.document_id(),
            status: ExportStatus::Pending,
        });

        let (sender, receiver) = oneshot::channel();
        let task = JobTask {
            job: Arc::clone(&job),
            options: WriteOptions::from(&self.config),
            events: Arc::clone(&self.events),
            jobs: Arc::clone(&self.jobs),
        };
        self.pool.spawn_ok(async move {
            let outcome = task.run_guarded();
            on_complete(outcome.clone());
            // The handle may have been dropped; the callback already ran.
            let _ = sender.send(outcome);
        });

        Ok(ExportHandle { job, receiver })
    }

    /// Cancel every in-flight export, e.g. when the application is suspended.
    /// Returns the number of jobs asked to stop.
    pub fn cancel_all(&self) -> usize {
        let jobs = self.jobs.lock();
        for job in jobs.values() {
            job.cancel();
        }
        if !jobs.is_empty() {
            log::info!("Cancelled {} in-flight exports", jobs.len());
        }
        jobs.len()
    }

    /// Cancel a single job by id, returning false if it is no longer running
    pub fn cancel(&self, id: JobId) -> bool {
        match self.jobs.lock().get(&id) {
            Some(job) => {
                job.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_exporting(&self, document: DocumentId) -> bool {
        self.jobs
            .lock()
            .values()
            .any(|job| job.document_id() == document)
    }

    pub fn in_flight_count(&self) -> usize {
        self.jobs.lock().len()
    }
}

/// Handle on a running export.
///
/// Awaiting the handle (or calling [`ExportHandle::wait`]) yields the same
/// outcome that was passed to the completion callback. Dropping it does not
/// cancel the export.
pub struct ExportHandle {
    job: Arc<ExportJob>,
    receiver: oneshot::Receiver<ExportOutcome>,
}

impl std::fmt::Debug for ExportHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportHandle")
            .field("job", &self.job.id())
            .field("status", &self.job.status())
            .finish()
    }
}

impl ExportHandle {
    pub fn id(&self) -> JobId {
        self.job.id()
    }

    pub fn status(&self) -> ExportStatus {
        self.job.status()
    }

    /// The snapshot this job is writing
    pub fn snapshot(&self) -> &Snapshot {
        self.job.snapshot()
    }

    pub fn destination(&self) -> &Path {
        self.job.destination()
    }

    /// Request cooperative cancellation
    pub fn cancel(&self) {
        self.job.cancel();
    }

    /// Block the current thread until the export finishes
    pub fn wait(self) -> ExportOutcome {
        executor::block_on(self)
    }
}

impl Future for ExportHandle {
    type Output = ExportOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or_else(|_| ExportOutcome::Failed(ExportError::WorkerLost)))
    }
}

/// Work item executed on the pool
struct JobTask {
    job: Arc<ExportJob>,
    options: WriteOptions,
    events: Arc<EventBus>,
    jobs: JobTable,
}

impl JobTask {
    /// Run the job, turning a panic in the writer into a failed outcome so the
    /// callback still fires
    fn run_guarded(self) -> ExportOutcome {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run())) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_owned());
                log::error!("Export {} panicked: {}", self.job.id(), message);
                self.set_status(ExportStatus::Failed);
                ExportOutcome::Failed(ExportError::WorkerLost)
            }
        }
    }

    fn run(&self) -> ExportOutcome {
        // Released even if writing panics, so the document can export again.
        let _registration = Registration {
            id: self.job.id(),
            jobs: Arc::clone(&self.jobs),
        };

        self.set_status(ExportStatus::Writing);

        let mut observer = JobObserver {
            job: &self.job,
            events: &self.events,
        };
        let result = archive::write_archive(
            self.job.snapshot(),
            self.job.destination(),
            self.options,
            &mut observer,
        );

        let outcome = match result {
            Ok(report) => ExportOutcome::Completed(ExportReport {
                job: self.job.id(),
                path: self.job.destination().to_path_buf(),
                element_count: report.element_count,
                sequence: report.sequence,
                skipped: report.skipped,
            }),
            Err(WriteError::Cancelled) => ExportOutcome::Cancelled,
            Err(WriteError::Io(err)) => {
                ExportOutcome::Failed(ExportError::io(self.job.destination(), err))
            }
            Err(WriteError::Serialization { id, source }) => {
                ExportOutcome::Failed(ExportError::Serialization {
                    id,
                    source: Arc::new(source),
                })
            }
        };

        match &outcome {
            ExportOutcome::Completed(report) => log::info!(
                "Export {} completed: {} elements written to {}",
                report.job,
                report.element_count,
                report.path.display()
            ),
            ExportOutcome::Failed(err) => log::error!("Export {} failed: {}", self.job.id(), err),
            ExportOutcome::Cancelled => log::info!("Export {} cancelled", self.job.id()),
        }

        self.set_status(outcome.status());
        outcome
    }

    fn set_status(&self, status: ExportStatus) {
        if self.job.transition(status) {
            self.events.emit(ExportEvent::StatusChanged {
                job: self.job.id(),
                document: self.job.document_id(),
                status,
            });
        }
    }
}

/// Removes a job from the in-flight table when dropped
struct Registration {
    id: JobId,
    jobs: JobTable,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.jobs.lock().remove(&self.id);
    }
}

struct JobObserver<'a> {
    job: &'a ExportJob,
    events: &'a EventBus,
}

impl WriteObserver for JobObserver<'_> {
    fn is_cancelled(&self) -> bool {
        self.job.is_cancelled()
    }

    fn entry_written(&mut self, done: usize, total: usize) {
        self.events.emit(ExportEvent::Progress {
            job: self.job.id(),
            done,
            total,
        });
    }
}

fn validate_destination(path: &Path) -> Result<(), ExportError> {
    let invalid = |reason: &str| ExportError::InvalidDestination {
        path: path.to_path_buf(),
        reason: reason.to_owned(),
    };

    if path.as_os_str().is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.file_name().is_none() {
        return Err(invalid("path has no file name"));
    }
    if path.is_dir() {
        return Err(invalid("path is a directory"));
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.is_dir() {
        return Err(invalid("parent directory does not exist"));
    }
    Ok(())
}
