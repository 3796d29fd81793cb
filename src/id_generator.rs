use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

// Single static counter for export jobs
static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

pub fn generate_job_id() -> u64 {
    NEXT_JOB_ID.fetch_add(1, Ordering::SeqCst)
}

/// Random identifier for elements and documents
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Short random token used to keep temporary file names unique per job
pub fn temp_token() -> String {
    Uuid::new_v4().simple().to_string()
}
