mod history;
mod operations;

pub use history::{History, HistoryEntry};
pub use operations::{Change, Operation};
