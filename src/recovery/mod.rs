//! Write-ahead logging.
//!
//! The buffer pool only needs one guarantee from the log: every record
//! appended before a dirty page is written back has reached disk first.
//! [`LogManager::flush`] provides it; shards call it before any page write.

mod log_manager;

pub use log_manager::{LogManager, Lsn};
