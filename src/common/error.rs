//! Error types for the buffer pool.

use thiserror::Error;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a buffer pool operation can report.
///
/// Conditions that are part of normal operation ("page not resident",
/// "page still pinned") are reported as `bool`/`Option` by the pool API and
/// never show up here.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the database or log file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page does not exist on disk.
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// Every frame of a shard is pinned, so nothing can be evicted.
    #[error("No free frames available in buffer pool")]
    NoFreeFrames,

    /// Every shard refused a new-page request.
    #[error("Buffer pool is full")]
    BufferPoolFull,

    /// The page ID cannot be stored (e.g. the sentinel or an exhausted id space).
    #[error("Invalid page ID: {0}")]
    InvalidPageId(u32),

    /// The buffer pool configuration was rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A log record failed its checksum at the given byte offset.
    #[error("Corrupt log record at offset {0}")]
    CorruptLogRecord(u64),
}
