//! Log Manager - an append-only record log.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::common::{Error, Result};

/// Log sequence number: the position of a record in the log, starting at 0.
pub type Lsn = u64;

/// `len: u32 | crc32: u32`, both little-endian, before every payload.
const RECORD_HEADER_SIZE: usize = 8;

/// Append-only log shared by every shard.
///
/// # Record Format
/// ```text
/// ┌──────────┬───────────┬──────────────────┐
/// │ len: u32 │ crc32: u32│ payload (len B)  │
/// └──────────┴───────────┴──────────────────┘
/// ```
///
/// Records are buffered in memory by [`append`](Self::append) and only reach
/// disk on [`flush`](Self::flush).
pub struct LogManager {
    inner: Mutex<LogState>,
    /// Number of records known to be on disk.
    flushed_records: AtomicU64,
}

struct LogState {
    file: File,
    buffer: Vec<u8>,
    next_lsn: Lsn,
}

impl LogManager {
    /// Open the log at `path`, creating it if needed. Existing records are
    /// kept and new ones are appended after them.
    ///
    /// # Errors
    /// Fails with `Error::CorruptLogRecord` if the existing log is damaged.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        let existing = Self::read_all(&path)?.len() as u64;

        Ok(Self {
            inner: Mutex::new(LogState {
                file,
                buffer: Vec::new(),
                next_lsn: existing,
            }),
            flushed_records: AtomicU64::new(existing),
        })
    }

    /// Buffer a record and return its LSN.
    pub fn append(&self, payload: &[u8]) -> Lsn {
        let mut state = self.inner.lock();
        let lsn = state.next_lsn;
        state.next_lsn += 1;

        let checksum = crc32fast::hash(payload);
        state
            .buffer
            .extend_from_slice(&(payload.len() as u32).to_le_bytes());
        state.buffer.extend_from_slice(&checksum.to_le_bytes());
        state.buffer.extend_from_slice(payload);
        lsn
    }

    /// Write every buffered record and fsync the log file.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.inner.lock();
        if state.buffer.is_empty() {
            return Ok(());
        }

        let LogState { file, buffer, next_lsn } = &mut *state;
        file.write_all(buffer)?;
        file.sync_data()?;
        buffer.clear();

        self.flushed_records.store(*next_lsn, Ordering::Release);
        Ok(())
    }

    /// LSN of the newest record on disk, or `None` if nothing was flushed.
    pub fn persistent_lsn(&self) -> Option<Lsn> {
        self.flushed_records.load(Ordering::Acquire).checked_sub(1)
    }

    /// Bytes appended but not yet flushed.
    pub fn buffered_bytes(&self) -> usize {
        self.inner.lock().buffer.len()
    }

    /// Read every record payload from the log at `path`, in LSN order.
    pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<u8>>> {
        let bytes = fs::read(path)?;
        let mut records = Vec::new();
        let mut offset = 0usize;

        while offset < bytes.len() {
            let header = bytes
                .get(offset..offset + RECORD_HEADER_SIZE)
                .ok_or(Error::CorruptLogRecord(offset as u64))?;
            let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
            let checksum = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

            let start = offset + RECORD_HEADER_SIZE;
            let payload = bytes
                .get(start..start + len)
                .ok_or(Error::CorruptLogRecord(offset as u64))?;
            if crc32fast::hash(payload) != checksum {
                return Err(Error::CorruptLogRecord(offset as u64));
            }

            records.push(payload.to_vec());
            offset = start + len;
        }

        Ok(records)
    }
}
