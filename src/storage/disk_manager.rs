//! Disk Manager - page-granular file I/O.
//!
//! One [`DiskManager`] backs the whole buffer pool. Every shard holds an
//! `Arc` to it and the manager serializes file access internally.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use parking_lot::Mutex;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;

/// Manages disk I/O for a single database file.
///
/// # File Layout
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Shards mint page ids from disjoint residue classes, so pages are not
/// allocated in file order: allocating page 5 before page 3 extends the file
/// to six pages and leaves page 3 zero-filled until it is written.
///
/// # Durability
/// Every write is followed by `fsync()`.
pub struct DiskManager {
    inner: Mutex<DiskFile>,
}

struct DiskFile {
    file: File,
    /// Number of pages covered by the file (highest allocated id + 1).
    page_count: u32,
}

impl DiskManager {
    /// Create a new database file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self::from_file(file, 0))
    }

    /// Open an existing database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let page_count = (file.metadata()?.len() / PAGE_SIZE as u64) as u32;

        Ok(Self::from_file(file, page_count))
    }

    /// Open an existing database file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    fn from_file(file: File, page_count: u32) -> Self {
        Self {
            inner: Mutex::new(DiskFile { file, page_count }),
        }
    }

    /// Read a page from disk into `page`.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page lies past the end of file.
    pub fn read_page(&self, page_id: PageId, page: &mut Page) -> Result<()> {
        let mut disk = self.inner.lock();
        if page_id.0 >= disk.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }

        disk.file.seek(SeekFrom::Start(offset_of(page_id)))?;
        disk.file.read_exact(page.as_mut_slice())?;
        Ok(())
    }

    /// Write a page to disk.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page was never allocated.
    pub fn write_page(&self, page_id: PageId, page: &Page) -> Result<()> {
        let mut disk = self.inner.lock();
        if page_id.0 >= disk.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }

        disk.file.seek(SeekFrom::Start(offset_of(page_id)))?;
        disk.file.write_all(page.as_slice())?;
        disk.file.sync_all()?;
        Ok(())
    }

    /// Reserve `page_id` on disk, zero-filling it.
    ///
    /// The id is chosen by the calling shard. The file grows as needed.
    pub fn allocate_page(&self, page_id: PageId) -> Result<()> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id.0));
        }

        let mut disk = self.inner.lock();
        disk.file.seek(SeekFrom::Start(offset_of(page_id)))?;
        disk.file.write_all(&[0u8; PAGE_SIZE])?;
        disk.file.sync_all()?;

        disk.page_count = disk.page_count.max(page_id.0 + 1);
        Ok(())
    }

    /// Number of pages covered by the file.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.inner.lock().page_count
    }

    /// Total size of the database file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count() as u64) * (PAGE_SIZE as u64)
    }
}

#[inline]
fn offset_of(page_id: PageId) -> u64 {
    (page_id.0 as u64) * (PAGE_SIZE as u64)
}
