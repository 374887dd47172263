//! The buffer pool contract.

use super::page_guard::{PageReadGuard, PageRef, PageWriteGuard};
use crate::common::{PageId, Result};

/// Operations every buffer pool offers, whether it is a single shard
/// ([`BufferPoolInstance`]) or the sharded front end
/// ([`ParallelBufferPoolManager`]).
///
/// Every successful [`fetch_page`](Self::fetch_page) or
/// [`new_page`](Self::new_page) pins the page; the caller must balance it
/// with exactly one [`unpin_page`](Self::unpin_page). The guard helpers do
/// that automatically.
///
/// [`BufferPoolInstance`]: super::BufferPoolInstance
/// [`ParallelBufferPoolManager`]: super::ParallelBufferPoolManager
pub trait BufferPool: Send + Sync {
    /// Pin `page_id`, loading it from disk if it is not resident.
    ///
    /// # Errors
    /// - `Error::PageNotFound` if the page was never allocated
    /// - `Error::NoFreeFrames` if every frame is pinned
    fn fetch_page(&self, page_id: PageId) -> Result<PageRef<'_>>;

    /// Allocate a fresh zeroed page and return it pinned.
    ///
    /// # Errors
    /// - `Error::NoFreeFrames` from a single shard
    /// - `Error::BufferPoolFull` from the sharded pool when every shard refuses
    fn new_page(&self) -> Result<PageRef<'_>>;

    /// Drop one pin on `page_id`, ORing in `is_dirty`.
    ///
    /// Release any lock taken through the page's [`PageRef`] first; an
    /// unpinned frame can be evicted, and eviction locks it.
    ///
    /// Returns `false` if the page is not resident or not pinned.
    fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool;

    /// Write `page_id` to disk.
    ///
    /// Returns `Ok(false)` if the page is not resident. The caller must not
    /// hold a write lock on the page.
    fn flush_page(&self, page_id: PageId) -> Result<bool>;

    /// Remove `page_id` from the pool, discarding its contents.
    ///
    /// Returns `false` if the page is not resident or is still pinned.
    fn delete_page(&self, page_id: PageId) -> bool;

    /// Write every dirty resident page to disk.
    fn flush_all_pages(&self) -> Result<()>;

    /// Total number of frames.
    fn pool_size(&self) -> usize;

    /// Fetch a page for reading; the guard unpins on drop.
    fn fetch_page_read(&self, page_id: PageId) -> Result<PageReadGuard<'_, Self>>
    where
        Self: Sized,
    {
        let page = self.fetch_page(page_id)?;
        Ok(PageReadGuard::new(self, page))
    }

    /// Fetch a page for writing; the guard marks it dirty and unpins on drop.
    fn fetch_page_write(&self, page_id: PageId) -> Result<PageWriteGuard<'_, Self>>
    where
        Self: Sized,
    {
        let page = self.fetch_page(page_id)?;
        Ok(PageWriteGuard::new(self, page))
    }

    /// Allocate a new page behind a write guard.
    fn new_page_guarded(&self) -> Result<PageWriteGuard<'_, Self>>
    where
        Self: Sized,
    {
        let page = self.new_page()?;
        Ok(PageWriteGuard::new(self, page))
    }
}
