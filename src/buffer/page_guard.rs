//! Handles to resident pages.
//!
//! - [`PageRef`] - What `fetch_page`/`new_page` return. The page stays
//!   pinned until the caller calls `unpin_page` exactly once.
//! - [`PageReadGuard`] / [`PageWriteGuard`] - RAII wrappers that do the
//!   unpin themselves when dropped (write guards also mark the page dirty).
//!
//! Guards release the page lock *before* unpinning, so dropping a guard
//! never holds a page lock while waiting on a shard latch.

use std::ops::{Deref, DerefMut};

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use super::frame::Frame;
use super::pool::BufferPool;
use crate::common::{FrameId, PageId};
use crate::storage::page::Page;

/// A pinned page.
///
/// Holding a `PageRef` does not lock the page bytes; use [`read`](Self::read)
/// or [`write`](Self::write) for that. The lock cannot outlive the handle:
///
/// ```compile_fail
/// use std::sync::Arc;
/// use shardpool::{BufferPool, BufferPoolInstance, DiskManager};
///
/// let dm = Arc::new(DiskManager::create("pool.db").unwrap());
/// let pool = BufferPoolInstance::single(4, dm);
/// let data = {
///     let page = pool.new_page().unwrap();
///     page.read()
/// };
/// ```
pub struct PageRef<'a> {
    page_id: PageId,
    frame: &'a Frame,
}

impl<'a> PageRef<'a> {
    /// Wrap a frame that the caller has already pinned for `page_id`.
    pub fn new(page_id: PageId, frame: &'a Frame) -> Self {
        Self { page_id, frame }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame.id()
    }

    /// Shared access to the page bytes.
    ///
    /// The lock borrows this handle, so it cannot outlive it. Drop both
    /// before calling `unpin_page`: once unpinned the frame may be evicted,
    /// and eviction locks the page.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, Page> {
        self.frame.page()
    }

    /// Exclusive access to the page bytes. Writers must pass `is_dirty = true`
    /// when they unpin.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, Page> {
        self.frame.page_mut()
    }

    /// The pinned frame, for guards that hold the lock for the pin's lifetime.
    #[inline]
    pub(crate) fn frame(&self) -> &'a Frame {
        self.frame
    }
}

/// Guard for read-only page access.
///
/// # Example
/// ```ignore
/// let guard = pool.fetch_page_read(page_id)?;
/// let data = guard.as_slice();
/// // guard drops here, page unpinned
/// ```
pub struct PageReadGuard<'a, P: BufferPool + ?Sized> {
    pool: &'a P,
    page_id: PageId,
    frame_id: FrameId,
    /// `None` only while dropping.
    lock: Option<RwLockReadGuard<'a, Page>>,
}

impl<'a, P: BufferPool + ?Sized> PageReadGuard<'a, P> {
    pub(crate) fn new(pool: &'a P, page: PageRef<'a>) -> Self {
        Self {
            pool,
            page_id: page.page_id(),
            frame_id: page.frame_id(),
            lock: Some(page.frame().page()),
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }
}

impl<P: BufferPool + ?Sized> Deref for PageReadGuard<'_, P> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        self.lock.as_deref().expect("page guard used after release")
    }
}

impl<P: BufferPool + ?Sized> Drop for PageReadGuard<'_, P> {
    fn drop(&mut self) {
        self.lock.take();
        let unpinned = self.pool.unpin_page(self.page_id, false);
        debug_assert!(unpinned, "{} was not pinned", self.page_id);
    }
}

/// Guard for exclusive write access to a page.
///
/// The page is marked dirty and unpinned when the guard drops.
pub struct PageWriteGuard<'a, P: BufferPool + ?Sized> {
    pool: &'a P,
    page_id: PageId,
    frame_id: FrameId,
    /// `None` only while dropping.
    lock: Option<RwLockWriteGuard<'a, Page>>,
}

impl<'a, P: BufferPool + ?Sized> PageWriteGuard<'a, P> {
    pub(crate) fn new(pool: &'a P, page: PageRef<'a>) -> Self {
        Self {
            pool,
            page_id: page.page_id(),
            frame_id: page.frame_id(),
            lock: Some(page.frame().page_mut()),
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }
}

impl<P: BufferPool + ?Sized> Deref for PageWriteGuard<'_, P> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        self.lock.as_deref().expect("page guard used after release")
    }
}

impl<P: BufferPool + ?Sized> DerefMut for PageWriteGuard<'_, P> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Page {
        self.lock
            .as_deref_mut()
            .expect("page guard used after release")
    }
}

impl<P: BufferPool + ?Sized> Drop for PageWriteGuard<'_, P> {
    fn drop(&mut self) {
        self.lock.take();
        let unpinned = self.pool.unpin_page(self.page_id, true);
        debug_assert!(unpinned, "{} was not pinned", self.page_id);
    }
}
