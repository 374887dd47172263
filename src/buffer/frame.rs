//! Frame - a slot in a shard of the buffer pool.
//!
//! A frame is split in two:
//! - [`Frame`] holds the page bytes behind their own `RwLock`, so readers
//!   and writers of a pinned page never touch the shard latch.
//! - `FrameMeta` holds the bookkeeping (which page, pin count, dirty flag)
//!   and lives inside the shard's latched state.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{FrameId, PageId};
use crate::storage::page::Page;

/// Page storage for one frame.
pub struct Frame {
    id: FrameId,
    page: RwLock<Page>,
}

impl Frame {
    /// Create an empty (zeroed) frame.
    pub fn new(id: FrameId) -> Self {
        Self {
            id,
            page: RwLock::new(Page::new()),
        }
    }

    #[inline]
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Acquire read lock on the page.
    #[inline]
    pub fn page(&self) -> RwLockReadGuard<'_, Page> {
        self.page.read()
    }

    /// Acquire write lock on the page.
    #[inline]
    pub fn page_mut(&self) -> RwLockWriteGuard<'_, Page> {
        self.page.write()
    }
}

/// Bookkeeping for one frame. Only touched under the shard latch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FrameMeta {
    /// Page currently loaded, or `None` if the frame is free.
    pub page_id: Option<PageId>,
    pub pin_count: u32,
    pub is_dirty: bool,
}

impl FrameMeta {
    /// Load `page_id` into this frame with one pin and a clean page.
    pub fn load(&mut self, page_id: PageId) {
        *self = FrameMeta {
            page_id: Some(page_id),
            pin_count: 1,
            is_dirty: false,
        };
    }

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub fn pin(&mut self) -> u32 {
        self.pin_count += 1;
        self.pin_count
    }

    /// Decrement the pin count. Returns the new count, or `None` if the frame
    /// was not pinned.
    #[inline]
    pub fn unpin(&mut self) -> Option<u32> {
        self.pin_count = self.pin_count.checked_sub(1)?;
        Some(self.pin_count)
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.is_dirty = false;
    }

    /// Return to the free state.
    #[inline]
    pub fn reset(&mut self) {
        *self = FrameMeta::default();
    }
}
