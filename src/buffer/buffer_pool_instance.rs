//! Buffer Pool Instance - one independently latched shard of the pool.
//!
//! A [`BufferPoolInstance`] provides:
//! - Page caching between disk and memory
//! - Pin-based reference counting
//! - Dirty page write-back on eviction (log flushed first)
//! - Page ids minted from its own residue class, so the sharded pool can
//!   route any page back to the shard that created it

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;

use super::frame::{Frame, FrameMeta};
use super::page_guard::PageRef;
use super::pool::BufferPool;
use super::replacer::{LruReplacer, Replacer};
use super::BufferPoolStats;
use crate::common::{Error, FrameId, PageId, Result};
use crate::recovery::LogManager;
use crate::storage::DiskManager;

/// One shard of the buffer pool.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                   BufferPoolInstance                        │
/// │  state: Mutex<InstanceState>                                │
/// │  ┌──────────────┐ ┌──────────────┐ ┌────────────────────┐   │
/// │  │ page_table   │ │  free_list   │ │ meta: Vec<FrameMeta│   │
/// │  │PageId → Fid  │ │ Vec<FrameId> │ │ page/pin/dirty     │   │
/// │  └──────────────┘ └──────────────┘ └────────────────────┘   │
/// │  ┌──────────────┐ ┌──────────────┐                          │
/// │  │   replacer   │ │ next_page_id │                          │
/// │  └──────────────┘ └──────────────┘                          │
/// │  frames: Vec<Frame>   (page bytes, one RwLock each)         │
/// │  disk_manager / log_manager: shared with other shards       │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - `state`: one `Mutex` (the shard latch) around all bookkeeping,
///   including the replacer
/// - `frames`: no latch - each frame's bytes have their own `RwLock`
/// - `stats`: no lock - all atomic counters
///
/// Lock order is shard latch, then page lock, and only for frames nobody
/// has pinned: loading a page into a free frame and writing back an
/// eviction victim happen under the latch. Flushes pin their frames, drop
/// the latch and only then wait for the page lock, so a caller may hold a
/// page's write lock while it fetches more pages from the same shard.
pub struct BufferPoolInstance<R: Replacer = LruReplacer> {
    frames: Vec<Frame>,
    state: Mutex<InstanceState<R>>,
    disk_manager: Arc<DiskManager>,
    log_manager: Option<Arc<LogManager>>,
    stats: BufferPoolStats,
    pool_size: usize,
    num_instances: usize,
    instance_index: usize,
}

struct InstanceState<R> {
    page_table: HashMap<PageId, FrameId>,
    /// Stack of free frames (LIFO).
    free_list: Vec<FrameId>,
    meta: Vec<FrameMeta>,
    replacer: R,
    /// `None` once this shard's id space is exhausted.
    next_page_id: Option<PageId>,
}

impl<R: Replacer> InstanceState<R> {
    /// Whether this shard has handed out `page_id` (or found it on disk when
    /// it opened). Owned ids past `next_page_id` are unallocated even if the
    /// shared file has grown beyond them.
    fn is_minted(&self, page_id: PageId) -> bool {
        match self.next_page_id {
            Some(next) => page_id < next,
            None => true,
        }
    }

    /// Pin a resident frame for a flush and clear its dirty flag. The pin
    /// keeps it from being evicted or deleted once the latch is dropped;
    /// anyone who writes meanwhile marks it dirty again when they unpin.
    fn hold_for_flush(&mut self, frame_id: FrameId) {
        let meta = &mut self.meta[frame_id.index()];
        meta.pin();
        meta.clear_dirty();
        self.replacer.pin(frame_id);
    }

    /// Undo [`hold_for_flush`](Self::hold_for_flush). A failed write leaves
    /// the page dirty.
    fn release_after_flush(&mut self, frame_id: FrameId, failed: bool) {
        let meta = &mut self.meta[frame_id.index()];
        if failed {
            meta.mark_dirty();
        }
        if meta.unpin() == Some(0) {
            // Re-enters the LRU order at the newest end
            self.replacer.unpin(frame_id);
        }
    }
}

impl BufferPoolInstance {
    /// Create a shard with the LRU replacement policy.
    ///
    /// # Arguments
    /// * `pool_size` - Number of frames in this shard
    /// * `num_instances` - Number of shards in the whole pool
    /// * `instance_index` - Index of this shard, `< num_instances`
    ///
    /// # Panics
    /// Panics if `pool_size` is 0 or `instance_index >= num_instances`.
    pub fn new(
        pool_size: usize,
        num_instances: usize,
        instance_index: usize,
        disk_manager: Arc<DiskManager>,
        log_manager: Option<Arc<LogManager>>,
    ) -> Self {
        Self::with_replacer(
            pool_size,
            num_instances,
            instance_index,
            disk_manager,
            log_manager,
            LruReplacer::new(pool_size),
        )
    }

    /// Create a standalone pool that owns every page id.
    pub fn single(pool_size: usize, disk_manager: Arc<DiskManager>) -> Self {
        Self::new(pool_size, 1, 0, disk_manager, None)
    }
}

impl<R: Replacer> BufferPoolInstance<R> {
    /// Create a shard with a caller-supplied replacement policy.
    pub fn with_replacer(
        pool_size: usize,
        num_instances: usize,
        instance_index: usize,
        disk_manager: Arc<DiskManager>,
        log_manager: Option<Arc<LogManager>>,
        replacer: R,
    ) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");
        assert!(
            instance_index < num_instances,
            "instance_index ({}) must be < num_instances ({})",
            instance_index,
            num_instances
        );

        let frames = (0..pool_size).map(|i| Frame::new(FrameId::new(i))).collect();
        // Reversed so frame 0 is handed out first
        let free_list = (0..pool_size).rev().map(FrameId::new).collect();

        // Pages already on disk keep their ids; new ones start past them
        let next_page_id =
            PageId::first_owned_from(disk_manager.page_count(), instance_index, num_instances);

        info!(
            "buffer pool instance {}/{} created with {} frames, next page {:?}",
            instance_index, num_instances, pool_size, next_page_id
        );

        Self {
            frames,
            state: Mutex::new(InstanceState {
                page_table: HashMap::with_capacity(pool_size),
                free_list,
                meta: vec![FrameMeta::default(); pool_size],
                replacer,
                next_page_id,
            }),
            disk_manager,
            log_manager,
            stats: BufferPoolStats::new(),
            pool_size,
            num_instances,
            instance_index,
        }
    }

    // ========================================================================
    // Public API: Info
    // ========================================================================

    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    pub fn instance_index(&self) -> usize {
        self.instance_index
    }

    pub fn num_instances(&self) -> usize {
        self.num_instances
    }

    /// Get the number of free frames.
    pub fn free_frame_count(&self) -> usize {
        self.state.lock().free_list.len()
    }

    /// Get the number of pages in this shard.
    pub fn page_count(&self) -> usize {
        self.state.lock().page_table.len()
    }

    /// Number of resident, unpinned frames.
    pub fn evictable_count(&self) -> usize {
        self.state.lock().replacer.size()
    }

    /// Pin count of a resident page, or `None` if it is not resident.
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let state = self.state.lock();
        let fid = state.page_table.get(&page_id)?;
        Some(state.meta[fid.index()].pin_count)
    }

    /// Dirty flag of a resident page, or `None` if it is not resident.
    pub fn is_dirty(&self, page_id: PageId) -> Option<bool> {
        let state = self.state.lock();
        let fid = state.page_table.get(&page_id)?;
        Some(state.meta[fid.index()].is_dirty)
    }

    /// Whether this shard mints and serves `page_id`.
    #[inline]
    pub fn owns(&self, page_id: PageId) -> bool {
        page_id.is_valid() && page_id.owner(self.num_instances) == self.instance_index
    }

    // ========================================================================
    // Internal: Frame allocation and eviction
    // ========================================================================

    /// Get a free frame, evicting if necessary.
    ///
    /// The returned frame has reset metadata and is in neither the page
    /// table nor the replacer.
    fn acquire_frame(&self, state: &mut InstanceState<R>) -> Result<FrameId> {
        if let Some(frame_id) = state.free_list.pop() {
            return Ok(frame_id);
        }

        let frame_id = state.replacer.victim().ok_or(Error::NoFreeFrames)?;
        let FrameMeta {
            page_id, is_dirty, ..
        } = state.meta[frame_id.index()];

        if let Some(old_page_id) = page_id {
            if is_dirty {
                if let Err(e) = self.write_back(frame_id, old_page_id) {
                    // Still resident and still dirty. It becomes evictable
                    // again as the newest entry, not at its old position.
                    state.replacer.unpin(frame_id);
                    return Err(e);
                }
            }
            state.page_table.remove(&old_page_id);
            debug!(
                "instance {} evicted {} from {}",
                self.instance_index, old_page_id, frame_id
            );
        }

        state.meta[frame_id.index()].reset();
        self.stats.record_eviction();
        Ok(frame_id)
    }

    /// Write a frame's page to disk, flushing the log first.
    ///
    /// Takes the page's read lock. Callers either hold the frame pinned and
    /// not the latch, or hold the latch over an unpinned frame.
    fn write_back(&self, frame_id: FrameId, page_id: PageId) -> Result<()> {
        if let Some(log_manager) = &self.log_manager {
            log_manager.flush()?;
        }

        let page = self.frames[frame_id.index()].page();
        self.disk_manager.write_page(page_id, &page)?;
        self.stats.record_write();
        Ok(())
    }

    /// Register a freshly filled frame as resident and pinned.
    fn install(&self, state: &mut InstanceState<R>, frame_id: FrameId, page_id: PageId) -> PageRef<'_> {
        state.meta[frame_id.index()].load(page_id);
        state.page_table.insert(page_id, frame_id);
        state.replacer.pin(frame_id);
        PageRef::new(page_id, &self.frames[frame_id.index()])
    }
}

impl<R: Replacer> BufferPool for BufferPoolInstance<R> {
    fn fetch_page(&self, page_id: PageId) -> Result<PageRef<'_>> {
        if !self.owns(page_id) {
            return Err(Error::InvalidPageId(page_id.0));
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;

        // Fast path: already resident
        if let Some(&frame_id) = state.page_table.get(&page_id) {
            state.meta[frame_id.index()].pin();
            state.replacer.pin(frame_id);
            self.stats.record_hit();
            return Ok(PageRef::new(page_id, &self.frames[frame_id.index()]));
        }

        if !state.is_minted(page_id) {
            return Err(Error::PageNotFound(page_id.0));
        }

        self.stats.record_miss();
        let frame_id = self.acquire_frame(state)?;

        let read = self
            .disk_manager
            .read_page(page_id, &mut self.frames[frame_id.index()].page_mut());
        if let Err(e) = read {
            state.free_list.push(frame_id);
            return Err(e);
        }
        self.stats.record_read();

        Ok(self.install(state, frame_id, page_id))
    }

    fn new_page(&self) -> Result<PageRef<'_>> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        // Take a frame before minting an id so a refusal burns no page id
        let frame_id = self.acquire_frame(state)?;

        let Some(page_id) = state.next_page_id else {
            state.free_list.push(frame_id);
            return Err(Error::InvalidPageId(PageId::INVALID.0));
        };
        if let Err(e) = self.disk_manager.allocate_page(page_id) {
            state.free_list.push(frame_id);
            return Err(e);
        }
        state.next_page_id = page_id.advance(self.num_instances);

        self.frames[frame_id.index()].page_mut().reset();
        self.stats.record_allocation();
        debug!(
            "instance {} allocated {} in {}",
            self.instance_index, page_id, frame_id
        );

        Ok(self.install(state, frame_id, page_id))
    }

    fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return false;
        };
        let meta = &mut state.meta[frame_id.index()];
        let Some(remaining) = meta.unpin() else {
            return false;
        };

        if is_dirty {
            meta.mark_dirty();
        }
        if remaining == 0 {
            state.replacer.unpin(frame_id);
        }
        true
    }

    fn flush_page(&self, page_id: PageId) -> Result<bool> {
        let frame_id = {
            let mut state = self.state.lock();
            let Some(&frame_id) = state.page_table.get(&page_id) else {
                return Ok(false);
            };
            state.hold_for_flush(frame_id);
            frame_id
        };

        let result = self.write_back(frame_id, page_id);
        self.state
            .lock()
            .release_after_flush(frame_id, result.is_err());
        result.map(|()| true)
    }

    fn delete_page(&self, page_id: PageId) -> bool {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return false;
        };
        if state.meta[frame_id.index()].is_pinned() {
            return false;
        }

        state.page_table.remove(&page_id);
        state.replacer.pin(frame_id);
        state.meta[frame_id.index()].reset();
        self.frames[frame_id.index()].page_mut().reset();
        state.free_list.push(frame_id);

        self.stats.record_deletion();
        debug!(
            "instance {} deleted {} from {}",
            self.instance_index, page_id, frame_id
        );
        true
    }

    /// Writes every dirty page even after one write fails, and returns the
    /// first failure.
    fn flush_all_pages(&self) -> Result<()> {
        let dirty: Vec<(PageId, FrameId)> = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let dirty: Vec<_> = state
                .page_table
                .iter()
                .filter(|(_, frame_id)| state.meta[frame_id.index()].is_dirty)
                .map(|(&page_id, &frame_id)| (page_id, frame_id))
                .collect();
            for &(_, frame_id) in &dirty {
                state.hold_for_flush(frame_id);
            }
            dirty
        };

        let results: Vec<(FrameId, Result<()>)> = dirty
            .into_iter()
            .map(|(page_id, frame_id)| (frame_id, self.write_back(frame_id, page_id)))
            .collect();

        let mut state = self.state.lock();
        let mut first_error = None;
        for (frame_id, result) in results {
            state.release_after_flush(frame_id, result.is_err());
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn pool_size(&self) -> usize {
        self.pool_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    /// Helper to create a shard with a temporary database file.
    fn create_instance(
        pool_size: usize,
        num_instances: usize,
        instance_index: usize,
    ) -> (BufferPoolInstance, TempDir) {
        let dir = tempdir().unwrap();
        let dm = Arc::new(DiskManager::create(dir.path().join("test.db")).unwrap());
        (
            BufferPoolInstance::new(pool_size, num_instances, instance_index, dm, None),
            dir,
        )
    }

    #[test]
    fn test_new_page_ids_follow_residue_class() {
        let (bpi, _dir) = create_instance(10, 3, 1);

        let mut ids = vec![];
        for _ in 0..4 {
            let page = bpi.new_page().unwrap();
            ids.push(page.page_id());
            assert!(bpi.unpin_page(page.page_id(), false));
        }
        assert_eq!(
            ids,
            vec![PageId::new(1), PageId::new(4), PageId::new(7), PageId::new(10)]
        );
    }

    #[test]
    fn test_new_page_is_pinned_and_zeroed() {
        let (bpi, _dir) = create_instance(4, 1, 0);

        let page = bpi.new_page().unwrap();
        assert!(page.read().is_zeroed());
        assert_eq!(bpi.pin_count(page.page_id()), Some(1));
        assert_eq!(bpi.evictable_count(), 0);
        assert_eq!(bpi.free_frame_count(), 3);
    }

    #[test]
    fn test_fetch_hit_increments_pin() {
        let (bpi, _dir) = create_instance(4, 1, 0);

        let pid = bpi.new_page().unwrap().page_id();
        bpi.fetch_page(pid).unwrap();
        assert_eq!(bpi.pin_count(pid), Some(2));

        assert!(bpi.unpin_page(pid, false));
        assert!(bpi.unpin_page(pid, false));
        assert_eq!(bpi.pin_count(pid), Some(0));
        assert_eq!(bpi.evictable_count(), 1);

        // Already at zero
        assert!(!bpi.unpin_page(pid, false));

        let snapshot = bpi.stats().snapshot();
        assert_eq!(snapshot.cache_hits, 1);
    }

    #[test]
    fn test_unpin_unknown_page() {
        let (bpi, _dir) = create_instance(4, 1, 0);
        assert!(!bpi.unpin_page(PageId::new(99), true));
    }

    #[test]
    fn test_dirty_flag_is_sticky() {
        let (bpi, _dir) = create_instance(4, 1, 0);

        let pid = bpi.new_page().unwrap().page_id();
        bpi.fetch_page(pid).unwrap();

        assert!(bpi.unpin_page(pid, true));
        assert!(bpi.unpin_page(pid, false));
        assert_eq!(bpi.is_dirty(pid), Some(true));
    }

    #[test]
    fn test_eviction_writes_back_dirty_page() {
        let (bpi, _dir) = create_instance(1, 1, 0);

        let first = bpi.new_page().unwrap();
        let pid0 = first.page_id();
        first.write().as_mut_slice()[0] = 0x42;
        assert!(bpi.unpin_page(pid0, true));

        // Only one frame: allocating evicts page 0
        let pid1 = bpi.new_page().unwrap().page_id();
        assert!(bpi.pin_count(pid0).is_none());
        assert!(bpi.unpin_page(pid1, false));

        let page = bpi.fetch_page(pid0).unwrap();
        assert_eq!(page.read().as_slice()[0], 0x42);

        let snapshot = bpi.stats().snapshot();
        assert_eq!(snapshot.evictions, 2);
        assert_eq!(snapshot.pages_written, 1);
        assert_eq!(snapshot.pages_read, 1);
    }

    #[test]
    fn test_eviction_order_is_unpin_order() {
        let (bpi, _dir) = create_instance(3, 1, 0);

        let pids: Vec<PageId> = (0..3).map(|_| bpi.new_page().unwrap().page_id()).collect();
        // Release in reverse: page 2 has been unpinned the longest
        for &pid in pids.iter().rev() {
            assert!(bpi.unpin_page(pid, false));
        }

        let _new = bpi.new_page().unwrap();
        assert!(bpi.pin_count(pids[2]).is_none());
        assert!(bpi.pin_count(pids[0]).is_some());
        assert!(bpi.pin_count(pids[1]).is_some());
    }

    #[test]
    fn test_no_free_frames() {
        let (bpi, _dir) = create_instance(2, 1, 0);

        let evicted = bpi.new_page().unwrap().page_id();
        assert!(bpi.unpin_page(evicted, false));
        let _a = bpi.new_page().unwrap();
        let _b = bpi.new_page().unwrap();
        assert!(bpi.pin_count(evicted).is_none());

        assert!(matches!(bpi.new_page(), Err(Error::NoFreeFrames)));
        assert!(matches!(bpi.fetch_page(evicted), Err(Error::NoFreeFrames)));
    }

    #[test]
    fn test_refused_allocation_burns_no_page_id() {
        let (bpi, _dir) = create_instance(1, 2, 0);

        let pid = bpi.new_page().unwrap().page_id();
        assert_eq!(pid, PageId::new(0));
        assert!(bpi.new_page().is_err());

        assert!(bpi.unpin_page(pid, false));
        assert_eq!(bpi.new_page().unwrap().page_id(), PageId::new(2));
    }

    #[test]
    fn test_fetch_missing_page_returns_frame() {
        let (bpi, _dir) = create_instance(2, 1, 0);

        assert!(matches!(
            bpi.fetch_page(PageId::new(999)),
            Err(Error::PageNotFound(999))
        ));
        assert_eq!(bpi.free_frame_count(), 2);
        assert_eq!(bpi.page_count(), 0);
    }

    #[test]
    fn test_fetch_unminted_page_is_not_found() {
        let dir = tempdir().unwrap();
        let dm = Arc::new(DiskManager::create(dir.path().join("test.db")).unwrap());
        let bpi = BufferPoolInstance::new(4, 2, 0, Arc::clone(&dm), None);

        // Another shard grew the file past ids this one has not handed out
        dm.allocate_page(PageId::new(5)).unwrap();
        let pid = bpi.new_page().unwrap().page_id();
        assert_eq!(pid, PageId::new(0));
        assert!(bpi.unpin_page(pid, false));

        assert!(matches!(
            bpi.fetch_page(PageId::new(2)),
            Err(Error::PageNotFound(2))
        ));
        assert_eq!(bpi.free_frame_count(), 3);
        assert_eq!(bpi.stats().snapshot().cache_misses, 0);

        // The id is still available, and comes back zeroed
        let page = bpi.new_page().unwrap();
        assert_eq!(page.page_id(), PageId::new(2));
        assert!(page.read().is_zeroed());
    }

    #[test]
    fn test_flush_keeps_concurrent_dirty_mark() {
        let (bpi, _dir) = create_instance(4, 1, 0);

        let page = bpi.new_page().unwrap();
        let pid = page.page_id();
        page.write().as_mut_slice()[0] = 1;

        // Flushing a pinned page pins it once more for the write, then drops
        // that pin again
        assert!(bpi.flush_page(pid).unwrap());
        assert_eq!(bpi.pin_count(pid), Some(1));
        assert_eq!(bpi.is_dirty(pid), Some(false));

        // A writer that unpins dirty after the flush keeps the page dirty
        assert!(bpi.unpin_page(pid, true));
        assert_eq!(bpi.is_dirty(pid), Some(true));
        assert_eq!(bpi.evictable_count(), 1);
    }

    #[test]
    fn test_flushed_frame_rejoins_lru_at_newest_end() {
        let (bpi, _dir) = create_instance(3, 1, 0);

        let pids: Vec<PageId> = (0..3)
            .map(|_| {
                let pid = bpi.new_page().unwrap().page_id();
                assert!(bpi.unpin_page(pid, true));
                pid
            })
            .collect();

        // The flush pins page 0 for the write; on release it is the newest
        assert!(bpi.flush_page(pids[0]).unwrap());
        let _new = bpi.new_page().unwrap();
        assert!(bpi.pin_count(pids[1]).is_none());
        assert!(bpi.pin_count(pids[0]).is_some());
        assert!(bpi.pin_count(pids[2]).is_some());
    }

    #[test]
    fn test_flush_all_unpins_held_frames() {
        let (bpi, _dir) = create_instance(4, 1, 0);

        let pids: Vec<PageId> = (0..3)
            .map(|_| {
                let pid = bpi.new_page().unwrap().page_id();
                assert!(bpi.unpin_page(pid, true));
                pid
            })
            .collect();

        bpi.flush_all_pages().unwrap();
        for &pid in &pids {
            assert_eq!(bpi.pin_count(pid), Some(0));
            assert_eq!(bpi.is_dirty(pid), Some(false));
        }
        assert_eq!(bpi.evictable_count(), 3);
        assert!(bpi.delete_page(pids[1]));
    }

    #[test]
    fn test_fetch_page_owned_by_other_instance() {
        let (bpi, _dir) = create_instance(2, 3, 0);

        assert!(matches!(
            bpi.fetch_page(PageId::new(4)),
            Err(Error::InvalidPageId(4))
        ));
        assert!(matches!(
            bpi.fetch_page(PageId::INVALID),
            Err(Error::InvalidPageId(_))
        ));
    }

    #[test]
    fn test_delete_page() {
        let (bpi, _dir) = create_instance(4, 1, 0);

        let pid = bpi.new_page().unwrap().page_id();
        // Pinned: refused
        assert!(!bpi.delete_page(pid));

        assert!(bpi.unpin_page(pid, true));
        assert!(bpi.delete_page(pid));
        assert_eq!(bpi.page_count(), 0);
        assert_eq!(bpi.free_frame_count(), 4);
        assert_eq!(bpi.evictable_count(), 0);

        // Gone: refused
        assert!(!bpi.delete_page(pid));
    }

    #[test]
    fn test_flush_page() {
        let (bpi, _dir) = create_instance(4, 1, 0);

        let page = bpi.new_page().unwrap();
        let pid = page.page_id();
        page.write().as_mut_slice()[0] = 0xFF;
        assert!(bpi.unpin_page(pid, true));

        assert!(bpi.flush_page(pid).unwrap());
        assert_eq!(bpi.is_dirty(pid), Some(false));
        assert!(!bpi.flush_page(PageId::new(77)).unwrap());
    }

    #[test]
    fn test_flush_all_pages_only_writes_dirty() {
        let (bpi, _dir) = create_instance(8, 1, 0);

        for i in 0..5 {
            let page = bpi.new_page().unwrap();
            let pid = page.page_id();
            page.write().as_mut_slice()[0] = i;
            assert!(bpi.unpin_page(pid, i % 2 == 0));
        }

        bpi.flush_all_pages().unwrap();
        assert_eq!(bpi.stats().snapshot().pages_written, 3);

        // Everything clean now
        bpi.flush_all_pages().unwrap();
        assert_eq!(bpi.stats().snapshot().pages_written, 3);
    }

    #[test]
    fn test_write_back_flushes_log_first() {
        let dir = tempdir().unwrap();
        let dm = Arc::new(DiskManager::create(dir.path().join("test.db")).unwrap());
        let log = Arc::new(LogManager::open(dir.path().join("wal.log")).unwrap());
        let bpi = BufferPoolInstance::new(4, 1, 0, dm, Some(Arc::clone(&log)));

        let pid = bpi.new_page().unwrap().page_id();
        log.append(b"update page 0");
        assert!(bpi.unpin_page(pid, true));
        assert_eq!(log.persistent_lsn(), None);

        assert!(bpi.flush_page(pid).unwrap());
        assert_eq!(log.persistent_lsn(), Some(0));
    }

    #[test]
    fn test_reopen_continues_page_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let dm = Arc::new(DiskManager::create(&path).unwrap());
            let bpi = BufferPoolInstance::single(4, dm);
            for _ in 0..3 {
                let pid = bpi.new_page().unwrap().page_id();
                assert!(bpi.unpin_page(pid, false));
            }
        }

        let dm = Arc::new(DiskManager::open(&path).unwrap());
        let bpi = BufferPoolInstance::single(4, dm);
        assert_eq!(bpi.new_page().unwrap().page_id(), PageId::new(3));
    }

    #[test]
    #[should_panic(expected = "pool_size must be > 0")]
    fn test_zero_pool_size_panics() {
        let _ = create_instance(0, 1, 0);
    }
}
