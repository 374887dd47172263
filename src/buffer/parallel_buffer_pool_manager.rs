//! Parallel Buffer Pool Manager - the sharded front end.
//!
//! Splits the pool into independently latched shards so concurrent callers
//! contend on smaller locks. Existing pages are routed by
//! `page_id mod num_instances`; new pages are spread round-robin.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};

use super::page_guard::PageRef;
use super::pool::BufferPool;
use super::{BufferPoolInstance, StatsSnapshot};
use crate::common::{BufferPoolConfig, Error, PageId, Result};
use crate::recovery::LogManager;
use crate::storage::DiskManager;

/// A buffer pool made of `N` shards behind one [`BufferPool`] interface.
///
/// ```text
///                 ┌──────────────────────────────────┐
///   fetch/unpin/  │    ParallelBufferPoolManager     │   new_page
///   flush/delete  │                                  │   (round-robin
///   ─────────────▶│ page_id % N        start_index ──┼─◀ from cursor)
///                 └───┬──────────┬──────────┬────────┘
///                     ▼          ▼          ▼
///                 [shard 0]  [shard 1]  [shard 2]   each with its own
///                                                   latch + replacer
/// ```
///
/// The manager holds no page data and does no I/O. Its only mutable state
/// is `start_index`, advanced atomically on every allocation attempt
/// whether or not the attempt succeeds. Each call touches exactly one shard,
/// except `flush_all_pages` (every shard) and `new_page` (up to `N` shards
/// in rotation).
///
/// Generic over the shard type so any [`BufferPool`] can stand in for a
/// shard.
pub struct ParallelBufferPoolManager<P: BufferPool = BufferPoolInstance> {
    instances: Vec<P>,
    start_index: AtomicUsize,
}

impl ParallelBufferPoolManager {
    /// Build `config.num_instances` shards sharing `disk_manager` and
    /// `log_manager`, splitting `config.pool_size` frames across them.
    ///
    /// # Errors
    /// `Error::InvalidConfig` if the configuration leaves any shard without
    /// a frame.
    pub fn new(
        config: BufferPoolConfig,
        disk_manager: Arc<DiskManager>,
        log_manager: Option<Arc<LogManager>>,
    ) -> Result<Self> {
        config.validate()?;

        let instances = (0..config.num_instances)
            .map(|index| {
                BufferPoolInstance::new(
                    config.instance_pool_size(index),
                    config.num_instances,
                    index,
                    Arc::clone(&disk_manager),
                    log_manager.clone(),
                )
            })
            .collect();

        info!(
            "parallel buffer pool created: {} instances, {} frames",
            config.num_instances, config.pool_size
        );
        Self::from_instances(instances)
    }

    /// Sum of every shard's counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.instances
            .iter()
            .map(|instance| instance.stats().snapshot())
            .sum()
    }
}

impl<P: BufferPool> ParallelBufferPoolManager<P> {
    /// Take ownership of pre-built shards. Shard `i` must own the pages
    /// with `page_id % instances.len() == i`.
    pub fn from_instances(instances: Vec<P>) -> Result<Self> {
        if instances.is_empty() {
            return Err(Error::InvalidConfig("num_instances must be > 0".into()));
        }
        Ok(Self {
            instances,
            start_index: AtomicUsize::new(0),
        })
    }

    pub fn num_instances(&self) -> usize {
        self.instances.len()
    }

    /// Index of the shard that owns `page_id`.
    #[inline]
    pub fn instance_index_for(&self, page_id: PageId) -> usize {
        page_id.owner(self.instances.len())
    }

    pub fn instance(&self, index: usize) -> Option<&P> {
        self.instances.get(index)
    }

    #[inline]
    fn instance_for(&self, page_id: PageId) -> &P {
        &self.instances[self.instance_index_for(page_id)]
    }

    /// Claim the cursor's current shard and advance it, as one atomic step.
    fn next_start_index(&self) -> usize {
        let n = self.instances.len();
        match self
            .start_index
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % n))
        {
            Ok(index) | Err(index) => index,
        }
    }
}

impl<P: BufferPool> BufferPool for ParallelBufferPoolManager<P> {
    fn fetch_page(&self, page_id: PageId) -> Result<PageRef<'_>> {
        self.instance_for(page_id).fetch_page(page_id)
    }

    /// Try each shard once, starting at the cursor.
    ///
    /// # Errors
    /// `Error::BufferPoolFull` after `num_instances` refusals.
    fn new_page(&self) -> Result<PageRef<'_>> {
        for _ in 0..self.instances.len() {
            let index = self.next_start_index();
            match self.instances[index].new_page() {
                Ok(page) => {
                    debug!("new {} from instance {}", page.page_id(), index);
                    return Ok(page);
                }
                Err(Error::NoFreeFrames) => {
                    debug!("instance {} has no free frames", index);
                }
                Err(e) => {
                    warn!("instance {} refused new page: {}", index, e);
                }
            }
        }
        Err(Error::BufferPoolFull)
    }

    fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        self.instance_for(page_id).unpin_page(page_id, is_dirty)
    }

    fn flush_page(&self, page_id: PageId) -> Result<bool> {
        self.instance_for(page_id).flush_page(page_id)
    }

    fn delete_page(&self, page_id: PageId) -> bool {
        self.instance_for(page_id).delete_page(page_id)
    }

    /// Flush every shard, even after one fails. Returns the first failure.
    fn flush_all_pages(&self) -> Result<()> {
        let mut first_error = None;
        for (index, instance) in self.instances.iter().enumerate() {
            if let Err(e) = instance.flush_all_pages() {
                warn!("flushing instance {} failed: {}", index, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn pool_size(&self) -> usize {
        self.instances.iter().map(|instance| instance.pool_size()).sum()
    }
}
