//! Buffer pool statistics tracking.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-shard counters.
///
/// Counters are `Relaxed` atomics: each one only needs to be exact on its
/// own, never consistent with the others.
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    evictions: AtomicU64,
    pages_read: AtomicU64,
    pages_written: AtomicU64,
    pages_allocated: AtomicU64,
    pages_deleted: AtomicU64,
}

impl BufferPoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_read(&self) {
        self.pages_read.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_write(&self) {
        self.pages_written.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_allocation(&self) {
        self.pages_allocated.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_deletion(&self) {
        self.pages_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            pages_read: self.pages_read.load(Ordering::Relaxed),
            pages_written: self.pages_written.load(Ordering::Relaxed),
            pages_allocated: self.pages_allocated.load(Ordering::Relaxed),
            pages_deleted: self.pages_deleted.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`BufferPoolStats`].
///
/// Snapshots add up, so the sharded pool reports the sum over its shards.
///
/// # Example
/// ```
/// use shardpool::StatsSnapshot;
///
/// let a = StatsSnapshot { cache_hits: 3, ..Default::default() };
/// let b = StatsSnapshot { cache_hits: 1, cache_misses: 4, ..Default::default() };
/// let total: StatsSnapshot = [a, b].into_iter().sum();
/// assert_eq!(total.cache_hits, 4);
/// assert_eq!(total.cache_misses, 4);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
    pub pages_read: u64,
    pub pages_written: u64,
    pub pages_allocated: u64,
    pub pages_deleted: u64,
}

impl StatsSnapshot {
    /// Cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl Add for StatsSnapshot {
    type Output = StatsSnapshot;

    fn add(mut self, rhs: StatsSnapshot) -> StatsSnapshot {
        self += rhs;
        self
    }
}

impl AddAssign for StatsSnapshot {
    fn add_assign(&mut self, rhs: StatsSnapshot) {
        self.cache_hits += rhs.cache_hits;
        self.cache_misses += rhs.cache_misses;
        self.evictions += rhs.evictions;
        self.pages_read += rhs.pages_read;
        self.pages_written += rhs.pages_written;
        self.pages_allocated += rhs.pages_allocated;
        self.pages_deleted += rhs.pages_deleted;
    }
}

impl Sum for StatsSnapshot {
    fn sum<I: Iterator<Item = StatsSnapshot>>(iter: I) -> StatsSnapshot {
        iter.fold(StatsSnapshot::default(), Add::add)
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {}, allocated: {}, hit_rate: {:.2}% }}",
            self.cache_hits,
            self.cache_misses,
            self.evictions,
            self.pages_allocated,
            self.hit_rate() * 100.0
        )
    }
}
