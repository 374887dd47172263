//! Eviction policy implementations (replacers).
//!
//! A replacer only tracks frames that are currently *evictable*. The owning
//! shard tells it when a frame becomes pinned or unpinned and asks it for a
//! victim when the free list is empty. Replacers never fail: "nothing to
//! evict" is `None`.
//!
//! Implementations:
//! - [`LruReplacer`] - evicts the frame that has been unpinned the longest

mod lru;

pub use lru::LruReplacer;

use crate::common::FrameId;

/// Victim-selection policy for one shard.
///
/// Callers hold the shard latch around every call, so implementations need
/// no internal synchronization.
pub trait Replacer: Send {
    /// Remove and return the next frame to evict, if any.
    fn victim(&mut self) -> Option<FrameId>;

    /// The frame is in use. No-op if it is not currently evictable.
    fn pin(&mut self, frame_id: FrameId);

    /// The frame is no longer in use. No-op if it is already evictable.
    fn unpin(&mut self, frame_id: FrameId);

    /// Number of evictable frames.
    fn size(&self) -> usize;
}
