//! LRU replacement policy.
//!
//! "Recently used" means "recently released": a frame's position is fixed
//! when it is unpinned, not when its page is read. The frame that has sat
//! unpinned the longest is evicted first.

use std::collections::HashMap;

use super::Replacer;
use crate::common::FrameId;

/// Neighbours of a frame in the eviction order.
#[derive(Debug, Clone, Copy)]
struct Link {
    prev: Option<FrameId>,
    next: Option<FrameId>,
}

/// Least-recently-unpinned eviction policy.
///
/// The evictable frames form a doubly linked list threaded through a hash
/// map, so membership tests, removal by id and victim selection are all O(1).
///
/// ```text
///   head (oldest)                         tail (newest)
///      │                                      │
///      ▼                                      ▼
///   [F1] ⇄ [F4] ⇄ [F2] ⇄ ... ⇄ [F7]
/// ```
///
/// # Example
/// ```
/// use shardpool::buffer::replacer::{LruReplacer, Replacer};
/// use shardpool::FrameId;
///
/// let mut replacer = LruReplacer::new(8);
/// replacer.unpin(FrameId::new(1));
/// replacer.unpin(FrameId::new(2));
/// assert_eq!(replacer.victim(), Some(FrameId::new(1)));
/// ```
#[derive(Debug, Default)]
pub struct LruReplacer {
    links: HashMap<FrameId, Link>,
    /// Oldest evictable frame.
    head: Option<FrameId>,
    /// Newest evictable frame.
    tail: Option<FrameId>,
}

impl LruReplacer {
    /// Create a replacer sized for `num_frames` frames.
    ///
    /// The count is a capacity hint; it is not enforced.
    pub fn new(num_frames: usize) -> Self {
        Self {
            links: HashMap::with_capacity(num_frames),
            head: None,
            tail: None,
        }
    }

    /// Whether `frame_id` is currently evictable.
    pub fn contains(&self, frame_id: FrameId) -> bool {
        self.links.contains_key(&frame_id)
    }

    /// Evictable frames from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = FrameId> + '_ {
        std::iter::successors(self.head, move |fid| {
            self.links.get(fid).and_then(|link| link.next)
        })
    }

    fn push_back(&mut self, frame_id: FrameId) {
        let link = Link {
            prev: self.tail,
            next: None,
        };
        match self.tail {
            Some(tail) => {
                if let Some(tail_link) = self.links.get_mut(&tail) {
                    tail_link.next = Some(frame_id);
                }
            }
            None => self.head = Some(frame_id),
        }
        self.tail = Some(frame_id);
        self.links.insert(frame_id, link);
    }

    fn unlink(&mut self, frame_id: FrameId) -> bool {
        let Some(link) = self.links.remove(&frame_id) else {
            return false;
        };

        match link.prev {
            Some(prev) => {
                if let Some(prev_link) = self.links.get_mut(&prev) {
                    prev_link.next = link.next;
                }
            }
            None => self.head = link.next,
        }
        match link.next {
            Some(next) => {
                if let Some(next_link) = self.links.get_mut(&next) {
                    next_link.prev = link.prev;
                }
            }
            None => self.tail = link.prev,
        }
        true
    }
}

impl Replacer for LruReplacer {
    fn victim(&mut self) -> Option<FrameId> {
        let frame_id = self.head?;
        self.unlink(frame_id);
        Some(frame_id)
    }

    fn pin(&mut self, frame_id: FrameId) {
        self.unlink(frame_id);
    }

    fn unpin(&mut self, frame_id: FrameId) {
        if !self.contains(frame_id) {
            self.push_back(frame_id);
        }
    }

    fn size(&self) -> usize {
        self.links.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fid(id: usize) -> FrameId {
        FrameId::new(id)
    }

    #[test]
    fn test_victim_in_unpin_order() {
        let mut replacer = LruReplacer::new(3);

        replacer.unpin(fid(1));
        replacer.unpin(fid(2));
        replacer.unpin(fid(3));
        assert_eq!(replacer.size(), 3);

        assert_eq!(replacer.victim(), Some(fid(1)));
        assert_eq!(replacer.victim(), Some(fid(2)));
        assert_eq!(replacer.victim(), Some(fid(3)));
        assert_eq!(replacer.victim(), None);
        assert_eq!(replacer.size(), 0);
    }

    #[test]
    fn test_empty_victim_does_not_mutate() {
        let mut replacer = LruReplacer::new(4);

        for _ in 0..3 {
            assert_eq!(replacer.victim(), None);
            assert_eq!(replacer.size(), 0);
        }

        replacer.unpin(fid(9));
        assert_eq!(replacer.victim(), Some(fid(9)));
    }

    #[test]
    fn test_duplicate_unpin_keeps_position() {
        let mut replacer = LruReplacer::new(3);

        replacer.unpin(fid(1));
        replacer.unpin(fid(2));
        replacer.unpin(fid(1)); // already evictable: no-op
        assert_eq!(replacer.size(), 2);

        assert_eq!(replacer.victim(), Some(fid(1)));
        assert_eq!(replacer.victim(), Some(fid(2)));
    }

    #[test]
    fn test_pin_removes_from_middle() {
        let mut replacer = LruReplacer::new(4);

        replacer.unpin(fid(1));
        replacer.unpin(fid(2));
        replacer.unpin(fid(3));

        replacer.pin(fid(2));
        assert_eq!(replacer.size(), 2);
        assert!(!replacer.contains(fid(2)));
        assert_eq!(replacer.iter().collect::<Vec<_>>(), vec![fid(1), fid(3)]);

        assert_eq!(replacer.victim(), Some(fid(1)));
        assert_eq!(replacer.victim(), Some(fid(3)));
        assert_eq!(replacer.victim(), None);
    }

    #[test]
    fn test_pin_head_and_tail() {
        let mut replacer = LruReplacer::new(4);

        replacer.unpin(fid(1));
        replacer.unpin(fid(2));
        replacer.unpin(fid(3));

        replacer.pin(fid(1));
        replacer.pin(fid(3));
        assert_eq!(replacer.iter().collect::<Vec<_>>(), vec![fid(2)]);

        // Appending after removing the tail must still link correctly
        replacer.unpin(fid(4));
        assert_eq!(replacer.iter().collect::<Vec<_>>(), vec![fid(2), fid(4)]);
    }

    #[test]
    fn test_pin_untracked_is_noop() {
        let mut replacer = LruReplacer::new(2);

        replacer.pin(fid(7));
        assert_eq!(replacer.size(), 0);

        replacer.unpin(fid(1));
        replacer.pin(fid(7));
        assert_eq!(replacer.size(), 1);
        assert_eq!(replacer.victim(), Some(fid(1)));
    }

    #[test]
    fn test_reunpin_moves_to_back() {
        let mut replacer = LruReplacer::new(3);

        replacer.unpin(fid(1));
        replacer.unpin(fid(2));
        replacer.unpin(fid(3));

        // Frame 1 is used again and then released: it is now the newest
        replacer.pin(fid(1));
        replacer.unpin(fid(1));

        assert_eq!(replacer.victim(), Some(fid(2)));
        assert_eq!(replacer.victim(), Some(fid(3)));
        assert_eq!(replacer.victim(), Some(fid(1)));
    }

    #[test]
    fn test_victim_untracks_frame() {
        let mut replacer = LruReplacer::new(2);

        replacer.unpin(fid(5));
        assert_eq!(replacer.victim(), Some(fid(5)));
        assert!(!replacer.contains(fid(5)));

        // Pinning a victimized frame is a no-op; unpinning re-tracks it
        replacer.pin(fid(5));
        replacer.unpin(fid(5));
        assert_eq!(replacer.size(), 1);
    }

    #[test]
    fn test_capacity_is_only_a_hint() {
        let mut replacer = LruReplacer::new(2);

        for i in 0..10 {
            replacer.unpin(fid(i));
        }
        assert_eq!(replacer.size(), 10);
        assert_eq!(replacer.victim(), Some(fid(0)));
    }
}
