//! Frame identifier type.

use std::fmt;

/// Identifies a frame within one shard of the buffer pool.
///
/// Frame ids are local to a shard: shard 0 and shard 1 both have a frame 0.
/// The replacer only ever sees these ids, never page contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub usize);

impl FrameId {
    #[inline]
    pub fn new(id: usize) -> Self {
        FrameId(id)
    }

    /// Position of the frame in its shard's frame array.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for FrameId {
    fn from(id: usize) -> Self {
        FrameId(id)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}
