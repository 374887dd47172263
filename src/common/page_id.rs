//! Page identifier type.

use std::fmt;

/// Identifies a page on disk, globally across every shard.
///
/// A page is owned by shard `page_id mod num_instances` for its whole life,
/// so each shard mints ids from its own residue class:
/// `index, index + n, index + 2n, ...`.
///
/// # Example
/// ```
/// use shardpool::PageId;
///
/// let page_id = PageId::new(7);
/// assert_eq!(page_id.owner(3), 1);
/// assert_eq!(page_id.advance(3), Some(PageId::new(10)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Sentinel for "no page". Never minted by a shard.
    pub const INVALID: PageId = PageId(u32::MAX);

    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Index of the shard that owns this page.
    #[inline]
    pub fn owner(&self, num_instances: usize) -> usize {
        self.0 as usize % num_instances
    }

    /// The next id in the same residue class, or `None` once the id space
    /// (minus the sentinel) is exhausted.
    #[inline]
    pub fn advance(&self, num_instances: usize) -> Option<PageId> {
        let step = u32::try_from(num_instances).ok()?;
        self.0
            .checked_add(step)
            .map(PageId)
            .filter(PageId::is_valid)
    }

    /// Smallest id `>= floor` owned by shard `index`.
    pub fn first_owned_from(floor: u32, index: usize, num_instances: usize) -> Option<PageId> {
        let n = u64::try_from(num_instances).ok()?;
        let index = index as u64;
        let floor = floor as u64;
        let base = floor - floor % n + index;
        let id = if base < floor { base + n } else { base };
        u32::try_from(id).ok().map(PageId).filter(PageId::is_valid)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}
