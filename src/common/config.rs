//! Configuration for the buffer pool.

use crate::common::{Error, Result};

/// Size of a page in bytes (4KB).
///
/// Pages are aligned to 4096 bytes for efficient Direct I/O (O_DIRECT).
pub const PAGE_SIZE: usize = 4096;

/// Default number of independently latched shards.
pub const DEFAULT_NUM_INSTANCES: usize = 4;

/// Default total number of frames across all shards.
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Construction-time settings for a [`ParallelBufferPoolManager`].
///
/// `pool_size` is the total frame budget. It is split evenly across the
/// shards; when it does not divide, the lowest-indexed shards get one extra
/// frame each.
///
/// # Example
/// ```
/// use shardpool::BufferPoolConfig;
///
/// let config = BufferPoolConfig::new(3, 10);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.instance_pool_size(0), 4);
/// assert_eq!(config.instance_pool_size(2), 3);
/// ```
///
/// [`ParallelBufferPoolManager`]: crate::buffer::ParallelBufferPoolManager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of shards.
    pub num_instances: usize,

    /// Total number of frames across all shards.
    pub pool_size: usize,
}

impl BufferPoolConfig {
    pub fn new(num_instances: usize, pool_size: usize) -> Self {
        Self {
            num_instances,
            pool_size,
        }
    }

    /// Check that every shard ends up with at least one frame.
    pub fn validate(&self) -> Result<()> {
        if self.num_instances == 0 {
            return Err(Error::InvalidConfig("num_instances must be > 0".into()));
        }
        if self.pool_size < self.num_instances {
            return Err(Error::InvalidConfig(format!(
                "pool_size ({}) must be >= num_instances ({})",
                self.pool_size, self.num_instances
            )));
        }
        Ok(())
    }

    /// Number of frames owned by the shard at `index`.
    pub fn instance_pool_size(&self, index: usize) -> usize {
        let base = self.pool_size / self.num_instances;
        let extra = self.pool_size % self.num_instances;
        if index < extra {
            base + 1
        } else {
            base
        }
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_INSTANCES, DEFAULT_POOL_SIZE)
    }
}
