//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache between the storage layer and the
//! layers above it. It is split into shards, each managing a fixed set of
//! frames with its own latch and replacer.
//!
//! # Components
//! - [`BufferPool`] - The contract shared by a shard and the sharded pool
//! - [`ParallelBufferPoolManager`] - Routes pages to shards, spreads new pages round-robin
//! - [`BufferPoolInstance`] - One shard: page table, free list, replacer
//! - [`PageRef`] / [`PageReadGuard`] / [`PageWriteGuard`] - Handles to pinned pages
//! - [`BufferPoolStats`] - Performance statistics
//! - [`replacer`] - Eviction policy implementations

mod buffer_pool_instance;
mod frame;
mod page_guard;
mod parallel_buffer_pool_manager;
mod pool;
pub mod replacer;
mod stats;

pub use buffer_pool_instance::BufferPoolInstance;
pub use frame::Frame;
pub use page_guard::{PageReadGuard, PageRef, PageWriteGuard};
pub use parallel_buffer_pool_manager::ParallelBufferPoolManager;
pub use pool::BufferPool;
pub use stats::{BufferPoolStats, StatsSnapshot};
