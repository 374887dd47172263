//! shardpool - a sharded buffer pool for a disk-backed storage engine.
//!
//! # Architecture
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                ParallelBufferPoolManager                  │
//! │   page_id % N routing  ·  round-robin new_page cursor     │
//! └─────────────┬──────────────────┬──────────────────┬───────┘
//!               ▼                  ▼                  ▼
//!      ┌────────────────┐ ┌────────────────┐ ┌────────────────┐
//!      │  Instance 0    │ │  Instance 1    │ │  Instance N-1  │
//!      │  page table    │ │  page table    │ │  page table    │
//!      │  free list     │ │  free list     │ │  free list     │
//!      │  LruReplacer   │ │  LruReplacer   │ │  LruReplacer   │
//!      └───────┬────────┘ └───────┬────────┘ └───────┬────────┘
//!              └──────────────────┼──────────────────┘
//!                                 ▼
//!              DiskManager (shared) · LogManager (shared)
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, Error, config)
//! - [`buffer`] - Shards, the sharded front end, and eviction policies
//! - [`storage`] - Disk I/O and the page container
//! - [`recovery`] - Write-ahead log handle
//!
//! # Quick Start
//! ```no_run
//! use std::sync::Arc;
//! use shardpool::{BufferPool, BufferPoolConfig, DiskManager, ParallelBufferPoolManager};
//!
//! let dm = Arc::new(DiskManager::create("my_database.db").unwrap());
//! let pool = ParallelBufferPoolManager::new(BufferPoolConfig::new(4, 64), dm, None).unwrap();
//!
//! let page = pool.new_page().unwrap();
//! page.write().as_mut_slice()[0] = 0xAB;
//! pool.unpin_page(page.page_id(), true);
//! ```

pub mod buffer;
pub mod common;
pub mod recovery;
pub mod storage;

pub use common::config::PAGE_SIZE;
pub use common::{BufferPoolConfig, Error, FrameId, PageId, Result};

pub use buffer::{
    BufferPool, BufferPoolInstance, BufferPoolStats, PageRef, ParallelBufferPoolManager,
    StatsSnapshot,
};
pub use recovery::LogManager;
pub use storage::page::Page;
pub use storage::DiskManager;
