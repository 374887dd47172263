//! Storage layer - disk I/O and the page container.
//!
//! - [`DiskManager`] - Page-granular file I/O shared by every shard
//! - [`page`] - The raw page type

mod disk_manager;
pub mod page;

pub use disk_manager::DiskManager;
