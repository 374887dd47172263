//! Page type.
//!
//! - [`Page`] - The raw 4KB data container held by every frame

#[allow(clippy::module_inception)]
mod page;

pub use page::Page;
