//! Storage region management and operations

pub mod config;
pub mod regions;
pub mod view;

pub use config::{BackingType, RegionConfig};
pub use regions::{RegionMemoryStats, RegionMetadata, StorageRegion};
pub use view::RegionView;
