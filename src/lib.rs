//! # recmap - Fixed-Layout Binary Record Store
//!
//! recmap places arrays of fixed-size binary records into a byte region held
//! in anonymous memory, a Linux memfd, or a memory-mapped file.
//!
//! ## Features
//!
//! - **Record layouts**: named integer, UTF-16 and raw byte fields with explicit
//!   padding, per-field alignment and record-size rounding
//! - **Single address path**: every access resolves `index * record_size + field.offset`
//!   through [`RecordArrayLayout`]
//! - **Scoped release**: regions unmap exactly once, on `close()` or drop
//! - **Read-only views**: cheap handles for reader threads that fail loudly
//!   after the owner closes
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 RecordStore                  │
//! │   set_field / get_field / flush / close      │
//! ├──────────────────────┬───────────────────────┤
//! │  RecordArrayLayout   │    StorageRegion      │
//! │  - RecordLayout      │  - anonymous / memfd  │
//! │  - offset_of(i, f)   │  - mmap'd file        │
//! └──────────────────────┴───────────┬───────────┘
//!                                    │
//!                                    ▼
//!                         ┌─────────────────────┐
//!                         │ RegionView (r/o)    │
//!                         │ RecordView (r/o)    │
//!                         └─────────────────────┘
//! ```
//!
//! ## Persisted format
//!
//! A file-backed store is exactly `record_size * count` bytes: no header, no
//! magic, no version. Multi-byte fields use the host's native byte order, so
//! the layout and endianness must be agreed out of band.
//!
//! ## Concurrency
//!
//! One writer (the `&mut` owner) and any number of readers through views.
//! Each field access is atomic with respect to other accesses, but there is no
//! record-level snapshot.

pub mod error;
pub mod layout;
pub mod memory;
pub mod store;

// Main API re-exports
pub use error::{RecMapError, Result};
pub use layout::{FieldKind, FieldSpec, LayoutBuilder, RecordArrayLayout, RecordLayout};
pub use memory::{BackingType, RegionConfig, RegionMemoryStats, RegionMetadata, RegionView, StorageRegion};
pub use store::{FieldValue, RecordReader, RecordStore, RecordView, StoreState};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration constants
pub mod config {
    /// Record alignment meaning "no rounding"
    pub const DEFAULT_ALIGNMENT: usize = 1;

    /// Word alignment commonly used to pad records to a multiple of 8 bytes
    pub const WORD_ALIGNMENT: usize = 8;

    /// Permissions for newly created backing files
    pub const DEFAULT_PERMISSIONS: u32 = 0o644;
}
