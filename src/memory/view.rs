//! Read-only duplicates of a storage region

use std::sync::{atomic::Ordering, Arc};

use crate::error::Result;

use super::regions::{RegionMetadata, RegionShared};

/// Read-only handle sharing the backing of a [`StorageRegion`](super::StorageRegion).
///
/// Views can be cloned and sent to other threads. They never keep the mapping
/// alive: once the owning region is closed, every read returns `ClosedRegion`.
/// Reads are not snapshots; a view may observe a record half way through an
/// update made by the writer.
#[derive(Debug)]
pub struct RegionView {
    shared: Arc<RegionShared>,
}

impl RegionView {
    pub(crate) fn new(shared: Arc<RegionShared>) -> Self {
        shared.views.fetch_add(1, Ordering::AcqRel);
        Self { shared }
    }

    pub fn metadata(&self) -> &RegionMetadata {
        &self.shared.metadata
    }

    pub fn name(&self) -> &str {
        &self.shared.metadata.name
    }

    pub fn size(&self) -> usize {
        self.shared.metadata.size
    }

    /// Whether the owning region has been closed
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    pub fn read_bytes(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
        self.shared.read_bytes(offset, length)
    }

    pub fn read_into(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        self.shared.read_into(offset, buf)
    }
}

impl Clone for RegionView {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.shared))
    }
}

impl Drop for RegionView {
    fn drop(&mut self) {
        self.shared.views.fetch_sub(1, Ordering::AcqRel);
    }
}
