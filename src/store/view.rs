//! Read-only record views

use crate::{
    error::{RecMapError, Result},
    layout::RecordArrayLayout,
    memory::RegionView,
};

use super::traits::RecordReader;

/// Read-only access to a [`RecordStore`](super::RecordStore) from another thread.
///
/// There is no snapshot isolation: while the owning store writes, a view may
/// see a record with some fields updated and others not. After the store is
/// closed every read fails with `ClosedRegion`.
#[derive(Debug, Clone)]
pub struct RecordView {
    layout: RecordArrayLayout,
    region: RegionView,
}

impl RecordView {
    pub(crate) fn new(layout: RecordArrayLayout, region: RegionView) -> Self {
        Self { layout, region }
    }

    pub fn name(&self) -> &str {
        self.region.name()
    }

    pub fn is_closed(&self) -> bool {
        self.region.is_closed()
    }
}

impl RecordReader for RecordView {
    fn array_layout(&self) -> &RecordArrayLayout {
        &self.layout
    }

    fn ensure_readable(&self) -> Result<()> {
        if self.region.is_closed() {
            return Err(RecMapError::closed(self.region.name()));
        }
        Ok(())
    }

    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        self.region.read_into(offset, buf)
    }
}
