//! Contiguous arrays of fixed-size records

use std::ops::Range;

use crate::error::{RecMapError, Result};

use super::{builder::RecordLayout, field::FieldSpec};

/// A [`RecordLayout`] repeated `count` times back to back.
///
/// This is the only place where absolute addresses are computed; readers and
/// writers both go through [`offset_of`](Self::offset_of).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordArrayLayout {
    record: RecordLayout,
    count: usize,
    total_size: usize,
}

impl RecordArrayLayout {
    /// Fails with `InvalidLayout` when `record_size * count` is not addressable
    pub fn new(record: RecordLayout, count: usize) -> Result<Self> {
        let total_size = record
            .record_size()
            .checked_mul(count)
            .filter(|total| *total <= isize::MAX as usize)
            .ok_or_else(|| {
                RecMapError::invalid_layout(format!(
                    "{} records of {} bytes overflow the addressable range",
                    count,
                    record.record_size()
                ))
            })?;

        Ok(Self {
            record,
            count,
            total_size,
        })
    }

    pub fn record(&self) -> &RecordLayout {
        &self.record
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn record_size(&self) -> usize {
        self.record.record_size()
    }

    /// Total region size in bytes
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.count {
            return Err(RecMapError::index_out_of_range(index, self.count));
        }
        Ok(())
    }

    /// Absolute offset of record `index`
    pub fn record_offset(&self, index: usize) -> Result<usize> {
        self.check_index(index)?;
        Ok(index * self.record.record_size())
    }

    /// Byte range covered by record `index`, padding included
    pub fn record_range(&self, index: usize) -> Result<Range<usize>> {
        let start = self.record_offset(index)?;
        Ok(start..start + self.record.record_size())
    }

    /// Absolute offset of `field` in record `index`
    pub fn offset_of(&self, index: usize, field: &str) -> Result<usize> {
        self.locate(index, field).map(|(offset, _)| offset)
    }

    /// Absolute offset together with the field description
    pub fn locate(&self, index: usize, field: &str) -> Result<(usize, &FieldSpec)> {
        let base = self.record_offset(index)?;
        let spec = self.record.field(field)?;
        Ok((base + spec.offset, spec))
    }
}
