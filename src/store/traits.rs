//! Shared read path for stores and their views

use crate::{
    error::Result,
    layout::RecordArrayLayout,
};

use super::value::FieldValue;

/// Anything that can read records laid out by a [`RecordArrayLayout`].
///
/// Implementors provide raw access; field decoding and address computation
/// are shared so writers and readers cannot disagree on offsets.
pub trait RecordReader {
    /// Layout of the record array
    fn array_layout(&self) -> &RecordArrayLayout;

    /// Fail unless reads are currently allowed
    fn ensure_readable(&self) -> Result<()>;

    /// Fill `buf` from the absolute region offset
    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<()>;

    /// Read and decode one field of record `index`
    fn get_field(&self, index: usize, name: &str) -> Result<FieldValue> {
        self.ensure_readable()?;
        let (offset, field) = self.array_layout().locate(index, name)?;
        let mut buf = vec![0u8; field.length];
        self.read_at(offset, &mut buf)?;
        FieldValue::decode(field, &buf)
    }

    /// Raw bytes of record `index`, padding included
    fn record_bytes(&self, index: usize) -> Result<Vec<u8>> {
        self.ensure_readable()?;
        let range = self.array_layout().record_range(index)?;
        let mut buf = vec![0u8; range.len()];
        self.read_at(range.start, &mut buf)?;
        Ok(buf)
    }

    /// Number of records
    fn count(&self) -> usize {
        self.array_layout().count()
    }
}
