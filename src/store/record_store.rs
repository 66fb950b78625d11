//! Record store: a record array layout bound to a storage region

use log::debug;

use crate::{
    error::{RecMapError, Result},
    layout::{RecordArrayLayout, RecordLayout},
    memory::{BackingType, RegionConfig, StorageRegion},
};

use super::{traits::RecordReader, value::FieldValue, view::RecordView};

/// Lifecycle of a [`RecordStore`]. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Unopened,
    Open,
    Closed,
}

/// Fixed-size records addressed by index and field name.
///
/// All reads and writes compute their address through the store's
/// [`RecordArrayLayout`]. Field accessors are only valid while the store is
/// `Open`; dropping an open store releases its region.
#[derive(Debug)]
pub struct RecordStore {
    layout: RecordArrayLayout,
    config: RegionConfig,
    region: Option<StorageRegion>,
    state: StoreState,
}

impl RecordStore {
    /// Build the array layout without touching storage.
    ///
    /// `config.size` is replaced by the array's total size.
    pub fn new(layout: RecordLayout, count: usize, config: RegionConfig) -> Result<Self> {
        let layout = RecordArrayLayout::new(layout, count)?;
        let config = config.with_size(layout.total_size());
        config.validate()?;

        Ok(Self {
            layout,
            config,
            region: None,
            state: StoreState::Unopened,
        })
    }

    /// Build the layout and open its region in one step
    pub fn open(layout: RecordLayout, count: usize, config: RegionConfig) -> Result<Self> {
        let mut store = Self::new(layout, count, config)?;
        store.open_region()?;
        Ok(store)
    }

    /// Open the backing region, moving `Unopened` to `Open`
    pub fn open_region(&mut self) -> Result<()> {
        match self.state {
            StoreState::Unopened => {}
            StoreState::Open => {
                return Err(RecMapError::invalid_parameter("state", "Record store is already open"))
            }
            StoreState::Closed => return Err(RecMapError::closed(&self.config.name)),
        }

        let region = StorageRegion::open(self.config.clone())?;
        debug!(
            "Record store {} open: {} records x {} bytes = {} bytes, layout {}",
            self.config.name,
            self.layout.count(),
            self.layout.record_size(),
            self.layout.total_size(),
            self.layout.record()
        );
        self.region = Some(region);
        self.state = StoreState::Open;
        Ok(())
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == StoreState::Open
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn backing_type(&self) -> BackingType {
        self.config.backing_type
    }

    /// Layout of a single record
    pub fn record_layout(&self) -> &RecordLayout {
        self.layout.record()
    }

    /// Total size of the backing region
    pub fn region_size(&self) -> usize {
        self.layout.total_size()
    }

    /// Underlying region while open
    pub fn region(&self) -> Result<&StorageRegion> {
        match (&self.state, &self.region) {
            (StoreState::Open, Some(region)) => Ok(region),
            (StoreState::Unopened, _) => Err(RecMapError::NotOpen),
            _ => Err(RecMapError::closed(&self.config.name)),
        }
    }

    fn region_mut(&mut self) -> Result<&mut StorageRegion> {
        match (&self.state, &mut self.region) {
            (StoreState::Open, Some(region)) => Ok(region),
            (StoreState::Unopened, _) => Err(RecMapError::NotOpen),
            _ => Err(RecMapError::closed(&self.config.name)),
        }
    }

    /// Encode `value` into field `name` of record `index`.
    ///
    /// The value's kind and byte width must match the field exactly.
    pub fn set_field(&mut self, index: usize, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        self.region()?;
        let (offset, field) = self.layout.locate(index, name)?;
        let bytes = value.into().encode_for(field)?;
        self.region_mut()?.write_bytes(offset, &bytes)
    }

    /// Write several fields of one record. Stops at the first failure.
    pub fn set_fields<'a, I, V>(&mut self, index: usize, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Into<FieldValue>,
    {
        for (name, value) in values {
            self.set_field(index, name, value)?;
        }
        Ok(())
    }

    /// Force changes of a file-backed store to disk. No-op for memory backings.
    pub fn flush(&self) -> Result<()> {
        self.region()?.flush()
    }

    /// Read-only view that can be handed to other threads
    pub fn view(&self) -> Result<RecordView> {
        let region = self.region()?.view()?;
        Ok(RecordView::new(self.layout.clone(), region))
    }

    /// Release the region. `Closed` is terminal; closing twice fails.
    pub fn close(&mut self) -> Result<()> {
        match self.state {
            StoreState::Closed => return Err(RecMapError::closed(&self.config.name)),
            StoreState::Unopened => {}
            StoreState::Open => {
                if let Some(mut region) = self.region.take() {
                    region.close()?;
                }
            }
        }
        self.state = StoreState::Closed;
        debug!("Record store {} closed", self.config.name);
        Ok(())
    }
}

impl RecordReader for RecordStore {
    fn array_layout(&self) -> &RecordArrayLayout {
        &self.layout
    }

    fn ensure_readable(&self) -> Result<()> {
        self.region().map(|_| ())
    }

    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        self.region()?.read_into(offset, buf)
    }
}
