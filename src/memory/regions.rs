//! Storage region implementation

use std::{
    fs::{self, File, OpenOptions},
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::SystemTime,
};

#[cfg(target_os = "linux")]
use std::{ffi::CString, os::fd::OwnedFd};

use log::{debug, trace, warn};
use memmap2::{MmapMut, MmapOptions};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{RecMapError, Result};

use super::{
    config::{BackingType, RegionConfig},
    view::RegionView,
};

/// Metadata for a storage region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionMetadata {
    /// Name of the region
    pub name: String,
    /// Size in bytes
    pub size: usize,
    /// Type of backing storage
    pub backing_type: BackingType,
    /// Backing file, if any
    pub file_path: Option<PathBuf>,
    /// Creation timestamp
    pub created_at: SystemTime,
}

/// Mapping plus the handles that keep it alive
#[derive(Debug)]
pub(crate) struct Backing {
    /// `None` for zero-sized regions, which cannot be mapped
    mmap: Option<MmapMut>,
    _file: Option<File>,
    #[cfg(target_os = "linux")]
    _owned_fd: Option<OwnedFd>,
}

impl Backing {
    fn new(mmap: Option<MmapMut>, file: Option<File>) -> Self {
        Self {
            mmap,
            _file: file,
            #[cfg(target_os = "linux")]
            _owned_fd: None,
        }
    }

    fn as_slice(&self) -> &[u8] {
        match &self.mmap {
            Some(mmap) => mmap,
            None => &[],
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match &mut self.mmap {
            Some(mmap) => mmap,
            None => &mut [],
        }
    }
}

/// State shared between a region and its read-only views.
///
/// `backing` becomes `None` on close; every access path checks it under the
/// lock, so views observe the close as `ClosedRegion`.
#[derive(Debug)]
pub(crate) struct RegionShared {
    pub(crate) metadata: RegionMetadata,
    backing: RwLock<Option<Backing>>,
    pub(crate) views: AtomicUsize,
}

impl RegionShared {
    pub(crate) fn is_closed(&self) -> bool {
        self.backing.read().is_none()
    }

    pub(crate) fn read_into(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        let guard = self.backing.read();
        let backing = guard
            .as_ref()
            .ok_or_else(|| RecMapError::closed(&self.metadata.name))?;
        let end = check_range(offset, buf.len(), self.metadata.size)?;
        buf.copy_from_slice(&backing.as_slice()[offset..end]);
        Ok(())
    }

    pub(crate) fn read_bytes(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; length];
        self.read_into(offset, &mut buf)?;
        Ok(buf)
    }

    fn write_bytes(&self, offset: usize, bytes: &[u8]) -> Result<()> {
        let mut guard = self.backing.write();
        let backing = guard
            .as_mut()
            .ok_or_else(|| RecMapError::closed(&self.metadata.name))?;
        let end = check_range(offset, bytes.len(), self.metadata.size)?;
        backing.as_mut_slice()[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Drop the mapping. Returns false if it was already released.
    fn release(&self) -> bool {
        let released = self.backing.write().take();
        if released.is_none() {
            return false;
        }

        let views = self.views.load(Ordering::Acquire);
        if views > 0 {
            warn!(
                "Closing region {} with {} read-only view(s) outstanding",
                self.metadata.name, views
            );
        }
        drop(released);
        debug!("Released region {} ({} bytes)", self.metadata.name, self.metadata.size);
        true
    }
}

fn check_range(offset: usize, length: usize, size: usize) -> Result<usize> {
    match offset.checked_add(length) {
        Some(end) if end <= size => Ok(end),
        _ => Err(RecMapError::out_of_bounds(offset, length, size)),
    }
}

/// An exclusively owned, addressable byte range.
///
/// Writes require `&mut self`, so there is a single writer; concurrent readers
/// go through [`RegionView`]s. The mapping is released exactly once, either by
/// [`close`](Self::close) or on drop, after which every access fails with
/// `ClosedRegion`.
#[derive(Debug)]
pub struct StorageRegion {
    shared: Arc<RegionShared>,
}

impl StorageRegion {
    /// Open a region of `config.size` bytes on the configured backing
    pub fn open(config: RegionConfig) -> Result<Self> {
        config.validate()?;

        let backing = Self::create_backing(&config)?;

        let metadata = RegionMetadata {
            name: config.name,
            size: config.size,
            backing_type: config.backing_type,
            file_path: config.file_path,
            created_at: SystemTime::now(),
        };
        debug!(
            "Opened {} region {} ({} bytes)",
            metadata.backing_type.name(),
            metadata.name,
            metadata.size
        );

        Ok(Self {
            shared: Arc::new(RegionShared {
                metadata,
                backing: RwLock::new(Some(backing)),
                views: AtomicUsize::new(0),
            }),
        })
    }

    /// Create the backing storage for the region
    fn create_backing(config: &RegionConfig) -> Result<Backing> {
        match config.backing_type {
            BackingType::Anonymous => Self::create_anonymous_backing(config),
            BackingType::FileBacked => Self::create_file_backing(config),
            #[cfg(target_os = "linux")]
            BackingType::MemFd => Self::create_memfd_backing(config),
        }
    }

    fn create_anonymous_backing(config: &RegionConfig) -> Result<Backing> {
        let mmap = if config.size == 0 {
            None
        } else {
            Some(
                MmapOptions::new()
                    .len(config.size)
                    .map_anon()
                    .map_err(|e| RecMapError::from_io(e, "Failed to allocate anonymous memory"))?,
            )
        };
        Ok(Backing::new(mmap, None))
    }

    /// Create file-backed storage sized to exactly `config.size` bytes
    fn create_file_backing(config: &RegionConfig) -> Result<Backing> {
        let path = config.path().ok_or_else(|| {
            RecMapError::invalid_parameter("file_path", "File path must be specified")
        })?;

        if config.create_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|e| RecMapError::from_io(e, "Failed to create parent directory"))?;
            }
        }

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(config.permissions);
        }
        let file = options
            .open(path)
            .map_err(|e| RecMapError::from_io(e, "Failed to create/open file"))?;

        file.set_len(config.size as u64)
            .map_err(|e| RecMapError::from_io(e, "Failed to set file size"))?;

        let mmap = if config.size == 0 {
            None
        } else {
            // SAFETY: the file is owned by the region for the lifetime of the mapping.
            // Concurrent modification by other processes is outside this crate's contract.
            let mmap = unsafe { MmapOptions::new().len(config.size).map_mut(&file) }
                .map_err(|e| RecMapError::from_io(e, "Failed to create memory mapping"))?;
            Some(mmap)
        };

        Ok(Backing::new(mmap, Some(file)))
    }

    /// Create memfd-backed storage
    #[cfg(target_os = "linux")]
    fn create_memfd_backing(config: &RegionConfig) -> Result<Backing> {
        use nix::{
            sys::memfd::{memfd_create, MemFdCreateFlag},
            unistd::ftruncate,
        };

        let name_cstr = CString::new(config.name.clone())
            .map_err(|_| RecMapError::invalid_parameter("name", "Name contains null bytes"))?;

        let owned_fd = memfd_create(&name_cstr, MemFdCreateFlag::MFD_CLOEXEC)
            .map_err(|e| RecMapError::from_io(e.into(), "Failed to create memfd"))?;

        let len = nix::libc::off_t::try_from(config.size)
            .map_err(|_| RecMapError::invalid_parameter("size", "Region size exceeds off_t"))?;
        ftruncate(&owned_fd, len)
            .map_err(|e| RecMapError::from_io(e.into(), "Failed to set memfd size"))?;

        let mmap = if config.size == 0 {
            None
        } else {
            // SAFETY: the descriptor is owned by the region and never shared.
            let mmap = unsafe { MmapOptions::new().len(config.size).map_mut(&owned_fd) }
                .map_err(|e| RecMapError::from_io(e, "Failed to create memory mapping"))?;
            Some(mmap)
        };

        Ok(Backing {
            mmap,
            _file: None,
            _owned_fd: Some(owned_fd),
        })
    }

    /// Get the region metadata
    pub fn metadata(&self) -> &RegionMetadata {
        &self.shared.metadata
    }

    /// Get the name of the region
    pub fn name(&self) -> &str {
        &self.shared.metadata.name
    }

    /// Get the size of the region
    pub fn size(&self) -> usize {
        self.shared.metadata.size
    }

    pub fn backing_type(&self) -> BackingType {
        self.shared.metadata.backing_type
    }

    /// Check if the region is file-backed
    pub fn is_file_backed(&self) -> bool {
        matches!(self.shared.metadata.backing_type, BackingType::FileBacked)
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Copy `length` bytes starting at `offset`
    pub fn read_bytes(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
        self.shared.read_bytes(offset, length)
    }

    /// Fill `buf` from `offset`
    pub fn read_into(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        self.shared.read_into(offset, buf)
    }

    /// Copy `bytes` into the region at `offset`
    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        self.shared.write_bytes(offset, bytes)
    }

    /// Force modified pages of a file-backed region to disk.
    ///
    /// No-op for anonymous and memfd regions.
    pub fn flush(&self) -> Result<()> {
        let guard = self.shared.backing.read();
        let backing = guard
            .as_ref()
            .ok_or_else(|| RecMapError::closed(self.name()))?;

        if !self.backing_type().is_durable() {
            return Ok(());
        }
        if let Some(mmap) = &backing.mmap {
            mmap.flush()
                .map_err(|e| RecMapError::from_io(e, "Failed to flush memory mapping"))?;
            trace!("Flushed region {}", self.name());
        }
        Ok(())
    }

    /// Acquire a read-only duplicate sharing this region's backing
    pub fn view(&self) -> Result<RegionView> {
        if self.is_closed() {
            return Err(RecMapError::closed(self.name()));
        }
        Ok(RegionView::new(Arc::clone(&self.shared)))
    }

    /// Number of read-only views currently alive
    pub fn view_count(&self) -> usize {
        self.shared.views.load(Ordering::Acquire)
    }

    /// Release the mapping. A second close fails with `ClosedRegion`.
    pub fn close(&mut self) -> Result<()> {
        if self.shared.release() {
            Ok(())
        } else {
            Err(RecMapError::closed(self.name()))
        }
    }

    /// Get memory statistics for this region
    pub fn memory_stats(&self) -> RegionMemoryStats {
        RegionMemoryStats {
            name: self.name().to_string(),
            size: self.size(),
            backing_type: self.backing_type(),
            created_at: self.shared.metadata.created_at,
            open_views: self.view_count(),
            closed: self.is_closed(),
        }
    }
}

impl Drop for StorageRegion {
    fn drop(&mut self) {
        if self.shared.release() {
            debug!("Region {} released on drop", self.name());
        }
    }
}

/// Memory statistics for a region
#[derive(Debug, Clone)]
pub struct RegionMemoryStats {
    pub name: String,
    pub size: usize,
    pub backing_type: BackingType,
    pub created_at: SystemTime,
    pub open_views: usize,
    pub closed: bool,
}

impl RegionMemoryStats {
    /// Get the age of the region in seconds
    pub fn age_seconds(&self) -> Option<u64> {
        self.created_at.elapsed().ok().map(|d| d.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_anonymous_read_write() {
        let mut region = StorageRegion::open(RegionConfig::anonymous("anon", 64)).unwrap();
        assert_eq!(region.size(), 64);
        assert_eq!(region.read_bytes(0, 4).unwrap(), vec![0; 4]);

        region.write_bytes(10, &[1, 2, 3]).unwrap();
        assert_eq!(region.read_bytes(9, 5).unwrap(), vec![0, 1, 2, 3, 0]);
        region.flush().unwrap();
    }

    #[test]
    fn test_out_of_bounds() {
        let mut region = StorageRegion::open(RegionConfig::anonymous("anon", 16)).unwrap();
        assert!(matches!(
            region.read_bytes(12, 8),
            Err(RecMapError::OutOfBounds { offset: 12, length: 8, size: 16 })
        ));
        assert!(matches!(
            region.write_bytes(usize::MAX, &[1]),
            Err(RecMapError::OutOfBounds { .. })
        ));
        assert!(region.write_bytes(15, &[9]).is_ok());
    }

    #[test]
    fn test_zero_sized_region() {
        let dir = TempDir::new().unwrap();
        let region = StorageRegion::open(RegionConfig::file("empty", 0, dir.path().join("empty.bin"))).unwrap();
        assert_eq!(region.size(), 0);
        assert!(region.read_bytes(0, 0).unwrap().is_empty());
        assert!(matches!(region.read_bytes(0, 1), Err(RecMapError::OutOfBounds { .. })));
    }

    #[test]
    fn test_close_once() {
        let mut region = StorageRegion::open(RegionConfig::anonymous("anon", 8)).unwrap();
        region.close().unwrap();
        assert!(region.is_closed());
        assert!(region.close().unwrap_err().is_closed());
        assert!(region.read_bytes(0, 1).unwrap_err().is_closed());
        assert!(region.write_bytes(0, &[1]).unwrap_err().is_closed());
        assert!(region.flush().unwrap_err().is_closed());
        assert!(region.view().unwrap_err().is_closed());
    }

    #[test]
    fn test_memory_stats() {
        let region = StorageRegion::open(RegionConfig::anonymous("stats", 128)).unwrap();
        let _view = region.view().unwrap();
        let stats = region.memory_stats();
        assert_eq!(stats.name, "stats");
        assert_eq!(stats.size, 128);
        assert_eq!(stats.backing_type, BackingType::Anonymous);
        assert_eq!(stats.open_views, 1);
        assert!(!stats.closed);
        assert!(stats.age_seconds().is_some());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_memfd_region() {
        let config = RegionConfig::new("memfd_records", 4096).with_backing_type(BackingType::MemFd);
        let mut region = StorageRegion::open(config).unwrap();
        region.write_bytes(4092, &[7, 7, 7, 7]).unwrap();
        assert_eq!(region.read_bytes(4092, 4).unwrap(), vec![7; 4]);
        region.flush().unwrap();
    }
}
