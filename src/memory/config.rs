//! Configuration types for storage regions

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Types of region backing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackingType {
    /// Private anonymous memory, released on close
    Anonymous,
    /// Memory-mapped file, created if absent and sized to the region
    FileBacked,
    /// Anonymous memory file descriptor (Linux-specific)
    #[cfg(target_os = "linux")]
    MemFd,
}

impl Default for BackingType {
    fn default() -> Self {
        Self::Anonymous
    }
}

impl BackingType {
    /// Check if this backing type is supported on the current platform
    pub fn is_supported(&self) -> bool {
        match self {
            BackingType::Anonymous | BackingType::FileBacked => true,
            #[cfg(target_os = "linux")]
            BackingType::MemFd => true,
        }
    }

    /// Get a human-readable name for the backing type
    pub fn name(&self) -> &'static str {
        match self {
            BackingType::Anonymous => "anonymous",
            BackingType::FileBacked => "file-backed",
            #[cfg(target_os = "linux")]
            BackingType::MemFd => "memfd",
        }
    }

    /// Whether `flush` reaches persistent storage
    pub fn is_durable(&self) -> bool {
        matches!(self, BackingType::FileBacked)
    }
}

/// Configuration for opening storage regions
#[derive(Debug, Clone)]
pub struct RegionConfig {
    /// Name of the region, used in diagnostics and as the memfd name
    pub name: String,
    /// Total size of the region in bytes
    pub size: usize,
    /// Backing type for the region
    pub backing_type: BackingType,
    /// File path for file-backed regions
    pub file_path: Option<PathBuf>,
    /// Create missing parent directories of `file_path`
    pub create_dirs: bool,
    /// Permissions for a newly created file (Unix permissions)
    pub permissions: u32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            size: 0,
            backing_type: BackingType::default(),
            file_path: None,
            create_dirs: true,
            permissions: crate::config::DEFAULT_PERMISSIONS,
        }
    }
}

impl RegionConfig {
    /// Create a new region configuration
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            ..Default::default()
        }
    }

    /// Anonymous memory region
    pub fn anonymous(name: impl Into<String>, size: usize) -> Self {
        Self::new(name, size).with_backing_type(BackingType::Anonymous)
    }

    /// File-backed region at `path`
    pub fn file(name: impl Into<String>, size: usize, path: impl Into<PathBuf>) -> Self {
        Self::new(name, size)
            .with_backing_type(BackingType::FileBacked)
            .with_file_path(path)
    }

    /// Set the backing type
    pub fn with_backing_type(mut self, backing_type: BackingType) -> Self {
        self.backing_type = backing_type;
        self
    }

    /// Set the file path for file-backed regions
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Set whether missing parent directories are created
    pub fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }

    /// Set the permissions for a newly created file
    pub fn with_permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }

    /// Set the region size
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        use crate::error::RecMapError;

        if self.name.is_empty() {
            return Err(RecMapError::invalid_parameter(
                "name",
                "Region name cannot be empty",
            ));
        }

        if self.size > isize::MAX as usize {
            return Err(RecMapError::invalid_parameter(
                "size",
                "Region size exceeds the addressable range",
            ));
        }

        if !self.backing_type.is_supported() {
            return Err(RecMapError::invalid_parameter(
                "backing_type",
                format!(
                    "Backing type {} is not supported on this platform",
                    self.backing_type.name()
                ),
            ));
        }

        if self.backing_type == BackingType::FileBacked && self.file_path.is_none() {
            return Err(RecMapError::invalid_parameter(
                "file_path",
                "File path must be specified for file-backed regions",
            ));
        }

        Ok(())
    }

    /// File path of a file-backed region
    pub fn path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}
