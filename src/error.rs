//! Error types and handling for recmap

/// Result type alias for recmap operations
pub type Result<T> = std::result::Result<T, RecMapError>;

/// Error taxonomy for layouts, regions and record stores.
///
/// None of these are retried internally. Recovery policy is left to the caller.
#[derive(Debug, thiserror::Error)]
pub enum RecMapError {
    /// Schema construction violates a layout invariant
    #[error("Invalid layout: {message}")]
    InvalidLayout { message: String },

    /// I/O failure while opening, sizing, mapping or syncing backing storage
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Byte range outside of the region
    #[error("Out of bounds: offset {offset} + length {length} exceeds region size {size}")]
    OutOfBounds {
        offset: usize,
        length: usize,
        size: usize,
    },

    /// Record index outside of the array
    #[error("Index out of range: index {index}, record count {count}")]
    IndexOutOfRange { index: usize, count: usize },

    /// No addressable field with this name
    #[error("Field not found: {name}")]
    FieldNotFound { name: String },

    /// Value width or kind disagrees with the field declaration
    #[error("Type mismatch on field {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// Access through a region (or a view of it) after close
    #[error("Region closed: {name}")]
    ClosedRegion { name: String },

    /// Store has not been opened yet
    #[error("Record store is not open")]
    NotOpen,

    /// Invalid parameters or configuration
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },
}

impl RecMapError {
    /// Create a storage error from a standard I/O error
    pub fn from_io(source: std::io::Error, context: &str) -> Self {
        Self::Storage {
            message: format!("{}: {}", context, source),
            source: Some(source),
        }
    }

    /// Create an invalid layout error
    pub fn invalid_layout(message: impl Into<String>) -> Self {
        Self::InvalidLayout {
            message: message.into(),
        }
    }

    pub fn out_of_bounds(offset: usize, length: usize, size: usize) -> Self {
        Self::OutOfBounds {
            offset,
            length,
            size,
        }
    }

    pub fn index_out_of_range(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange { index, count }
    }

    pub fn field_not_found(name: impl Into<String>) -> Self {
        Self::FieldNotFound { name: name.into() }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a closed region error
    pub fn closed(name: impl Into<String>) -> Self {
        Self::ClosedRegion { name: name.into() }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Whether this error reports use of a closed region
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ClosedRegion { .. })
    }
}

impl From<std::io::Error> for RecMapError {
    fn from(err: std::io::Error) -> Self {
        Self::from_io(err, "I/O operation failed")
    }
}
