//! Field kinds and resolved field placements

use serde::{Deserialize, Serialize};

/// Primitive kind of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// 1-byte signed integer
    Int8,
    /// 2-byte signed integer, native byte order
    Int16,
    /// 4-byte signed integer, native byte order
    Int32,
    /// 8-byte signed integer, native byte order
    Int64,
    /// Fixed number of UTF-16 code units (2 bytes each, native byte order)
    Chars(usize),
    /// Fixed number of raw bytes
    Bytes(usize),
    /// Unaddressable filler bytes
    Padding(usize),
}

impl FieldKind {
    /// Byte length occupied by a field of this kind, `None` on overflow
    pub fn byte_len(&self) -> Option<usize> {
        match *self {
            FieldKind::Int8 => Some(1),
            FieldKind::Int16 => Some(2),
            FieldKind::Int32 => Some(4),
            FieldKind::Int64 => Some(8),
            FieldKind::Chars(n) => n.checked_mul(2),
            FieldKind::Bytes(n) | FieldKind::Padding(n) => Some(n),
        }
    }

    pub fn is_padding(&self) -> bool {
        matches!(self, FieldKind::Padding(_))
    }

    /// Short name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Int8 => "int8",
            FieldKind::Int16 => "int16",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::Chars(_) => "chars",
            FieldKind::Bytes(_) => "bytes",
            FieldKind::Padding(_) => "padding",
        }
    }

    /// Human readable description including the width, e.g. `chars[9] (18 bytes)`
    pub fn describe(&self) -> String {
        let len = self.byte_len().unwrap_or(usize::MAX);
        match self {
            FieldKind::Chars(n) | FieldKind::Bytes(n) | FieldKind::Padding(n) => {
                format!("{}[{}] ({} bytes)", self.name(), n, len)
            }
            _ => format!("{} ({} bytes)", self.name(), len),
        }
    }
}

/// A field placed inside a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, empty for padding
    pub name: String,
    pub kind: FieldKind,
    /// Byte offset from the start of the record
    pub offset: usize,
    /// Byte length of the field
    pub length: usize,
}

impl FieldSpec {
    pub fn is_padding(&self) -> bool {
        self.kind.is_padding()
    }

    /// Exclusive end offset within the record
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}
