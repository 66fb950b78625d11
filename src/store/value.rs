//! Field values and their native byte encoding

use crate::{
    error::{RecMapError, Result},
    layout::{FieldKind, FieldSpec},
};

/// A value stored in or read from a record field.
///
/// Integers and UTF-16 code units use the host's native byte order; files
/// written on one architecture are only readable on one with the same
/// endianness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    /// Must contain exactly as many UTF-16 code units as the field declares
    Chars(String),
    /// Must contain exactly as many bytes as the field declares
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Encoded width in bytes
    pub fn byte_len(&self) -> usize {
        match self {
            FieldValue::Int8(_) => 1,
            FieldValue::Int16(_) => 2,
            FieldValue::Int32(_) => 4,
            FieldValue::Int64(_) => 8,
            FieldValue::Chars(s) => s.encode_utf16().count() * 2,
            FieldValue::Bytes(b) => b.len(),
        }
    }

    /// Field kind this value encodes to
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Int8(_) => FieldKind::Int8,
            FieldValue::Int16(_) => FieldKind::Int16,
            FieldValue::Int32(_) => FieldKind::Int32,
            FieldValue::Int64(_) => FieldKind::Int64,
            FieldValue::Chars(s) => FieldKind::Chars(s.encode_utf16().count()),
            FieldValue::Bytes(b) => FieldKind::Bytes(b.len()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            FieldValue::Int8(v) => Some(v.into()),
            FieldValue::Int16(v) => Some(v.into()),
            FieldValue::Int32(v) => Some(v.into()),
            FieldValue::Int64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Chars(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Encode for `field`, rejecting any kind or width disagreement
    pub fn encode_for(&self, field: &FieldSpec) -> Result<Vec<u8>> {
        let kind = self.kind();
        if kind != field.kind || self.byte_len() != field.length {
            return Err(RecMapError::type_mismatch(
                &field.name,
                field.kind.describe(),
                kind.describe(),
            ));
        }

        let bytes = match self {
            FieldValue::Int8(v) => v.to_ne_bytes().to_vec(),
            FieldValue::Int16(v) => v.to_ne_bytes().to_vec(),
            FieldValue::Int32(v) => v.to_ne_bytes().to_vec(),
            FieldValue::Int64(v) => v.to_ne_bytes().to_vec(),
            FieldValue::Chars(s) => s.encode_utf16().flat_map(u16::to_ne_bytes).collect(),
            FieldValue::Bytes(b) => b.clone(),
        };
        Ok(bytes)
    }

    /// Decode the raw bytes of `field`.
    ///
    /// Unpaired surrogates in a chars field are replaced with U+FFFD.
    pub fn decode(field: &FieldSpec, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != field.length {
            return Err(RecMapError::type_mismatch(
                &field.name,
                field.kind.describe(),
                format!("{} raw bytes", bytes.len()),
            ));
        }

        let value = match field.kind {
            FieldKind::Int8 => FieldValue::Int8(i8::from_ne_bytes([bytes[0]])),
            FieldKind::Int16 => FieldValue::Int16(i16::from_ne_bytes([bytes[0], bytes[1]])),
            FieldKind::Int32 => {
                FieldValue::Int32(i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            FieldKind::Int64 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                FieldValue::Int64(i64::from_ne_bytes(raw))
            }
            FieldKind::Chars(_) => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
                    .collect();
                FieldValue::Chars(String::from_utf16_lossy(&units))
            }
            FieldKind::Bytes(_) => FieldValue::Bytes(bytes.to_vec()),
            FieldKind::Padding(_) => return Err(RecMapError::field_not_found(&field.name)),
        };
        Ok(value)
    }
}

impl From<i8> for FieldValue {
    fn from(v: i8) -> Self {
        FieldValue::Int8(v)
    }
}

impl From<i16> for FieldValue {
    fn from(v: i16) -> Self {
        FieldValue::Int16(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int32(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int64(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Chars(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Chars(v)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Bytes(v)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(v: &[u8]) -> Self {
        FieldValue::Bytes(v.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, kind: FieldKind) -> FieldSpec {
        FieldSpec {
            name: name.to_string(),
            kind,
            offset: 0,
            length: kind.byte_len().unwrap(),
        }
    }

    #[test]
    fn test_int_encoding_is_native() {
        let field = spec("score", FieldKind::Int32);
        let bytes = FieldValue::Int32(700).encode_for(&field).unwrap();
        assert_eq!(bytes, 700i32.to_ne_bytes());
        assert_eq!(FieldValue::decode(&field, &bytes).unwrap(), FieldValue::Int32(700));
    }

    #[test]
    fn test_chars_are_utf16_units() {
        let field = spec("ssn", FieldKind::Chars(9));
        let bytes = FieldValue::from("123456000").encode_for(&field).unwrap();
        assert_eq!(bytes.len(), 18);
        assert_eq!(&bytes[0..2], &u16::from(b'1').to_ne_bytes());
        assert_eq!(
            FieldValue::decode(&field, &bytes).unwrap().as_str(),
            Some("123456000")
        );
    }

    #[test]
    fn test_width_mismatch() {
        let field = spec("score", FieldKind::Int32);
        assert!(matches!(
            FieldValue::Int64(700).encode_for(&field),
            Err(RecMapError::TypeMismatch { .. })
        ));
        assert!(matches!(
            FieldValue::Int16(7).encode_for(&field),
            Err(RecMapError::TypeMismatch { .. })
        ));

        let chars = spec("ssn", FieldKind::Chars(9));
        assert!(FieldValue::from("12345").encode_for(&chars).is_err());
        assert!(FieldValue::from("1234567890").encode_for(&chars).is_err());
    }

    #[test]
    fn test_kind_mismatch_with_same_width() {
        let field = spec("score", FieldKind::Int32);
        assert!(matches!(
            FieldValue::Bytes(vec![0; 4]).encode_for(&field),
            Err(RecMapError::TypeMismatch { .. })
        ));
        assert!(FieldValue::from("ab").encode_for(&field).is_err());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(FieldValue::Int8(-3).as_i64(), Some(-3));
        assert_eq!(FieldValue::from(vec![1u8, 2]).as_bytes(), Some(&[1u8, 2][..]));
        assert_eq!(FieldValue::Int16(1).as_str(), None);
    }
}
