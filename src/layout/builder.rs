//! Record layout construction

use std::{collections::HashSet, fmt};

use crate::error::{RecMapError, Result};

use super::field::{FieldKind, FieldSpec};

/// Declared entry, resolved to offsets by [`LayoutBuilder::build`]
#[derive(Debug, Clone)]
enum Entry {
    Field {
        name: String,
        kind: FieldKind,
        align: usize,
    },
    Padding(usize),
}

/// Builder for [`RecordLayout`]
///
/// Fields are placed in declaration order at the running sum of the previous
/// lengths. Explicit padding is inserted where declared, implicit padding only
/// where [`aligned_field`](Self::aligned_field) asks for it. The final size is
/// rounded up to the record alignment (1 by default, meaning no rounding).
///
/// Errors are deferred to `build()` so declarations can be chained.
#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    entries: Vec<Entry>,
    alignment: usize,
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            alignment: crate::config::DEFAULT_ALIGNMENT,
        }
    }
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field placed directly after the previous entry
    pub fn field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.aligned_field(name, kind, 1)
    }

    /// Declare a field whose offset must be a multiple of `align` bytes
    pub fn aligned_field(mut self, name: impl Into<String>, kind: FieldKind, align: usize) -> Self {
        self.entries.push(Entry::Field {
            name: name.into(),
            kind,
            align,
        });
        self
    }

    /// Insert `width` bytes of explicit padding
    pub fn padding(mut self, width: usize) -> Self {
        self.entries.push(Entry::Padding(width));
        self
    }

    /// Round the record size up to a multiple of `alignment` bytes
    pub fn alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    /// Resolve offsets and validate the layout
    pub fn build(self) -> Result<RecordLayout> {
        if self.alignment == 0 {
            return Err(RecMapError::invalid_layout("record alignment must be greater than 0"));
        }

        let mut fields = Vec::with_capacity(self.entries.len());
        let mut names = HashSet::new();
        let mut offset = 0usize;

        for entry in self.entries {
            match entry {
                Entry::Padding(width) => {
                    if width == 0 {
                        return Err(RecMapError::invalid_layout("padding width must be greater than 0"));
                    }
                    offset = push_padding(&mut fields, offset, width)?;
                }
                Entry::Field { name, kind, align } => {
                    if name.is_empty() {
                        return Err(RecMapError::invalid_layout("field name cannot be empty"));
                    }
                    if kind.is_padding() {
                        return Err(RecMapError::invalid_layout(format!(
                            "field {} declared with padding kind, use padding() instead",
                            name
                        )));
                    }
                    if align == 0 {
                        return Err(RecMapError::invalid_layout(format!(
                            "field {} alignment must be greater than 0",
                            name
                        )));
                    }
                    let length = kind.byte_len().ok_or_else(|| {
                        RecMapError::invalid_layout(format!("field {} length overflows", name))
                    })?;
                    if length == 0 {
                        return Err(RecMapError::invalid_layout(format!(
                            "field {} has zero length",
                            name
                        )));
                    }
                    if !names.insert(name.clone()) {
                        return Err(RecMapError::invalid_layout(format!(
                            "field {} declared twice",
                            name
                        )));
                    }

                    let misalignment = offset % align;
                    if misalignment != 0 {
                        offset = push_padding(&mut fields, offset, align - misalignment)?;
                    }

                    let end = checked_end(offset, length)?;
                    fields.push(FieldSpec {
                        name,
                        kind,
                        offset,
                        length,
                    });
                    offset = end;
                }
            }
        }

        if names.is_empty() {
            return Err(RecMapError::invalid_layout("layout declares no fields"));
        }

        let record_size = round_up(offset, self.alignment)?;
        RecordLayout::from_parts(fields, record_size, self.alignment)
    }
}

fn push_padding(fields: &mut Vec<FieldSpec>, offset: usize, width: usize) -> Result<usize> {
    let end = checked_end(offset, width)?;
    fields.push(FieldSpec {
        name: String::new(),
        kind: FieldKind::Padding(width),
        offset,
        length: width,
    });
    Ok(end)
}

fn checked_end(offset: usize, length: usize) -> Result<usize> {
    offset
        .checked_add(length)
        .filter(|end| *end <= isize::MAX as usize)
        .ok_or_else(|| RecMapError::invalid_layout("record size overflows the addressable range"))
}

fn round_up(size: usize, alignment: usize) -> Result<usize> {
    let rem = size % alignment;
    if rem == 0 {
        return Ok(size);
    }
    checked_end(size, alignment - rem)
}

/// Resolved, immutable record layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    fields: Vec<FieldSpec>,
    record_size: usize,
    alignment: usize,
}

impl RecordLayout {
    pub fn builder() -> LayoutBuilder {
        LayoutBuilder::new()
    }

    /// Assemble a layout from already placed fields, checking every invariant
    pub fn from_parts(fields: Vec<FieldSpec>, record_size: usize, alignment: usize) -> Result<Self> {
        let layout = Self {
            fields,
            record_size,
            alignment,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Check the layout invariants
    pub fn validate(&self) -> Result<()> {
        if self.alignment == 0 {
            return Err(RecMapError::invalid_layout("record alignment must be greater than 0"));
        }
        if self.record_size % self.alignment != 0 {
            return Err(RecMapError::invalid_layout(format!(
                "record size {} is not a multiple of alignment {}",
                self.record_size, self.alignment
            )));
        }

        let mut names = HashSet::new();
        let mut named = 0usize;
        let mut previous_end = 0usize;
        for field in &self.fields {
            if field.length == 0 || field.kind.byte_len() != Some(field.length) {
                return Err(RecMapError::invalid_layout(format!(
                    "field '{}' length {} does not match its kind {}",
                    field.name,
                    field.length,
                    field.kind.describe()
                )));
            }
            let end = checked_end(field.offset, field.length)?;
            if end > self.record_size {
                return Err(RecMapError::invalid_layout(format!(
                    "field '{}' ends at {} beyond record size {}",
                    field.name, end, self.record_size
                )));
            }
            if field.offset < previous_end {
                return Err(RecMapError::invalid_layout(format!(
                    "field '{}' at offset {} overlaps the previous field",
                    field.name, field.offset
                )));
            }
            previous_end = end;

            if !field.is_padding() {
                named += 1;
                if field.name.is_empty() || !names.insert(field.name.as_str()) {
                    return Err(RecMapError::invalid_layout(format!(
                        "field name '{}' is empty or duplicated",
                        field.name
                    )));
                }
            }
        }
        if named == 0 {
            return Err(RecMapError::invalid_layout("layout declares no fields"));
        }
        Ok(())
    }

    /// All placed fields, padding included, in offset order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Addressable (non-padding) fields
    pub fn named_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.is_padding())
    }

    /// Look up an addressable field by name
    pub fn field(&self, name: &str) -> Result<&FieldSpec> {
        self.named_fields()
            .find(|f| f.name == name)
            .ok_or_else(|| RecMapError::field_not_found(name))
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Bytes used by named fields only
    pub fn data_size(&self) -> usize {
        self.named_fields().map(|f| f.length).sum()
    }

    /// Explicit, implicit and trailing padding bytes
    pub fn padding_size(&self) -> usize {
        self.record_size - self.data_size()
    }
}

impl fmt::Display for RecordLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            if field.is_padding() {
                write!(f, "x{}@{}", field.length, field.offset)?;
            } else {
                write!(f, "{}:{}@{}", field.name, field.kind.describe(), field.offset)?;
            }
        }
        write!(f, " | {} bytes, align {}]", self.record_size, self.alignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_offsets() {
        let layout = LayoutBuilder::new()
            .field("a", FieldKind::Int8)
            .field("b", FieldKind::Int32)
            .field("c", FieldKind::Int64)
            .build()
            .unwrap();

        assert_eq!(layout.field("a").unwrap().offset, 0);
        assert_eq!(layout.field("b").unwrap().offset, 1);
        assert_eq!(layout.field("c").unwrap().offset, 5);
        assert_eq!(layout.record_size(), 13);
        assert_eq!(layout.padding_size(), 0);
    }

    #[test]
    fn test_explicit_padding_and_alignment() {
        let layout = LayoutBuilder::new()
            .field("ssn", FieldKind::Chars(9))
            .padding(2)
            .field("creditScore", FieldKind::Int32)
            .build()
            .unwrap();

        assert_eq!(layout.field("creditScore").unwrap().offset, 20);
        assert_eq!(layout.record_size(), 24);
        assert_eq!(layout.fields().len(), 3);
        assert!(layout.fields()[1].is_padding());
    }

    #[test]
    fn test_record_alignment_rounding() {
        let layout = LayoutBuilder::new()
            .field("ssn", FieldKind::Chars(9))
            .aligned_field("creditScore", FieldKind::Int32, 2)
            .alignment(8)
            .build()
            .unwrap();

        assert_eq!(layout.field("creditScore").unwrap().offset, 18);
        assert_eq!(layout.data_size(), 22);
        assert_eq!(layout.record_size(), 24);

        let wide = LayoutBuilder::new()
            .field("ssn", FieldKind::Chars(9))
            .field("creditScore", FieldKind::Int32)
            .alignment(16)
            .build()
            .unwrap();
        assert_eq!(wide.record_size(), 32);
    }

    #[test]
    fn test_aligned_field_inserts_padding() {
        let layout = LayoutBuilder::new()
            .field("flag", FieldKind::Int8)
            .aligned_field("value", FieldKind::Int64, 8)
            .build()
            .unwrap();

        assert_eq!(layout.field("value").unwrap().offset, 8);
        assert_eq!(layout.record_size(), 16);
        assert_eq!(layout.padding_size(), 7);
    }

    #[test]
    fn test_invalid_layouts() {
        let zero = LayoutBuilder::new().field("empty", FieldKind::Chars(0)).build();
        assert!(matches!(zero, Err(RecMapError::InvalidLayout { .. })));

        let duplicate = LayoutBuilder::new()
            .field("a", FieldKind::Int8)
            .field("a", FieldKind::Int16)
            .build();
        assert!(matches!(duplicate, Err(RecMapError::InvalidLayout { .. })));

        let no_fields = LayoutBuilder::new().padding(4).build();
        assert!(matches!(no_fields, Err(RecMapError::InvalidLayout { .. })));

        let zero_align = LayoutBuilder::new().field("a", FieldKind::Int8).alignment(0).build();
        assert!(matches!(zero_align, Err(RecMapError::InvalidLayout { .. })));

        let overflow = LayoutBuilder::new()
            .field("a", FieldKind::Bytes(usize::MAX))
            .field("b", FieldKind::Int8)
            .build();
        assert!(matches!(overflow, Err(RecMapError::InvalidLayout { .. })));
    }

    #[test]
    fn test_from_parts_rejects_overlap() {
        let fields = vec![
            FieldSpec { name: "a".into(), kind: FieldKind::Int32, offset: 0, length: 4 },
            FieldSpec { name: "b".into(), kind: FieldKind::Int32, offset: 2, length: 4 },
        ];
        assert!(RecordLayout::from_parts(fields, 8, 1).is_err());
    }

    #[test]
    fn test_unknown_field() {
        let layout = LayoutBuilder::new().field("a", FieldKind::Int8).padding(3).build().unwrap();
        assert!(matches!(layout.field("b"), Err(RecMapError::FieldNotFound { .. })));
        assert!(matches!(layout.field(""), Err(RecMapError::FieldNotFound { .. })));
    }

    #[test]
    fn test_display() {
        let layout = LayoutBuilder::new()
            .field("ssn", FieldKind::Chars(9))
            .padding(2)
            .field("creditScore", FieldKind::Int32)
            .build()
            .unwrap();
        let shown = layout.to_string();
        assert!(shown.contains("ssn:chars[9]"));
        assert!(shown.contains("x2@18"));
        assert!(shown.contains("24 bytes"));
    }
}
