//! Tests for record layouts and record array addressing

use recmap::{
    error::RecMapError,
    layout::{FieldKind, LayoutBuilder, RecordArrayLayout},
};

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [FieldKind; 6] = [
        FieldKind::Int8,
        FieldKind::Int16,
        FieldKind::Int32,
        FieldKind::Int64,
        FieldKind::Chars(3),
        FieldKind::Bytes(5),
    ];

    #[test]
    fn test_record_size_is_sum_plus_padding_rounded() {
        for alignment in [1usize, 2, 4, 8, 16, 24] {
            for pad in [0usize, 1, 3] {
                let mut builder = LayoutBuilder::new().alignment(alignment);
                let mut expected = 0;
                for (i, kind) in KINDS.iter().enumerate() {
                    builder = builder.field(format!("f{}", i), *kind);
                    expected += kind.byte_len().unwrap();
                    if pad > 0 {
                        builder = builder.padding(pad);
                        expected += pad;
                    }
                }
                let layout = builder.build().unwrap();
                let rounded = expected.div_ceil(alignment) * alignment;
                assert_eq!(layout.record_size(), rounded, "alignment {} pad {}", alignment, pad);
                assert_eq!(layout.record_size() % alignment, 0);
                let max_end = layout.fields().iter().map(|f| f.end()).max().unwrap();
                assert!(layout.record_size() >= max_end);
            }
        }
    }

    #[test]
    fn test_fields_do_not_overlap() {
        let layout = LayoutBuilder::new()
            .field("a", FieldKind::Int8)
            .aligned_field("b", FieldKind::Int64, 8)
            .padding(3)
            .aligned_field("c", FieldKind::Int32, 4)
            .field("d", FieldKind::Chars(2))
            .build()
            .unwrap();

        for pair in layout.fields().windows(2) {
            assert!(pair[0].end() <= pair[1].offset);
        }
        assert_eq!(layout.field("b").unwrap().offset, 8);
        assert_eq!(layout.field("c").unwrap().offset, 20);
        assert_eq!(layout.field("d").unwrap().offset, 24);
        assert_eq!(layout.record_size(), 28);
    }

    #[test]
    fn test_ssn_credit_score_layouts() {
        let aligned = LayoutBuilder::new()
            .field("ssn", FieldKind::Chars(9))
            .aligned_field("creditScore", FieldKind::Int32, 2)
            .alignment(8)
            .build()
            .unwrap();
        let padded = LayoutBuilder::new()
            .field("ssn", FieldKind::Chars(9))
            .padding(2)
            .field("creditScore", FieldKind::Int32)
            .build()
            .unwrap();

        assert_eq!(aligned.record_size(), 24);
        assert_eq!(padded.record_size(), 24);

        let array = RecordArrayLayout::new(aligned, 100).unwrap();
        assert_eq!(array.total_size(), 2400);
        assert_eq!(array.offset_of(1, "ssn").unwrap(), 24);

        let padded_array = RecordArrayLayout::new(padded, 100).unwrap();
        assert_eq!(padded_array.offset_of(1, "creditScore").unwrap(), 44);
    }

    #[test]
    fn test_strided_int_array() {
        let layout = LayoutBuilder::new().field("value", FieldKind::Int32).build().unwrap();
        let array = RecordArrayLayout::new(layout, 25).unwrap();
        assert_eq!(array.total_size(), 100);
        for i in 0..25 {
            assert_eq!(array.offset_of(i, "value").unwrap(), i * 4);
        }
        assert!(matches!(
            array.offset_of(25, "value"),
            Err(RecMapError::IndexOutOfRange { index: 25, count: 25 })
        ));
    }

    #[test]
    fn test_padding_is_not_addressable() {
        let layout = LayoutBuilder::new()
            .field("a", FieldKind::Int16)
            .padding(6)
            .build()
            .unwrap();
        assert_eq!(layout.named_fields().count(), 1);
        assert_eq!(layout.fields().len(), 2);
        let array = RecordArrayLayout::new(layout, 2).unwrap();
        assert!(matches!(array.offset_of(0, ""), Err(RecMapError::FieldNotFound { .. })));
    }

    #[test]
    fn test_invalid_declarations() {
        let cases = vec![
            LayoutBuilder::new().field("", FieldKind::Int8),
            LayoutBuilder::new().field("z", FieldKind::Bytes(0)),
            LayoutBuilder::new().field("p", FieldKind::Padding(4)),
            LayoutBuilder::new().field("a", FieldKind::Int8).padding(0),
            LayoutBuilder::new().aligned_field("a", FieldKind::Int8, 0),
            LayoutBuilder::new().field("a", FieldKind::Int8).field("a", FieldKind::Int8),
        ];
        for builder in cases {
            assert!(matches!(builder.build(), Err(RecMapError::InvalidLayout { .. })));
        }
    }
}
