use glyphatlas::{
    decode, decode_description, encode, encode_description, AtlasError, Description,
    DescriptionEntry, DescriptionError, Endianness, Field, FieldConfig, FieldSpec,
};
use pretty_assertions::assert_eq;

fn entry(x: u32, y: u32, w: u32, h: u32, bx: i32, by: i32, adv: u32) -> DescriptionEntry {
    DescriptionEntry {
        codepoint: None,
        x,
        y,
        width: w,
        height: h,
        bearing_x: bx,
        bearing_y: by,
        advance: adv,
        advance_y: None,
    }
}

fn sample_entries() -> Vec<DescriptionEntry> {
    vec![
        entry(0, 0, 10, 20, -3, 17, 12),
        entry(10, 0, 15, 20, 1, 20, 16),
        entry(0, 20, 8, 5, 0, -2, 9),
        entry(0, 0, 0, 0, 0, 0, 6),
    ]
}

#[test]
fn negative_bearing_round_trips_through_i16() {
    let config = FieldConfig::compact();
    assert_eq!(config.bearing_x, FieldSpec::I16);
    let entries = vec![entry(1, 2, 3, 4, -3, 5, 6)];
    let bytes = encode(&entries, &config).unwrap();
    assert_eq!(bytes.len(), 14);
    // bearing_x sits after four u16 values, two's complement little endian
    assert_eq!(&bytes[8..10], &[0xFD, 0xFF]);
    let decoded = decode(&bytes, &config).unwrap();
    assert_eq!(decoded[0].bearing_x, -3);
    assert_eq!(decoded, entries);
}

#[test]
fn negative_value_in_unsigned_field_is_rejected() {
    let mut config = FieldConfig::compact();
    config.bearing_x = FieldSpec::U16;
    let err = encode(&[entry(0, 0, 1, 1, -3, 0, 1)], &config).unwrap_err();
    match err {
        AtlasError::Description(DescriptionError::FieldOverflow { field, value, spec }) => {
            assert_eq!(field, Field::BearingX);
            assert_eq!(value, -3);
            assert_eq!(spec, FieldSpec::U16);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn value_too_large_for_field_is_rejected() {
    let config = FieldConfig::compact();
    let err = encode(&[entry(70_000, 0, 1, 1, 0, 0, 1)], &config).unwrap_err();
    assert!(matches!(
        err,
        AtlasError::Description(DescriptionError::FieldOverflow { field: Field::X, .. })
    ));

    let mut config = FieldConfig::compact();
    config.bearing_y = FieldSpec::I8;
    assert!(encode(&[entry(0, 0, 1, 1, 0, 127, 1)], &config).is_ok());
    assert!(encode(&[entry(0, 0, 1, 1, 0, 128, 1)], &config).is_err());
    assert!(encode(&[entry(0, 0, 1, 1, 0, -128, 1)], &config).is_ok());
    assert!(encode(&[entry(0, 0, 1, 1, 0, -129, 1)], &config).is_err());
}

#[test]
fn round_trip_across_widths_and_byte_orders() {
    let specs = [
        (FieldSpec::U16, FieldSpec::I16),
        (FieldSpec::U32, FieldSpec::I32),
        (FieldSpec::U8, FieldSpec::I8),
    ];
    for endianness in [Endianness::Little, Endianness::Big] {
        for (unsigned, signed) in specs {
            let config = FieldConfig {
                endianness,
                line_spacing: None,
                codepoint: Some(unsigned),
                x: unsigned,
                y: unsigned,
                width: unsigned,
                height: unsigned,
                bearing_x: signed,
                bearing_y: signed,
                advance: unsigned,
                advance_y: Some(unsigned),
            };
            let entries: Vec<_> = sample_entries()
                .into_iter()
                .enumerate()
                .map(|(i, mut e)| {
                    e.codepoint = Some(65 + i as u32);
                    e.advance_y = Some(i as u32);
                    e
                })
                .collect();
            let bytes = encode(&entries, &config).unwrap();
            assert_eq!(bytes.len(), entries.len() * config.stride());
            assert_eq!(decode(&bytes, &config).unwrap(), entries, "{endianness} {unsigned}");
        }
    }
}

#[test]
fn big_endian_byte_layout() {
    let mut config = FieldConfig::compact();
    config.endianness = Endianness::Big;
    let bytes = encode(&[entry(0x0102, 3, 4, 5, -2, 6, 7)], &config).unwrap();
    assert_eq!(
        bytes,
        vec![0x01, 0x02, 0, 3, 0, 4, 0, 5, 0xFF, 0xFE, 0, 6, 0, 7]
    );
}

#[test]
fn default_layout_matches_legacy_file() {
    let config = FieldConfig::default();
    assert_eq!(config.stride(), 32);
    assert_eq!(config.header_len(), 4);
    let description = Description {
        line_spacing: Some(40),
        entries: vec![DescriptionEntry {
            advance_y: Some(0),
            ..entry(5, 6, 7, 8, -1, 9, 10)
        }],
    };
    let bytes = encode_description(&description, &config).unwrap();
    let mut expected = Vec::new();
    expected.extend(40u32.to_le_bytes());
    for v in [5u32, 6, 7, 8] {
        expected.extend(v.to_le_bytes());
    }
    expected.extend((-1i32).to_le_bytes());
    expected.extend(9i32.to_le_bytes());
    expected.extend(10u32.to_le_bytes());
    expected.extend(0u32.to_le_bytes());
    assert_eq!(bytes, expected);
    assert_eq!(decode_description(&bytes, &config).unwrap(), description);
}

#[test]
fn stride_mismatch_is_malformed() {
    let config = FieldConfig::compact();
    let bytes = encode(&sample_entries(), &config).unwrap();
    let err = decode(&bytes[..bytes.len() - 1], &config).unwrap_err();
    assert!(matches!(
        err,
        AtlasError::Description(DescriptionError::Malformed { len: 55, stride: 14 })
    ));
}

#[test]
fn header_then_partial_record_is_malformed() {
    let config = FieldConfig::default();
    let err = decode_description(&[0u8; 4 + 31], &config).unwrap_err();
    assert!(matches!(
        err,
        AtlasError::Description(DescriptionError::Malformed { stride: 32, .. })
    ));
    let err = decode_description(&[0u8; 3], &config).unwrap_err();
    assert!(matches!(
        err,
        AtlasError::Description(DescriptionError::MissingHeader { len: 3, header: 4 })
    ));
}

#[test]
fn empty_description_decodes_to_no_entries() {
    let config = FieldConfig::compact();
    assert!(decode(&[], &config).unwrap().is_empty());
    let with_header = FieldConfig::default();
    let parsed = decode_description(&7u32.to_le_bytes(), &with_header).unwrap();
    assert_eq!(parsed.line_spacing, Some(7));
    assert!(parsed.is_empty());
}

#[test]
fn optional_field_presence_must_match_layout() {
    let config = FieldConfig::compact();
    let mut e = entry(0, 0, 1, 1, 0, 0, 1);
    e.codepoint = Some(65);
    let err = encode(&[e], &config).unwrap_err();
    assert!(matches!(
        err,
        AtlasError::Description(DescriptionError::PresenceMismatch {
            index: 0,
            field: Field::Codepoint
        })
    ));

    let err = encode(&[entry(0, 0, 1, 1, 0, 0, 1)], &FieldConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        AtlasError::Description(DescriptionError::PresenceMismatch {
            field: Field::AdvanceY,
            ..
        })
    ));

    let description = Description {
        line_spacing: None,
        entries: vec![],
    };
    let err = encode_description(&description, &FieldConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        AtlasError::Description(DescriptionError::HeaderMismatch)
    ));
}

#[test]
fn field_spec_parsing() {
    assert_eq!("u16".parse::<FieldSpec>().unwrap(), FieldSpec::U16);
    assert_eq!("I32".parse::<FieldSpec>().unwrap(), FieldSpec::I32);
    assert_eq!(FieldSpec::I8.to_string(), "i8");
    assert!("u24".parse::<FieldSpec>().is_err());
    assert!("f32".parse::<FieldSpec>().is_err());
    assert!("".parse::<FieldSpec>().is_err());
    assert_eq!(FieldSpec::I16.range(), (-32768, 32767));
    assert_eq!(FieldSpec::U32.range(), (0, u32::MAX as i64));
    assert_eq!("bearing-x".parse::<Field>().unwrap(), Field::BearingX);
}

#[test]
fn config_set_rejects_removing_mandatory_fields() {
    let mut config = FieldConfig::default();
    config.set(Field::AdvanceY, None).unwrap();
    config.set(Field::Width, Some(FieldSpec::U8)).unwrap();
    assert_eq!(config.stride(), 4 * 3 + 1 + 4 * 3);
    assert!(config.set(Field::X, None).is_err());
}

#[test]
fn field_spec_string_conversions_validate() {
    assert_eq!(FieldSpec::try_from("i16".to_string()).unwrap(), FieldSpec::I16);
    assert!(FieldSpec::try_from("u12".to_string()).is_err());
    assert!(FieldSpec::try_from("i0".to_string()).is_err());
    assert_eq!(String::from(FieldSpec::U32), "u32");
    assert!(FieldSpec::new(12, false).is_err());
}
