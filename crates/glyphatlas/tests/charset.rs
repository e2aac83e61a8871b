use glyphatlas::{AtlasError, CharSet, Encoding};
use pretty_assertions::assert_eq;

#[test]
fn latin1_maps_bytes_to_same_codepoints() {
    let set = CharSet::from_encoding(Encoding::Latin1);
    assert_eq!(set.len(), 256);
    assert_eq!(set.slots()[b'A' as usize], Some('A'));
    assert_eq!(set.slots()[0xE9], Some('é'));
    assert_eq!(set.slot_of('é'), Some(0xE9));
    assert_eq!(set.slot_of('€'), None);
    assert_eq!(set.label(), "latin-1");
}

#[test]
fn ascii_leaves_high_half_empty() {
    let set = CharSet::from_encoding(Encoding::Ascii);
    assert_eq!(set.len(), 256);
    assert_eq!(set.slots()[0x7F], Some('\x7F'));
    assert_eq!(set.slots()[0x80], None);
    assert_eq!(set.slot_of('é'), None);
}

#[test]
fn cp437_uses_dos_glyphs() {
    let set = CharSet::from_encoding(Encoding::Cp437);
    assert_eq!(set.slots()[0x01], Some('☺'));
    assert_eq!(set.slots()[0xDB], Some('█'));
    assert_eq!(set.slot_of('█'), Some(0xDB));
    assert_eq!(set.slot_of('A'), Some(0x41));
}

#[test]
fn cp437_has_no_control_characters_besides_nul() {
    let set = CharSet::from_encoding(Encoding::Cp437);
    for (byte, expected) in [
        (0x08, '◘'),
        (0x09, '○'),
        (0x0A, '◙'),
        (0x0D, '♪'),
        (0x1A, '→'),
        (0x1B, '←'),
        (0x7F, '⌂'),
    ] {
        assert_eq!(set.slots()[byte], Some(expected), "byte {byte:#04x}");
        assert_eq!(set.slot_of(expected), Some(byte));
    }
    let controls: Vec<usize> = (0..256)
        .filter(|&b| set.slots()[b].is_some_and(char::is_control))
        .collect();
    assert_eq!(controls, vec![0]);
}

#[test]
fn encoding_names() {
    assert_eq!("LATIN-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
    assert_eq!("iso_8859-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
    assert_eq!("ibm437".parse::<Encoding>().unwrap(), Encoding::Cp437);
    assert!(matches!(
        "utf-8".parse::<Encoding>(),
        Err(AtlasError::UnknownEncoding(_))
    ));
}

#[test]
fn ranges_are_sorted_and_deduplicated() {
    let set = CharSet::from_ranges("0x43-0x45, 65, 66-67").unwrap();
    let chars: Vec<char> = set.slots().iter().flatten().copied().collect();
    assert_eq!(chars, vec!['A', 'B', 'C', 'D', 'E']);
    assert_eq!(set.slot_of('D'), Some(3));
    assert_eq!(set.slot_of('Z'), None);
    assert_eq!(set.label(), "custom");
}

#[test]
fn invalid_ranges_are_rejected() {
    for bad in ["", "70-65", "0xD800", "0x110000", "abc", "1-"] {
        assert!(
            matches!(CharSet::from_ranges(bad), Err(AtlasError::InvalidCharset(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn chars_from_text() {
    let set = CharSet::from_chars("hello").unwrap();
    let chars: Vec<char> = set.slots().iter().flatten().copied().collect();
    assert_eq!(chars, vec!['e', 'h', 'l', 'o']);
    assert!(CharSet::from_chars("").is_err());
}
