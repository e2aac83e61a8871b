#![cfg(feature = "serde")]

use glyphatlas::{FieldConfig, FieldSpec, PackerConfig};
use pretty_assertions::assert_eq;

#[test]
fn field_spec_uses_its_text_form() {
    assert_eq!(serde_json::to_string(&FieldSpec::I16).unwrap(), r#""i16""#);
    let spec: FieldSpec = serde_json::from_str(r#""u8""#).unwrap();
    assert_eq!(spec, FieldSpec::U8);
}

#[test]
fn unsupported_widths_are_rejected() {
    for bad in [r#""u12""#, r#""i0""#, r#""f32""#, r#"{"bits":12,"signed":false}"#] {
        assert!(
            serde_json::from_str::<FieldSpec>(bad).is_err(),
            "{bad} should not deserialize"
        );
    }
}

#[test]
fn field_config_round_trips() {
    let mut config = FieldConfig::compact();
    config.codepoint = Some(FieldSpec::U32);
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains(r#""bearing_x":"i16""#), "{json}");
    let back: FieldConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let broken = json.replace(r#""x":"u16""#, r#""x":"u12""#);
    assert!(serde_json::from_str::<FieldConfig>(&broken).is_err());

    let packer: PackerConfig =
        serde_json::from_str(&serde_json::to_string(&PackerConfig::default()).unwrap()).unwrap();
    assert_eq!(packer, PackerConfig::default());
}
