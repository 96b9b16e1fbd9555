use serde_json::json;

use super::*;

#[test]
fn defaults_match_documented_values() {
    let p = CaptionProperties::default();
    assert_eq!(p.font_size, 36);
    assert_eq!(p.font_color.to_string(), "0xFFFFFF");
    assert_eq!(p.box_color.to_string(), "0x000000@0.5");
    assert!((p.caption_offset_y.fraction() - 0.10).abs() < 1e-12);
    assert_eq!(p.box_borderw, 5);
    assert_eq!(p.line_spacing, 10);
    assert!(p.font_file.is_none());
    p.validate().unwrap();
}

#[test]
fn offset_accepts_height_expression_percent_and_fraction() {
    assert!(("0.10*h".parse::<CaptionOffset>().unwrap().fraction() - 0.10).abs() < 1e-12);
    assert!(("25%".parse::<CaptionOffset>().unwrap().fraction() - 0.25).abs() < 1e-12);
    assert!(("0.5".parse::<CaptionOffset>().unwrap().fraction() - 0.5).abs() < 1e-12);
    assert!("1.5*h".parse::<CaptionOffset>().is_err());
    assert!("h/2".parse::<CaptionOffset>().is_err());
    assert_eq!("0.10*h".parse::<CaptionOffset>().unwrap().pixels(1080), 108);
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let p: CaptionProperties = serde_json::from_value(json!({
        "font_size": 48,
        "caption_offset_y": "0.8*h",
        "box_color": "#00000080"
    }))
    .unwrap();
    assert_eq!(p.font_size, 48);
    assert!((p.caption_offset_y.fraction() - 0.8).abs() < 1e-12);
    assert_eq!(p.font_color, CaptionColor::rgb(255, 255, 255));
    assert_eq!(p.line_spacing, 10);

    let p: CaptionProperties = serde_json::from_value(json!({ "caption_offset_y": 0.2 })).unwrap();
    assert!((p.caption_offset_y.fraction() - 0.2).abs() < 1e-12);
}

#[test]
fn unknown_fields_and_bad_values_are_rejected() {
    assert!(serde_json::from_value::<CaptionProperties>(json!({ "fontsize": 12 })).is_err());
    assert!(
        serde_json::from_value::<CaptionProperties>(json!({ "caption_offset_y": "2*h" })).is_err()
    );

    let p = CaptionProperties {
        font_size: 0,
        ..CaptionProperties::default()
    };
    assert!(p.validate().is_err());

    let p = CaptionProperties {
        font_file: Some(PathBuf::from("/definitely/missing/font.ttf")),
        ..CaptionProperties::default()
    };
    assert!(p.validate().is_err());
}
