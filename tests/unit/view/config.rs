use std::path::PathBuf;

use super::*;

#[test]
fn empty_document_uses_defaults() {
    let cfg = MaskConfig::from_json("{}").unwrap();
    assert_eq!(cfg, MaskConfig::default());
    assert_eq!(cfg.blend_operator(), Ok(BlendOperator::DstIn));
    assert!(!cfg.anti_aliasing);
    assert!(cfg.mask.is_none());
}

#[test]
fn full_document_parses() {
    let cfg = MaskConfig::from_json(
        r#"{ "mask": { "image": "masks/star.png" }, "porter_duff_mode": 14, "anti_aliasing": true }"#,
    )
    .unwrap();
    assert_eq!(
        cfg.mask,
        Some(MaskResource::Image(PathBuf::from("masks/star.png")))
    );
    assert_eq!(cfg.blend_operator(), Ok(BlendOperator::SrcIn));
    assert!(cfg.anti_aliasing);
}

#[test]
fn unknown_mode_reports_substitution() {
    let cfg = MaskConfig::from_json(r#"{ "porter_duff_mode": 42 }"#).unwrap();
    assert_eq!(cfg.blend_operator(), Err(Degraded::UnknownBlendIndex(42)));
}

#[test]
fn unknown_fields_are_rejected() {
    let err = MaskConfig::from_json(r#"{ "porter_duff": 1 }"#).unwrap_err();
    assert!(matches!(err, MaskError::Serde(_)));
}

#[test]
fn missing_file_is_an_error() {
    assert!(MaskConfig::from_path(std::path::Path::new("target/does/not/exist.json")).is_err());
}
