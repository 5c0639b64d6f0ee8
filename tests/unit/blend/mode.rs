use super::*;

#[test]
fn known_indices_resolve_in_table_order() {
    let expected = [
        "add", "clear", "darken", "dst", "dst-atop", "dst-in", "dst-out", "dst-over", "lighten",
        "multiply", "overlay", "screen", "src", "src-atop", "src-in", "src-out", "src-over", "xor",
    ];
    for (i, name) in expected.iter().enumerate() {
        let op = BlendOperator::resolve(i as i32);
        assert_eq!(op.name(), *name);
        assert_eq!(op.index(), i as i32);
    }
}

#[test]
fn unknown_indices_fall_back_to_dst_in() {
    for idx in [-1, 18, 19, 100, i32::MIN, i32::MAX] {
        assert_eq!(BlendOperator::resolve(idx), BlendOperator::DstIn);
        assert_eq!(
            BlendOperator::resolve_checked(idx),
            Err(Degraded::UnknownBlendIndex(idx))
        );
    }
    assert_eq!(BlendOperator::default(), BlendOperator::DstIn);
}

#[test]
fn names_parse_back() {
    for op in BlendOperator::ALL {
        assert_eq!(op.name().parse::<BlendOperator>().unwrap(), op);
        assert_eq!(op.to_string(), op.name());
    }
    assert_eq!(
        "SRC_IN".parse::<BlendOperator>().unwrap(),
        BlendOperator::SrcIn
    );
    assert!("src-inn".parse::<BlendOperator>().is_err());
}

#[test]
fn serde_uses_kebab_case() {
    let json = serde_json::to_string(&BlendOperator::DstAtop).unwrap();
    assert_eq!(json, "\"dst-atop\"");
    let back: BlendOperator = serde_json::from_str("\"src-over\"").unwrap();
    assert_eq!(back, BlendOperator::SrcOver);
}

#[test]
fn multiply_and_add_map_to_component_modes() {
    assert_eq!(BlendOperator::Multiply.to_blend_mode(), BlendMode::Modulate);
    assert_eq!(BlendOperator::Add.to_blend_mode(), BlendMode::Plus);
    assert_eq!(
        BlendOperator::DstIn.to_blend_mode(),
        BlendMode::DestinationIn
    );
}
