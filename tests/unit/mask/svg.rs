use resvg::tiny_skia::Pixmap;

use super::*;

const HALF_RECT: &[u8] = br#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
  <rect x="0" y="0" width="5" height="10" fill="black"/>
</svg>"#;

#[test]
fn renders_scaled_to_bounds() {
    let mask = SvgMask::from_bytes(HALF_RECT).unwrap();
    assert_eq!(mask.intrinsic_size(), Some((10, 10)));

    let mut target = Pixmap::new(40, 20).unwrap();
    mask.draw(&mut target.as_mut(), Rect::new(0.0, 0.0, 40.0, 20.0));

    assert_eq!(target.pixel(5, 10).unwrap().alpha(), 255);
    assert_eq!(target.pixel(35, 10).unwrap().alpha(), 0);
}

#[test]
fn invalid_svg_is_an_error() {
    assert!(SvgMask::from_bytes(b"<svg").is_err());
}
