use resvg::tiny_skia::{Color, Pixmap};

use super::*;

fn solid(width: u32, height: u32, color: Color) -> Pixmap {
    let mut p = Pixmap::new(width, height).unwrap();
    p.fill(color);
    p
}

#[test]
fn stretches_to_bounds() {
    let mask = BitmapMask::new(solid(2, 2, Color::from_rgba8(0, 0, 0, 255)));
    assert_eq!(mask.intrinsic_size(), Some((2, 2)));

    let mut target = Pixmap::new(16, 8).unwrap();
    mask.draw(&mut target.as_mut(), Rect::new(0.0, 0.0, 16.0, 8.0));

    assert!(target.pixel(8, 4).unwrap().alpha() >= 254);
    assert!(target.pixel(14, 6).unwrap().alpha() >= 254);
}

#[test]
fn stays_inside_bounds() {
    let mask = BitmapMask::new(solid(4, 4, Color::from_rgba8(0, 0, 0, 255)));
    let mut target = Pixmap::new(16, 16).unwrap();
    mask.draw(&mut target.as_mut(), Rect::new(0.0, 0.0, 8.0, 8.0));

    assert!(target.pixel(3, 3).unwrap().alpha() >= 254);
    assert_eq!(target.pixel(12, 12).unwrap().alpha(), 0);
}

#[test]
fn from_bytes_rejects_garbage() {
    assert!(BitmapMask::from_bytes(b"nope").is_err());
}
