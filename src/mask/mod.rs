pub(crate) mod animated;
pub(crate) mod bitmap;
pub(crate) mod shape;
pub(crate) mod source;
pub(crate) mod svg;

use resvg::tiny_skia::Transform;

use crate::foundation::core::Rect;

/// Transform stretching a `src_w x src_h` drawing onto `bounds`.
pub(crate) fn fit_transform(src_w: f32, src_h: f32, bounds: Rect) -> Option<Transform> {
    if !(src_w.is_finite() && src_h.is_finite()) || src_w <= 0.0 || src_h <= 0.0 {
        return None;
    }
    let sx = bounds.width() as f32 / src_w;
    let sy = bounds.height() as f32 / src_h;
    Some(Transform::from_scale(sx, sy).post_translate(bounds.x0 as f32, bounds.y0 as f32))
}
