use kurbo::{Ellipse, PathEl, RoundedRect, Shape};
use resvg::tiny_skia::{FillRule, Paint, Path, PathBuilder, PixmapMut, Transform};

use crate::foundation::core::Rect;
use crate::foundation::error::{MaskError, MaskResult};
use crate::mask::source::MaskSource;

const FLATTEN_TOLERANCE: f64 = 0.1;

/// Geometry of a [`ShapeMask`]; always fitted to the view bounds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Fills the whole bounds.
    Rect,
    /// Ellipse inscribed in the bounds.
    Oval,
    /// Rectangle with circular corners.
    RoundedRect {
        /// Corner radius in pixels.
        radius: f64,
    },
}

/// Solid-colour shape mask.
#[derive(Clone, Debug)]
pub struct ShapeMask {
    kind: ShapeKind,
    color: [u8; 4],
}

impl ShapeMask {
    /// Build a shape filled with straight (non-premultiplied) RGBA `color`.
    pub fn new(kind: ShapeKind, color: [u8; 4]) -> MaskResult<Self> {
        if let ShapeKind::RoundedRect { radius } = kind
            && (!radius.is_finite() || radius < 0.0)
        {
            return Err(MaskError::validation(format!(
                "rounded rect radius must be finite and >= 0, got {radius}"
            )));
        }
        Ok(Self { kind, color })
    }

    /// Opaque black shape.
    pub fn opaque(kind: ShapeKind) -> Self {
        Self {
            kind,
            color: [0, 0, 0, 255],
        }
    }

    /// Geometry of this mask.
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    fn path(&self, bounds: Rect) -> Option<Path> {
        match self.kind {
            ShapeKind::Rect => to_skia_path(bounds.path_elements(FLATTEN_TOLERANCE)),
            ShapeKind::Oval => {
                to_skia_path(Ellipse::from_rect(bounds).path_elements(FLATTEN_TOLERANCE))
            }
            ShapeKind::RoundedRect { radius } => to_skia_path(
                RoundedRect::from_rect(bounds, radius).path_elements(FLATTEN_TOLERANCE),
            ),
        }
    }
}

impl MaskSource for ShapeMask {
    fn draw(&self, target: &mut PixmapMut<'_>, bounds: Rect) {
        let Some(path) = self.path(bounds) else {
            tracing::debug!(?bounds, "shape mask has no area");
            return;
        };
        let [r, g, b, a] = self.color;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;
        target.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

fn to_skia_path(elements: impl Iterator<Item = PathEl>) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in elements {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p) => pb.quad_to(p1.x as f32, p1.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(p1, p2, p) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/mask/shape.rs"]
mod tests;
