use resvg::tiny_skia::{FilterQuality, PixmapMut, PixmapPaint, Transform};

use crate::blend::mode::BlendOperator;
use crate::foundation::error::Degraded;
use crate::render::cache::MaskBuffer;

/// Draw configuration for the mask pass, fixed for the duration of one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaskPaint {
    /// Operator combining the mask (source) with the drawn children (destination).
    pub operator: BlendOperator,
    /// Filter the mask bitmap while drawing it.
    pub anti_alias: bool,
}

impl MaskPaint {
    fn pixmap_paint(self) -> PixmapPaint {
        PixmapPaint {
            opacity: 1.0,
            blend_mode: self.operator.to_blend_mode(),
            quality: if self.anti_alias {
                FilterQuality::Bilinear
            } else {
                FilterQuality::Nearest
            },
        }
    }
}

/// Composite `buffer` over `target` at the origin, after the children have been drawn into it.
///
/// Returns `false` (and leaves `target` untouched) when there is no buffer. The operator only
/// lives for this call; anything drawn into `target` afterwards uses its own paint.
pub fn composite(target: &mut PixmapMut<'_>, buffer: Option<&MaskBuffer>, paint: MaskPaint) -> bool {
    let Some(buffer) = buffer else {
        tracing::debug!("{}", Degraded::NoMaskConfigured);
        return false;
    };
    let pixmap_paint = paint.pixmap_paint();
    target.draw_pixmap(
        0,
        0,
        buffer.pixmap().as_ref(),
        &pixmap_paint,
        Transform::identity(),
        None,
    );
    tracing::trace!(mode = paint.operator.name(), "composited mask");
    true
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
