use std::sync::Arc;

use resvg::tiny_skia::PixmapMut;

use crate::assets::decode::parse_svg;
use crate::foundation::core::Rect;
use crate::foundation::error::MaskResult;
use crate::mask::fit_transform;
use crate::mask::source::MaskSource;

/// Vector mask rendered at the exact view size, so it stays sharp at any scale.
pub struct SvgMask {
    tree: Arc<usvg::Tree>,
}

impl SvgMask {
    /// Wrap a parsed tree.
    pub fn new(tree: Arc<usvg::Tree>) -> Self {
        Self { tree }
    }

    /// Parse SVG source bytes.
    pub fn from_bytes(bytes: &[u8]) -> MaskResult<Self> {
        Ok(Self::new(Arc::new(parse_svg(bytes)?)))
    }
}

impl MaskSource for SvgMask {
    fn draw(&self, target: &mut PixmapMut<'_>, bounds: Rect) {
        let size = self.tree.size();
        if let Some(transform) = fit_transform(size.width(), size.height(), bounds) {
            resvg::render(&self.tree, transform, target);
        }
    }

    fn intrinsic_size(&self) -> Option<(u32, u32)> {
        let size = self.tree.size().to_int_size();
        Some((size.width(), size.height()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/svg.rs"]
mod tests;
