use resvg::tiny_skia::{FilterQuality, Pixmap, PixmapMut, PixmapPaint};

use crate::assets::decode::decode_image;
use crate::foundation::core::Rect;
use crate::foundation::error::MaskResult;
use crate::mask::fit_transform;
use crate::mask::source::MaskSource;

/// Static raster mask, stretched to the view bounds with bilinear filtering.
pub struct BitmapMask {
    pixmap: Pixmap,
}

impl BitmapMask {
    /// Wrap an already premultiplied pixmap.
    pub fn new(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    /// Decode an encoded image (PNG, JPEG, ...).
    pub fn from_bytes(bytes: &[u8]) -> MaskResult<Self> {
        Ok(Self::new(decode_image(bytes)?))
    }

    /// The decoded pixels.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

impl MaskSource for BitmapMask {
    fn draw(&self, target: &mut PixmapMut<'_>, bounds: Rect) {
        let Some(transform) = fit_transform(
            self.pixmap.width() as f32,
            self.pixmap.height() as f32,
            bounds,
        ) else {
            return;
        };
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        target.draw_pixmap(0, 0, self.pixmap.as_ref(), &paint, transform, None);
    }

    fn intrinsic_size(&self) -> Option<(u32, u32)> {
        Some((self.pixmap.width(), self.pixmap.height()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/bitmap.rs"]
mod tests;
