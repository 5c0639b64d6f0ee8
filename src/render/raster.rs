use resvg::tiny_skia::Pixmap;

use crate::foundation::core::ViewSize;
use crate::foundation::error::Degraded;
use crate::mask::source::MaskSource;
use crate::render::cache::MaskBuffer;

/// Largest mask edge we are willing to allocate.
pub const MAX_MASK_DIM: i32 = 16_384;

/// Render `source` into a fresh transparent buffer of exactly `width x height`.
///
/// Never fails hard: a missing source or an unusable size is reported as [`Degraded`] and logged,
/// and the caller keeps whatever mask it had.
#[tracing::instrument(level = "debug", skip(source), fields(has_source = source.is_some()))]
pub fn rasterize(
    source: Option<&dyn MaskSource>,
    width: i32,
    height: i32,
) -> Result<MaskBuffer, Degraded> {
    let Some(source) = source else {
        let degraded = Degraded::RasterizeSkipped;
        tracing::warn!("{degraded}");
        return Err(degraded);
    };

    let size = ViewSize::new(width, height);
    if size.is_empty() {
        let degraded = Degraded::ZeroDimension { width, height };
        tracing::warn!("{degraded}");
        return Err(degraded);
    }

    // Avoid pathological allocations, the host reported something no screen can show.
    let pixmap = if width > MAX_MASK_DIM || height > MAX_MASK_DIM {
        None
    } else {
        Pixmap::new(width as u32, height as u32)
    };
    let Some(mut pixmap) = pixmap else {
        let degraded = Degraded::AllocationFailed { width, height };
        tracing::warn!("{degraded}");
        return Err(degraded);
    };

    source.draw(&mut pixmap.as_mut(), size.bounds());
    Ok(MaskBuffer::new(pixmap))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
