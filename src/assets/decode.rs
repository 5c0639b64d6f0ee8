use std::sync::Arc;

use anyhow::Context as _;
use resvg::tiny_skia::{IntSize, Pixmap};

use crate::foundation::error::{MaskError, MaskResult};

/// Decode a raster image (PNG, JPEG, ...) into a premultiplied RGBA8888 pixmap.
pub fn decode_image(bytes: &[u8]) -> MaskResult<Pixmap> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| MaskError::decode(format!("image has empty size {width}x{height}")))?;
    Pixmap::from_vec(rgba8_premul, size)
        .ok_or_else(|| MaskError::decode("image buffer does not match its dimensions"))
}

/// Parse an SVG document. Text nodes resolve against the system fonts.
pub fn parse_svg(bytes: &[u8]) -> MaskResult<usvg::Tree> {
    let opts = usvg::Options {
        fontdb: system_fontdb(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

fn system_fontdb() -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    tracing::debug!(faces = db.len(), "loaded system fonts for svg masks");
    Arc::new(db)
}

/// Convert a premultiplied pixmap back to straight RGBA8, e.g. for PNG output.
pub fn demultiply_to_rgba8(pixmap: &Pixmap) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
