use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::error::{MaskError, MaskResult};
use crate::mask::animated::{AnimatedMask, AnimationFrame};
use crate::mask::bitmap::BitmapMask;
use crate::mask::shape::{ShapeKind, ShapeMask};
use crate::mask::source::MaskSource;
use crate::mask::svg::SvgMask;

/// Reference to a mask resource, as written in configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskResource {
    /// Raster image file (PNG, JPEG, ...).
    Image(PathBuf),
    /// SVG file.
    Svg(PathBuf),
    /// Solid shape.
    Shape(ShapeSpec),
    /// Frame animation over other resources.
    Animated(AnimatedSpec),
}

/// Configuration form of a [`ShapeMask`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeSpec {
    /// Geometry.
    pub kind: ShapeKind,
    /// Straight RGBA fill, opaque black by default.
    #[serde(default = "opaque_black")]
    pub color: [u8; 4],
}

/// Configuration form of an [`AnimatedMask`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimatedSpec {
    /// Frames in display order.
    pub frames: Vec<FrameSpec>,
    /// Stop on the last frame instead of looping.
    #[serde(default)]
    pub one_shot: bool,
}

/// One frame of an [`AnimatedSpec`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameSpec {
    /// What to show.
    pub mask: MaskResource,
    /// How long to show it, in milliseconds.
    pub duration_ms: u64,
}

fn opaque_black() -> [u8; 4] {
    [0, 0, 0, 255]
}

/// Turns [`MaskResource`]s into mask sources, reading files relative to a root directory.
#[derive(Clone, Debug)]
pub struct ResourceLoader {
    root: PathBuf,
}

impl ResourceLoader {
    /// Resolve relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory for relative paths.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load and decode `resource`.
    pub fn load(&self, resource: &MaskResource) -> MaskResult<Arc<dyn MaskSource>> {
        match resource {
            MaskResource::Image(path) => {
                let bytes = self.read(path)?;
                Ok(Arc::new(BitmapMask::from_bytes(&bytes)?))
            }
            MaskResource::Svg(path) => {
                let bytes = self.read(path)?;
                Ok(Arc::new(SvgMask::from_bytes(&bytes)?))
            }
            MaskResource::Shape(spec) => Ok(Arc::new(ShapeMask::new(spec.kind, spec.color)?)),
            MaskResource::Animated(spec) => {
                let mut frames = Vec::with_capacity(spec.frames.len());
                for frame in &spec.frames {
                    if frame.duration_ms == 0 {
                        return Err(MaskError::validation(
                            "animation frame duration_ms must be > 0",
                        ));
                    }
                    frames.push(AnimationFrame::new(
                        self.load(&frame.mask)?,
                        Duration::from_millis(frame.duration_ms),
                    ));
                }
                Ok(Arc::new(AnimatedMask::new(frames, spec.one_shot)?))
            }
        }
    }

    fn read(&self, rel: &Path) -> MaskResult<Vec<u8>> {
        let path = self.root.join(rel);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read mask resource '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "loaded mask resource");
        Ok(bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resource.rs"]
mod tests;
