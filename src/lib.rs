//! maskview composites a mask over already-drawn content.
//!
//! A [`MaskedView`] owns one mask source (bitmap, SVG, solid shape, or a frame animation of
//! those), rasterizes it to a buffer matching the view size, and after the host has drawn the
//! children into a surface, draws that buffer on top with one of 18 Porter-Duff style
//! [`BlendOperator`]s.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: configuration index -> [`BlendOperator`] (unknown indices fall back to `dst-in`)
//! 2. **Rasterize**: mask source + view size -> [`MaskBuffer`] (on size change, mask change, new frame)
//! 3. **Swap**: the new buffer replaces and releases the previous one in the [`MaskCache`]
//! 4. **Composite**: every draw pass, the current buffer is drawn over the children
//!
//! Animated masks post their frame advances to a dedicated scheduler thread owned by the view;
//! each new frame goes through steps 2–3 on that thread and asks the host for a redraw.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Never fatal at draw time**: missing masks and unusable sizes degrade to unmasked or stale
//!   rendering and are reported as [`Degraded`], never as errors.
//! - **Premultiplied RGBA8** end-to-end, backed by `tiny-skia` pixmaps.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod animation;
mod assets;
mod blend;
mod foundation;
mod mask;
mod render;
mod view;

pub use resvg::tiny_skia;

pub use animation::scheduler::FrameScheduler;
pub use assets::decode::{decode_image, demultiply_to_rgba8, parse_svg};
pub use assets::resource::{AnimatedSpec, FrameSpec, MaskResource, ResourceLoader, ShapeSpec};
pub use blend::mode::BlendOperator;
pub use foundation::core::{Rect, ViewSize};
pub use foundation::error::{Degraded, MaskError, MaskResult};
pub use mask::animated::{AnimatedMask, AnimationFrame};
pub use mask::bitmap::BitmapMask;
pub use mask::shape::{ShapeKind, ShapeMask};
pub use mask::source::{CallbackSlot, FrameTask, FrameToken, MaskCallback, MaskSource};
pub use mask::svg::SvgMask;
pub use render::cache::{MaskBuffer, MaskCache};
pub use render::composite::{MaskPaint, composite};
pub use render::raster::{MAX_MASK_DIM, rasterize};
pub use view::config::{DEFAULT_PORTER_DUFF_MODE, MaskConfig};
pub use view::masked::{MaskedView, RedrawHost};
