use std::fmt;
use std::str::FromStr;

use resvg::tiny_skia::BlendMode;

use crate::foundation::error::{Degraded, MaskError, MaskResult};

/// Porter-Duff style operator used to composite the mask over drawn children.
///
/// The discriminant is the configuration index (0–17). Children are the destination, the mask is
/// the source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendOperator {
    /// Saturating sum of source and destination.
    Add = 0,
    /// Clears everything.
    Clear = 1,
    /// Per-channel minimum.
    Darken = 2,
    /// Keeps the destination.
    Dst = 3,
    /// Destination where the source is, source elsewhere.
    DstAtop = 4,
    /// Keeps the destination where the mask is opaque.
    #[default]
    DstIn = 5,
    /// Keeps the destination where the mask is transparent.
    DstOut = 6,
    /// Destination over source.
    DstOver = 7,
    /// Per-channel maximum.
    Lighten = 8,
    /// Component-wise product `[Sa * Da, Sc * Dc]`.
    Multiply = 9,
    /// Overlay separable blend.
    Overlay = 10,
    /// Screen separable blend.
    Screen = 11,
    /// Replaces the destination with the source.
    Src = 12,
    /// Source where the destination is, destination elsewhere.
    SrcAtop = 13,
    /// Keeps the source where the destination is opaque.
    SrcIn = 14,
    /// Keeps the source where the destination is transparent.
    SrcOut = 15,
    /// Source over destination.
    SrcOver = 16,
    /// Exclusive or of source and destination coverage.
    Xor = 17,
}

impl BlendOperator {
    /// Every operator, ordered by configuration index.
    pub const ALL: [BlendOperator; 18] = [
        Self::Add,
        Self::Clear,
        Self::Darken,
        Self::Dst,
        Self::DstAtop,
        Self::DstIn,
        Self::DstOut,
        Self::DstOver,
        Self::Lighten,
        Self::Multiply,
        Self::Overlay,
        Self::Screen,
        Self::Src,
        Self::SrcAtop,
        Self::SrcIn,
        Self::SrcOut,
        Self::SrcOver,
        Self::Xor,
    ];

    /// Look up a configuration index, `None` when it is outside the table.
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Resolve a configuration index. Unknown indices fall back to [`BlendOperator::DstIn`].
    pub fn resolve(index: i32) -> Self {
        Self::resolve_checked(index).unwrap_or_else(|_| Self::default())
    }

    /// Like [`BlendOperator::resolve`], but reports the substitution so callers can record it.
    pub fn resolve_checked(index: i32) -> Result<Self, Degraded> {
        match Self::from_index(index) {
            Some(op) => {
                tracing::debug!(index, mode = op.name(), "resolved blend mode");
                Ok(op)
            }
            None => {
                let degraded = Degraded::UnknownBlendIndex(index);
                tracing::warn!(index, mode = Self::default().name(), "{degraded}");
                Err(degraded)
            }
        }
    }

    /// Configuration index of this operator.
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Kebab-case name, e.g. `dst-in`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Clear => "clear",
            Self::Darken => "darken",
            Self::Dst => "dst",
            Self::DstAtop => "dst-atop",
            Self::DstIn => "dst-in",
            Self::DstOut => "dst-out",
            Self::DstOver => "dst-over",
            Self::Lighten => "lighten",
            Self::Multiply => "multiply",
            Self::Overlay => "overlay",
            Self::Screen => "screen",
            Self::Src => "src",
            Self::SrcAtop => "src-atop",
            Self::SrcIn => "src-in",
            Self::SrcOut => "src-out",
            Self::SrcOver => "src-over",
            Self::Xor => "xor",
        }
    }

    /// Rasterizer blend mode implementing this operator.
    pub fn to_blend_mode(self) -> BlendMode {
        match self {
            Self::Add => BlendMode::Plus,
            Self::Clear => BlendMode::Clear,
            Self::Darken => BlendMode::Darken,
            Self::Dst => BlendMode::Destination,
            Self::DstAtop => BlendMode::DestinationAtop,
            Self::DstIn => BlendMode::DestinationIn,
            Self::DstOut => BlendMode::DestinationOut,
            Self::DstOver => BlendMode::DestinationOver,
            Self::Lighten => BlendMode::Lighten,
            // Porter-Duff multiply is the plain component product, which Skia calls modulate.
            Self::Multiply => BlendMode::Modulate,
            Self::Overlay => BlendMode::Overlay,
            Self::Screen => BlendMode::Screen,
            Self::Src => BlendMode::Source,
            Self::SrcAtop => BlendMode::SourceAtop,
            Self::SrcIn => BlendMode::SourceIn,
            Self::SrcOut => BlendMode::SourceOut,
            Self::SrcOver => BlendMode::SourceOver,
            Self::Xor => BlendMode::Xor,
        }
    }
}

impl fmt::Display for BlendOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlendOperator {
    type Err = MaskError;

    /// Accepts kebab-case or snake-case names, case-insensitively.
    fn from_str(s: &str) -> MaskResult<Self> {
        let wanted = s.trim().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| MaskError::validation(format!("unknown blend operator '{s}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/mode.rs"]
mod tests;
