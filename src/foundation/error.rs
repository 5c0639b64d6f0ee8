/// Convenience result type used across maskview.
pub type MaskResult<T> = Result<T, MaskError>;

/// Errors raised at the loading/configuration boundary.
///
/// Nothing in the draw loop returns these; runtime conditions degrade instead (see [`Degraded`]).
#[derive(thiserror::Error, Debug)]
pub enum MaskError {
    /// Invalid user-provided configuration or mask parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// A mask resource could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MaskError {
    /// Build a [`MaskError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MaskError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`MaskError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Non-fatal pipeline conditions.
///
/// Each of these is logged and leaves the view either unmasked or showing a stale mask until the
/// next trigger (size change, mask change, animation frame).
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degraded {
    /// No mask buffer is available at draw time.
    #[error("no mask configured, drawing children unmasked")]
    NoMaskConfigured,

    /// The view has a zero or negative dimension.
    #[error("cannot create mask with zero dimension ({width}x{height})")]
    ZeroDimension {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },

    /// Rasterization was requested without a mask source.
    #[error("no mask loaded, view unmasked")]
    RasterizeSkipped,

    /// A blend index outside the known table was substituted with `dst-in`.
    #[error("unknown blend index {0}, using dst-in")]
    UnknownBlendIndex(i32),

    /// The mask buffer could not be allocated for the requested size.
    #[error("cannot allocate {width}x{height} mask buffer")]
    AllocationFailed {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
