use std::path::Path;

use anyhow::Context as _;

use crate::assets::resource::MaskResource;
use crate::blend::mode::BlendOperator;
use crate::foundation::error::{Degraded, MaskError, MaskResult};

/// Index of `dst-in`, the default operator.
pub const DEFAULT_PORTER_DUFF_MODE: i32 = 5;

/// Construction-time settings of a [`crate::MaskedView`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskConfig {
    /// Initial mask source.
    pub mask: Option<MaskResource>,
    /// Blend table index (0–17); unknown values fall back to `dst-in`.
    pub porter_duff_mode: i32,
    /// Filter the mask while compositing it.
    pub anti_aliasing: bool,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            mask: None,
            porter_duff_mode: DEFAULT_PORTER_DUFF_MODE,
            anti_aliasing: false,
        }
    }
}

impl MaskConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> MaskResult<Self> {
        serde_json::from_str(json).map_err(|e| MaskError::serde(e.to_string()))
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: &Path) -> MaskResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read mask config '{}'", path.display()))?;
        Self::from_json(&json)
    }

    /// Operator selected by `porter_duff_mode`, or the substitution that was made.
    pub fn blend_operator(&self) -> Result<BlendOperator, Degraded> {
        BlendOperator::resolve_checked(self.porter_duff_mode)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/view/config.rs"]
mod tests;
