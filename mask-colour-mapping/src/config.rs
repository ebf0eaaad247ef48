/// Session configuration for mask compositing and colour resolution
use crate::error::{MappingError, Result};
use constants::{DEFAULT_MAX_MASK_DEPTH, MAX_LABEL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// First label handed out for combinations. Derived from the renderables
    /// (highest translated number + 1) when absent.
    pub first_synthetic_id: Option<u32>,
    /// Highest label the voxel label buffer can hold.
    pub max_label: u32,
    /// Combinations deeper than this are reported after compositing.
    pub max_mask_depth: usize,
    /// Fragments with fewer voxels are dropped before compositing.
    pub minimum_voxel_count: Option<u64>,
    /// Only the largest N fragments are kept.
    pub maximum_fragment_count: Option<usize>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            first_synthetic_id: None,
            max_label: MAX_LABEL,
            max_mask_depth: DEFAULT_MAX_MASK_DEPTH,
            minimum_voxel_count: None,
            maximum_fragment_count: None,
        }
    }
}

impl MappingConfig {
    /// Load configuration from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: MappingConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::debug!("[MappingConfig] Loaded {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_synthetic_id == Some(0) {
            return Err(MappingError::Configuration(
                "first_synthetic_id must be positive".to_string(),
            ));
        }
        if let Some(first) = self.first_synthetic_id {
            if first > self.max_label {
                return Err(MappingError::Configuration(format!(
                    "first_synthetic_id {} exceeds max_label {}",
                    first, self.max_label
                )));
            }
        }
        if self.max_mask_depth < 2 {
            return Err(MappingError::Configuration(
                "max_mask_depth must allow at least two overlapping labels".to_string(),
            ));
        }
        Ok(())
    }
}
