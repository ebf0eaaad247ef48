/// Mapping manifest handed to the texture upload stage.
use crate::error::Result;
use crate::pipeline::PipelineOutput;
use crate::registry::CombinationRecord;
use constants::get_style_name;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Colour entry for one label, original or synthetic.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ColourEntry {
    pub label: u32,
    pub rgb: [u8; 3],
    /// Raw style byte as the shader reads it.
    pub style_tag: u8,
    pub style: String,
}

/// Combination still referenced by at least one voxel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CombinationEntry {
    pub canonical_id: u32,
    pub members: Vec<u32>,
    pub voxel_count: u64,
    pub expansion_count: usize,
}

impl From<&CombinationRecord> for CombinationEntry {
    fn from(record: &CombinationRecord) -> Self {
        Self {
            canonical_id: record.canonical_id(),
            members: record.members().to_vec(),
            voxel_count: record.voxel_count(),
            expansion_count: record.expansion_count(),
        }
    }
}

/// Compositing totals recorded alongside the mapping.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompositeSummary {
    pub masks: usize,
    pub voxels_claimed: u64,
    pub overlaps_resolved: u64,
    pub combinations_allocated: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MappingManifest {
    /// Labels at or above this value are combinations.
    pub first_synthetic_id: Option<u32>,
    pub renderable_count: usize,
    pub colours: Vec<ColourEntry>,
    pub combinations: Vec<CombinationEntry>,
    /// Combinations deeper than the configured maximum.
    pub depth_exceeded: Vec<u32>,
    pub composite: CompositeSummary,
}

impl MappingManifest {
    pub fn from_output(output: &PipelineOutput) -> Self {
        let colours = output
            .mapping
            .iter()
            .map(|(label, colour)| ColourEntry {
                label,
                rgb: colour.rgb(),
                style_tag: colour.style,
                style: get_style_name(colour.style),
            })
            .collect();

        Self {
            first_synthetic_id: output.registry.first_synthetic_id(),
            renderable_count: output.renderables.len(),
            colours,
            combinations: output
                .registry
                .outstanding()
                .map(CombinationEntry::from)
                .collect(),
            depth_exceeded: output.depth_exceeded.clone(),
            composite: CompositeSummary {
                masks: output.composite.masks,
                voxels_claimed: output.composite.voxels_claimed,
                overlaps_resolved: output.composite.overlaps_resolved,
                combinations_allocated: output.registry.len(),
            },
        }
    }
}

/// Writes manifests next to the session they were produced from.
pub struct ManifestGenerator {
    output_path: PathBuf,
}

impl ManifestGenerator {
    pub fn new(output_path: &Path) -> Self {
        Self {
            output_path: output_path.to_path_buf(),
        }
    }

    pub fn write(&self, manifest: &MappingManifest) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(&self.output_path, manifest_json)?;

        log::info!(
            "[ManifestGenerator] Wrote {}",
            self.output_path.display()
        );
        self.log_summary(manifest);
        Ok(())
    }

    fn log_summary(&self, manifest: &MappingManifest) {
        log::info!("Manifest Summary:");
        log::info!("  Renderables: {}", manifest.renderable_count);
        log::info!("  Colour entries: {}", manifest.colours.len());
        log::info!(
            "  Combinations: {} outstanding of {} allocated",
            manifest.combinations.len(),
            manifest.composite.combinations_allocated
        );
        if !manifest.depth_exceeded.is_empty() {
            log::warn!(
                "  Combinations above depth limit: {:?}",
                manifest.depth_exceeded
            );
        }
    }
}
