/// Voxel compositing pass folding mask voxels into a single label volume
use crate::error::{MappingError, Result};
use crate::registry::MaskCombinationRegistry;
use constants::EMPTY_LABEL;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Voxels claimed by one original label, as flat volume indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskVoxels {
    pub label: u32,
    pub voxels: Vec<usize>,
}

/// Summary of one compositing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeStats {
    pub masks: usize,
    pub voxels_claimed: u64,
    pub overlaps_resolved: u64,
}

pub struct VoxelCompositor {
    volume: Vec<u32>,
}

impl VoxelCompositor {
    /// Create an empty label volume of `volume_size` voxels
    pub fn new(volume_size: usize) -> Self {
        Self {
            volume: vec![EMPTY_LABEL; volume_size],
        }
    }

    pub fn volume(&self) -> &[u32] {
        &self.volume
    }

    pub fn into_volume(self) -> Vec<u32> {
        self.volume
    }

    /// Fold masks into the volume in order. Masks applied earlier take
    /// priority over later ones wherever they overlap.
    pub fn composite(
        &mut self,
        registry: &mut MaskCombinationRegistry,
        masks: &[MaskVoxels],
    ) -> Result<CompositeStats> {
        let pb = ProgressBar::new(masks.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} masks ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("▉▊▋▌▍▎▏ "),
        );
        pb.set_message("Compositing masks");

        let mut stats = CompositeStats::default();
        for mask in masks {
            self.composite_mask(registry, mask, &mut stats)?;
            pb.inc(1);
        }
        pb.finish_with_message("Compositing complete");

        log::info!(
            "[VoxelCompositor] {} masks, {} voxels claimed, {} overlaps, {} combinations",
            stats.masks,
            stats.voxels_claimed,
            stats.overlaps_resolved,
            registry.len()
        );
        Ok(stats)
    }

    fn composite_mask(
        &mut self,
        registry: &mut MaskCombinationRegistry,
        mask: &MaskVoxels,
        stats: &mut CompositeStats,
    ) -> Result<()> {
        let volume_size = self.volume.len();
        for &index in &mask.voxels {
            let slot = self
                .volume
                .get_mut(index)
                .ok_or(MappingError::VoxelOutOfRange { index, volume_size })?;

            if *slot == EMPTY_LABEL {
                *slot = mask.label;
                stats.voxels_claimed += 1;
            } else if *slot != mask.label {
                *slot = registry.resolve(mask.label, *slot)?;
                stats.overlaps_resolved += 1;
            }
        }
        stats.masks += 1;
        Ok(())
    }
}

/// Voxel counts per original label, summed across masks sharing a label
pub fn mask_voxel_counts(masks: &[MaskVoxels]) -> HashMap<u32, u64> {
    masks
        .par_iter()
        .fold(HashMap::new, |mut counts: HashMap<u32, u64>, mask| {
            *counts.entry(mask.label).or_insert(0) += mask.voxels.len() as u64;
            counts
        })
        .reduce(HashMap::new, |mut left, right| {
            for (label, count) in right {
                *left.entry(label).or_insert(0) += count;
            }
            left
        })
}
