/// Session pipeline: size filtering, mask compositing, then colour resolution.
use crate::compositor::{CompositeStats, MaskVoxels, VoxelCompositor, mask_voxel_counts};
use crate::config::MappingConfig;
use crate::descriptor::RenderableSet;
use crate::error::{MappingError, Result};
use crate::registry::MaskCombinationRegistry;
use crate::resolver::{ColourMapping, ColourResolver};
use crate::session::Session;
use std::collections::HashMap;

/// Everything produced by one run, handed on to manifest generation and upload
pub struct PipelineOutput {
    pub renderables: RenderableSet,
    pub registry: MaskCombinationRegistry,
    pub mapping: ColourMapping,
    pub volume: Vec<u32>,
    pub composite: CompositeStats,
    pub depth_exceeded: Vec<u32>,
}

pub struct MaskMappingPipeline {
    config: MappingConfig,
    resolver: ColourResolver,
}

impl MaskMappingPipeline {
    pub fn new(config: MappingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            resolver: ColourResolver::new(),
        })
    }

    /// Run the full compositing and colouring pass for a session
    pub fn run(&mut self, session: &Session) -> Result<PipelineOutput> {
        let renderables = self.prepare_renderables(session);
        let masks = ordered_masks(&renderables, &session.masks);

        let first_synthetic_id = match self.config.first_synthetic_id {
            Some(first) => check_boundary(first, &renderables)?,
            None => renderables.first_synthetic_id(),
        };
        log::info!(
            "[Pipeline] {} renderables, {} masks, synthetic labels start at {}",
            renderables.len(),
            masks.len(),
            first_synthetic_id
        );

        let mut registry = MaskCombinationRegistry::with_label_limit(self.config.max_label);
        registry.set_first_synthetic_id(first_synthetic_id)?;

        let mut compositor = VoxelCompositor::new(session.volume_size);
        let composite = compositor.composite(&mut registry, &masks)?;

        let depth_exceeded = registry.check_depth_exceeded(self.config.max_mask_depth);
        if log::log_enabled!(log::Level::Debug) {
            registry.log_outstanding();
        }

        // Compositing is finished; the registry is read-only from here on.
        let mapping =
            self.resolver
                .compute_mapping(&renderables, &registry, &session.channel_averages)?;

        Ok(PipelineOutput {
            renderables,
            registry,
            mapping,
            volume: compositor.into_volume(),
            composite,
            depth_exceeded,
        })
    }

    /// Size renderables from the masks, apply the size filters and put them in
    /// compositing priority order.
    fn prepare_renderables(&self, session: &Session) -> RenderableSet {
        let mut renderables = session.renderable_set();
        let counts = mask_voxel_counts(&session.masks);
        if !counts.is_empty() {
            renderables.set_voxel_counts(&counts);
        }
        renderables.filter_by_size(
            self.config.minimum_voxel_count,
            self.config.maximum_fragment_count,
        );
        renderables.sort_by_priority();
        renderables
    }
}

/// A configured boundary must sit above every surviving translated number.
fn check_boundary(first: u32, renderables: &RenderableSet) -> Result<u32> {
    match renderables.last_used_label() {
        Some(last) if first <= last => Err(MappingError::Configuration(format!(
            "first_synthetic_id {} does not clear renderable label {}",
            first, last
        ))),
        _ => Ok(first),
    }
}

/// Masks belonging to surviving renderables, in renderable priority order.
/// Masks of the same label keep their session order.
fn ordered_masks(renderables: &RenderableSet, masks: &[MaskVoxels]) -> Vec<MaskVoxels> {
    let rank: HashMap<u32, usize> = renderables
        .descriptors()
        .iter()
        .enumerate()
        .map(|(position, d)| (d.translated_number, position))
        .collect();

    let mut kept: Vec<(usize, &MaskVoxels)> = masks
        .iter()
        .filter_map(|mask| rank.get(&mask.label).map(|&position| (position, mask)))
        .collect();

    let dropped = masks.len() - kept.len();
    if dropped > 0 {
        log::info!(
            "[Pipeline] Skipping {} masks without a surviving renderable",
            dropped
        );
    }

    kept.sort_by_key(|(position, _)| *position);
    kept.into_iter().map(|(_, mask)| mask.clone()).collect()
}
