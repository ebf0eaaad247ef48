/// Final label -> colour lookup for the renderer.
///
/// Each renderable takes the first of: its explicit colour, a colour built
/// from its entity's channel averages, or a colour wheel entry. Combination
/// labels borrow the colour of their dominant member so overlapping regions
/// match the mask drawn on top.
use crate::colour::LabelColour;
use crate::descriptor::{EntityType, RenderableDescriptor, RenderableSet};
use crate::error::{MappingError, Result};
use crate::registry::MaskCombinationRegistry;
use crate::stats::ChannelStatsSource;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColourMapping {
    entries: BTreeMap<u32, LabelColour>,
}

impl ColourMapping {
    pub fn get(&self, label: u32) -> Option<LabelColour> {
        self.entries.get(&label).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending label order
    pub fn iter(&self) -> impl Iterator<Item = (u32, LabelColour)> + '_ {
        self.entries.iter().map(|(&label, &colour)| (label, colour))
    }

    pub fn max_label(&self) -> Option<u32> {
        self.entries.keys().next_back().copied()
    }

    /// Dense table indexed by label. Labels without an entry are hidden and
    /// labels at or past `len` are left out.
    pub fn lookup_table(&self, len: usize) -> Vec<LabelColour> {
        let mut table = vec![LabelColour::non_rendering(); len];
        for (&label, &colour) in self
            .entries
            .iter()
            .take_while(|&(&label, _)| (label as usize) < len)
        {
            table[label as usize] = colour;
        }
        table
    }

    /// Dense table covering every mapped label, as raw RGBA bytes.
    /// Fails when a mapped label lies above `label_limit`.
    pub fn lookup_bytes(&self, label_limit: u32) -> Result<Vec<u8>> {
        let Some(max) = self.max_label() else {
            return Ok(Vec::new());
        };
        if max > label_limit {
            return Err(MappingError::LabelOutOfRange {
                label: max,
                max: label_limit,
            });
        }
        Ok(bytemuck::cast_slice(&self.lookup_table(max as usize + 1)).to_vec())
    }

    fn insert(&mut self, label: u32, colour: LabelColour) {
        self.entries.insert(label, colour);
    }
}

struct CachedMapping {
    renderables_version: u64,
    registry_generation: u64,
    mapping: ColourMapping,
}

/// Builds colour mappings, reusing the previous result while neither the
/// renderables nor the registry have changed.
#[derive(Default)]
pub struct ColourResolver {
    cache: Option<CachedMapping>,
}

impl ColourResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute_mapping<S>(
        &mut self,
        renderables: &RenderableSet,
        registry: &MaskCombinationRegistry,
        stats: &S,
    ) -> Result<ColourMapping>
    where
        S: ChannelStatsSource + Sync,
    {
        if let Some(cached) = &self.cache {
            if cached.renderables_version == renderables.version()
                && cached.registry_generation == registry.generation()
            {
                log::debug!("[ColourResolver] Reusing cached mapping");
                return Ok(cached.mapping.clone());
            }
        }

        let mapping = Self::build_mapping(renderables, registry, stats)?;
        self.cache = Some(CachedMapping {
            renderables_version: renderables.version(),
            registry_generation: registry.generation(),
            mapping: mapping.clone(),
        });
        Ok(mapping)
    }

    /// Resolve every renderable and combination without touching the cache.
    pub fn build_mapping<S>(
        renderables: &RenderableSet,
        registry: &MaskCombinationRegistry,
        stats: &S,
    ) -> Result<ColourMapping>
    where
        S: ChannelStatsSource + Sync,
    {
        // Shadowed duplicates are never resolved.
        let mut winners: Vec<&RenderableDescriptor> =
            renderables.label_index().into_values().collect();
        winners.sort_unstable_by_key(|d| d.translated_number);

        // Collected whole so the reported failure is the lowest failing label.
        let resolved = winners
            .par_iter()
            .map(|descriptor| -> Result<(u32, LabelColour)> {
                Ok((
                    descriptor.translated_number,
                    resolve_descriptor(descriptor, stats)?,
                ))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        let mut mapping = ColourMapping::default();
        for (label, colour) in resolved {
            mapping.insert(label, colour);
        }
        let renderable_count = mapping.len();

        for record in registry.records() {
            let id = record.canonical_id();
            if mapping.get(id).is_some() {
                continue;
            }
            let dominant = record.dominant_member();
            let colour = mapping
                .get(dominant)
                .unwrap_or_else(|| unclassified_colour(dominant));
            mapping.insert(id, colour);
        }

        log::info!(
            "[ColourResolver] Mapped {} renderable labels and {} combinations",
            renderable_count,
            mapping.len() - renderable_count
        );
        Ok(mapping)
    }
}

fn resolve_descriptor<S: ChannelStatsSource>(
    descriptor: &RenderableDescriptor,
    stats: &S,
) -> Result<LabelColour> {
    if let Some(colour) = descriptor.explicit_colour {
        return Ok(colour);
    }

    let Some(entity) = &descriptor.entity else {
        return Ok(unclassified_colour(descriptor.translated_number));
    };

    if let Some(averages) = stats.channel_averages(entity.id)? {
        return Ok(LabelColour::from_channel_averages(
            averages,
            entity.entity_type.derived_style(),
        ));
    }

    Ok(LabelColour::from_wheel(
        descriptor.translated_number,
        entity.entity_type.derived_style(),
    ))
}

/// Labels with no entity at all are shaded as compartments.
fn unclassified_colour(label: u32) -> LabelColour {
    LabelColour::from_wheel(label, EntityType::Compartment.derived_style())
}
