/// Per-label render metadata built upstream for each compositing session.
use crate::colour::LabelColour;
use crate::stamp::next_stamp;
use constants::StyleTag;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Fragment,
    Compartment,
}

impl EntityType {
    /// Style used when the colour is derived rather than supplied
    pub fn derived_style(self) -> StyleTag {
        match self {
            EntityType::Fragment => StyleTag::Fragment,
            EntityType::Compartment => StyleTag::Compartment,
        }
    }
}

/// Entity backing a renderable label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackingEntity {
    pub id: u64,
    pub name: String,
    pub entity_type: EntityType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderableDescriptor {
    pub translated_number: u32,
    /// RGB plus a style byte already chosen by the caller.
    pub explicit_colour: Option<LabelColour>,
    pub entity: Option<BackingEntity>,
    pub voxel_count: u64,
}

impl RenderableDescriptor {
    pub fn new(translated_number: u32) -> Self {
        Self {
            translated_number,
            explicit_colour: None,
            entity: None,
            voxel_count: 0,
        }
    }

    pub fn with_entity(mut self, id: u64, name: &str, entity_type: EntityType) -> Self {
        self.entity = Some(BackingEntity {
            id,
            name: name.to_string(),
            entity_type,
        });
        self
    }

    pub fn with_colour(mut self, colour: LabelColour) -> Self {
        self.explicit_colour = Some(colour);
        self
    }

    pub fn with_voxel_count(mut self, voxel_count: u64) -> Self {
        self.voxel_count = voxel_count;
        self
    }

    pub fn entity_type(&self) -> Option<EntityType> {
        self.entity.as_ref().map(|e| e.entity_type)
    }

    pub fn is_compartment(&self) -> bool {
        self.entity_type() == Some(EntityType::Compartment)
    }

    /// Size filtering only ever applies to fragments
    fn is_filterable(&self) -> bool {
        self.entity_type() == Some(EntityType::Fragment)
    }
}

/// Ordered descriptor collection with a version stamp for memoized resolution.
#[derive(Debug, Clone)]
pub struct RenderableSet {
    descriptors: Vec<RenderableDescriptor>,
    version: u64,
}

impl Default for RenderableSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderableSet {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            version: next_stamp(),
        }
    }

    pub fn push(&mut self, descriptor: RenderableDescriptor) {
        self.descriptors.push(descriptor);
        self.version = next_stamp();
    }

    pub fn descriptors(&self) -> &[RenderableDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Descriptor owning each label; a later duplicate wins.
    pub fn label_index(&self) -> HashMap<u32, &RenderableDescriptor> {
        self.descriptors
            .iter()
            .map(|d| (d.translated_number, d))
            .collect()
    }

    pub fn last_used_label(&self) -> Option<u32> {
        self.descriptors.iter().map(|d| d.translated_number).max()
    }

    /// First label past every translated number in the set
    pub fn first_synthetic_id(&self) -> u32 {
        self.last_used_label().map_or(1, |last| last.saturating_add(1))
    }

    /// Overwrite voxel counts from a compositing survey
    pub fn set_voxel_counts(&mut self, counts: &HashMap<u32, u64>) {
        for descriptor in &mut self.descriptors {
            if let Some(&count) = counts.get(&descriptor.translated_number) {
                descriptor.voxel_count = count;
            }
        }
        self.version = next_stamp();
    }

    /// Largest first; ties go to the lower label number
    pub fn sort_by_priority(&mut self) {
        self.descriptors.sort_by(|a, b| {
            b.voxel_count
                .cmp(&a.voxel_count)
                .then(a.translated_number.cmp(&b.translated_number))
        });
        self.version = next_stamp();
    }

    /// Drop small fragments and keep at most `maximum_fragment_count` of the
    /// largest ones. Compartments and unclassified labels always survive.
    /// Returns the number of descriptors removed.
    pub fn filter_by_size(
        &mut self,
        minimum_voxel_count: Option<u64>,
        maximum_fragment_count: Option<usize>,
    ) -> usize {
        if minimum_voxel_count.is_none() && maximum_fragment_count.is_none() {
            return 0;
        }
        let before = self.descriptors.len();

        if let Some(minimum) = minimum_voxel_count {
            self.descriptors
                .retain(|d| !d.is_filterable() || d.voxel_count >= minimum);
        }

        if let Some(maximum) = maximum_fragment_count {
            let mut fragment_sizes: Vec<(u64, u32)> = self
                .descriptors
                .iter()
                .filter(|d| d.is_filterable())
                .map(|d| (d.voxel_count, d.translated_number))
                .collect();
            if fragment_sizes.len() > maximum {
                fragment_sizes.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
                let cutoff = fragment_sizes[maximum];
                self.descriptors.retain(|d| {
                    !d.is_filterable()
                        || (d.voxel_count, std::cmp::Reverse(d.translated_number))
                            > (cutoff.0, std::cmp::Reverse(cutoff.1))
                });
            }
        }

        let removed = before - self.descriptors.len();
        if removed > 0 {
            log::info!(
                "[RenderableSet] Filtered {} of {} renderables by size",
                removed,
                before
            );
            self.version = next_stamp();
        }
        removed
    }
}

impl FromIterator<RenderableDescriptor> for RenderableSet {
    fn from_iter<I: IntoIterator<Item = RenderableDescriptor>>(iter: I) -> Self {
        let descriptors: Vec<RenderableDescriptor> = iter.into_iter().collect();
        Self {
            descriptors,
            version: next_stamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(label: u32, voxels: u64) -> RenderableDescriptor {
        RenderableDescriptor::new(label)
            .with_entity(label as u64 * 100, "fragment", EntityType::Fragment)
            .with_voxel_count(voxels)
    }

    fn compartment(label: u32, voxels: u64) -> RenderableDescriptor {
        RenderableDescriptor::new(label)
            .with_entity(label as u64 * 100, "compartment", EntityType::Compartment)
            .with_voxel_count(voxels)
    }

    #[test]
    fn boundary_follows_highest_label() {
        let set: RenderableSet = [fragment(3, 1), fragment(54, 1), compartment(9, 1)]
            .into_iter()
            .collect();
        assert_eq!(set.last_used_label(), Some(54));
        assert_eq!(set.first_synthetic_id(), 55);
        assert_eq!(RenderableSet::new().first_synthetic_id(), 1);
    }

    #[test]
    fn duplicate_labels_resolve_to_last_descriptor() {
        let mut set = RenderableSet::new();
        set.push(fragment(4, 10));
        set.push(compartment(4, 20));
        let index = set.label_index();
        assert_eq!(index.len(), 1);
        assert!(index[&4].is_compartment());
    }

    #[test]
    fn equal_sets_built_separately_have_distinct_versions() {
        let a: RenderableSet = [fragment(1, 5)].into_iter().collect();
        let b: RenderableSet = [compartment(1, 5)].into_iter().collect();
        assert_ne!(a.version(), b.version());
        assert_ne!(RenderableSet::new().version(), RenderableSet::new().version());
    }

    #[test]
    fn priority_sort_puts_largest_first() {
        let mut set: RenderableSet = [fragment(1, 5), fragment(2, 50), fragment(3, 50)]
            .into_iter()
            .collect();
        let version = set.version();
        set.sort_by_priority();
        let order: Vec<u32> = set.descriptors().iter().map(|d| d.translated_number).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert!(set.version() > version);
    }

    #[test]
    fn minimum_size_filter_spares_compartments() {
        let mut set: RenderableSet = [fragment(1, 5), fragment(2, 50), compartment(3, 1)]
            .into_iter()
            .collect();
        assert_eq!(set.filter_by_size(Some(10), None), 1);
        let labels: Vec<u32> = set.descriptors().iter().map(|d| d.translated_number).collect();
        assert_eq!(labels, vec![2, 3]);
    }

    #[test]
    fn fragment_cap_keeps_largest() {
        let mut set: RenderableSet = [
            fragment(1, 5),
            fragment(2, 50),
            fragment(3, 20),
            fragment(4, 20),
            RenderableDescriptor::new(9),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.filter_by_size(None, Some(2)), 2);
        let labels: Vec<u32> = set.descriptors().iter().map(|d| d.translated_number).collect();
        assert_eq!(labels, vec![2, 3, 9]);
    }

    #[test]
    fn no_limits_leaves_set_untouched() {
        let mut set: RenderableSet = [fragment(1, 5)].into_iter().collect();
        let version = set.version();
        assert_eq!(set.filter_by_size(None, None), 0);
        assert_eq!(set.version(), version);
    }
}
