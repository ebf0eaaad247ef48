/// Canonical labels for voxels claimed by more than one mask.
///
/// The voxel label buffer holds a single integer per voxel, so every distinct
/// set of overlapping original labels is folded into one spare label above the
/// original label space. The same set always maps to the same label for the
/// lifetime of a session, which keeps repeated compositing passes reproducible.
use crate::error::{MappingError, Result};
use crate::stamp::next_stamp;
use constants::MAX_LABEL;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashMap};

/// Order-insensitive identity of a member set
type MemberKey = SmallVec<[u32; 8]>;

fn member_key(members: &[u32]) -> MemberKey {
    let mut key: MemberKey = members.iter().copied().collect();
    key.sort_unstable();
    key
}

/// One canonicalized set of overlapping original labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinationRecord {
    canonical_id: u32,
    /// Highest priority first: labels already present outrank later arrivals.
    members: Vec<u32>,
    voxel_count: u64,
}

impl CombinationRecord {
    pub fn canonical_id(&self) -> u32 {
        self.canonical_id
    }

    pub fn members(&self) -> &[u32] {
        &self.members
    }

    pub fn voxel_count(&self) -> u64 {
        self.voxel_count
    }

    pub fn expansion_count(&self) -> usize {
        self.members.len()
    }

    /// Member rendered on top of the others
    pub fn dominant_member(&self) -> u32 {
        self.members[0]
    }

    pub fn contains(&self, label: u32) -> bool {
        self.members.contains(&label)
    }
}

/// Single-writer registry of mask combinations.
///
/// Records live in an arena indexed by `canonical_id - first_synthetic_id`;
/// allocation is contiguous so the arena never has holes.
#[derive(Debug, Clone)]
pub struct MaskCombinationRegistry {
    first_synthetic_id: Option<u32>,
    max_label: u32,
    next_id: u64,
    records: Vec<CombinationRecord>,
    by_members: HashMap<MemberKey, u32>,
    by_original: HashMap<u32, Vec<u32>>,
    generation: u64,
}

impl Default for MaskCombinationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskCombinationRegistry {
    pub fn new() -> Self {
        Self::with_label_limit(MAX_LABEL)
    }

    /// Registry whose synthetic labels may not exceed `max_label`
    pub fn with_label_limit(max_label: u32) -> Self {
        Self {
            first_synthetic_id: None,
            max_label,
            next_id: 0,
            records: Vec::new(),
            by_members: HashMap::new(),
            by_original: HashMap::new(),
            generation: next_stamp(),
        }
    }

    /// Fix the boundary between original and synthetic labels.
    /// Must be called before the first `resolve` and cannot move once a
    /// combination has been allocated.
    pub fn set_first_synthetic_id(&mut self, first: u32) -> Result<()> {
        if first == 0 {
            return Err(MappingError::Configuration(
                "first synthetic id must be positive".to_string(),
            ));
        }
        if first > self.max_label {
            return Err(MappingError::Configuration(format!(
                "first synthetic id {} exceeds label limit {}",
                first, self.max_label
            )));
        }
        if !self.records.is_empty() && self.first_synthetic_id != Some(first) {
            return Err(MappingError::Configuration(format!(
                "cannot move synthetic boundary to {} after {} combinations were allocated",
                first,
                self.records.len()
            )));
        }

        self.first_synthetic_id = Some(first);
        self.next_id = first as u64 + self.records.len() as u64;
        self.generation = next_stamp();
        Ok(())
    }

    pub fn first_synthetic_id(&self) -> Option<u32> {
        self.first_synthetic_id
    }

    pub fn is_synthetic(&self, label: u32) -> bool {
        self.first_synthetic_id.is_some_and(|first| label >= first)
    }

    /// Fold `candidate` into a voxel currently holding `current`, returning
    /// the label the voxel should hold afterwards.
    pub fn resolve(&mut self, candidate: u32, current: u32) -> Result<u32> {
        let first = self.boundary()?;
        if candidate == current {
            return Ok(current);
        }
        if candidate >= first {
            return Err(MappingError::InvalidLabel {
                label: candidate,
                first_synthetic_id: first,
            });
        }

        if current < first {
            return self.find_or_allocate(vec![current, candidate]);
        }

        let index = self.slot(current)?;
        if self.records[index].contains(candidate) {
            self.records[index].voxel_count += 1;
            self.generation = next_stamp();
            return Ok(current);
        }

        let mut grown = self.records[index].members.clone();
        grown.push(candidate);
        let grown_id = self.find_or_allocate(grown)?;

        // The voxel has moved on to the grown set.
        let previous = &mut self.records[index];
        previous.voxel_count = previous.voxel_count.saturating_sub(1);
        Ok(grown_id)
    }

    pub fn record(&self, id: u32) -> Result<&CombinationRecord> {
        let index = self.slot(id)?;
        Ok(&self.records[index])
    }

    pub fn expansion_count(&self, id: u32) -> Result<usize> {
        self.record(id).map(CombinationRecord::expansion_count)
    }

    pub fn voxel_count(&self, id: u32) -> Result<u64> {
        self.record(id).map(CombinationRecord::voxel_count)
    }

    /// Every record in allocation order, including ones no voxel resolves to
    pub fn records(&self) -> impl Iterator<Item = &CombinationRecord> {
        self.records.iter()
    }

    /// Records still referenced by at least one voxel, in allocation order
    pub fn outstanding(&self) -> impl Iterator<Item = &CombinationRecord> {
        self.records.iter().filter(|r| r.voxel_count > 0)
    }

    /// All original labels sharing a combination with `original`, itself included.
    pub fn overlapping_labels(&self, original: u32) -> Vec<u32> {
        let mut labels = BTreeSet::from([original]);
        if let Some(ids) = self.by_original.get(&original) {
            for &id in ids {
                if let Ok(record) = self.record(id) {
                    labels.extend(record.members.iter().copied());
                }
            }
        }
        labels.into_iter().collect()
    }

    /// Canonical labels whose member count is above `max_depth`
    pub fn check_depth_exceeded(&self, max_depth: usize) -> Vec<u32> {
        let offenders: Vec<u32> = self
            .records
            .iter()
            .filter(|r| r.expansion_count() > max_depth)
            .map(|r| r.canonical_id)
            .collect();

        for &id in &offenders {
            if let Ok(record) = self.record(id) {
                log::warn!(
                    "[MaskRegistry] Combination {} holds {} masks, above the supported depth of {}",
                    id,
                    record.expansion_count(),
                    max_depth
                );
            }
        }
        offenders
    }

    pub fn log_outstanding(&self) {
        for record in self.outstanding() {
            log::debug!(
                "[MaskRegistry] {} -> {:?} voxels={} expansion={}",
                record.canonical_id,
                record.members,
                record.voxel_count,
                record.expansion_count()
            );
        }
    }

    /// Drop every combination; allocation restarts at the boundary.
    pub fn clear(&mut self) {
        self.records.clear();
        self.by_members.clear();
        self.by_original.clear();
        self.next_id = self.first_synthetic_id.map_or(0, u64::from);
        self.generation = next_stamp();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Restamped on every mutation; unique across registries in the process
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn boundary(&self) -> Result<u32> {
        self.first_synthetic_id.ok_or_else(|| {
            MappingError::Configuration(
                "first synthetic id must be set before resolving labels".to_string(),
            )
        })
    }

    fn slot(&self, id: u32) -> Result<usize> {
        match self.first_synthetic_id {
            Some(first) if id >= first && ((id - first) as usize) < self.records.len() => {
                Ok((id - first) as usize)
            }
            _ => Err(MappingError::NotFound(id)),
        }
    }

    fn find_or_allocate(&mut self, members: Vec<u32>) -> Result<u32> {
        let key = member_key(&members);
        let id = match self.by_members.get(&key) {
            Some(&id) => id,
            None => self.allocate(key, members)?,
        };

        let index = self.slot(id)?;
        self.records[index].voxel_count += 1;
        self.generation = next_stamp();
        Ok(id)
    }

    fn allocate(&mut self, key: MemberKey, members: Vec<u32>) -> Result<u32> {
        if self.next_id > self.max_label as u64 {
            return Err(MappingError::AllocatorExhausted {
                next: self.next_id,
                max: self.max_label,
            });
        }
        let id = self.next_id as u32;
        self.next_id += 1;

        for &member in &members {
            self.by_original.entry(member).or_default().push(id);
        }
        log::trace!("[MaskRegistry] Allocated {} for {:?}", id, members);

        self.by_members.insert(key, id);
        self.records.push(CombinationRecord {
            canonical_id: id,
            members,
            voxel_count: 0,
        });
        Ok(id)
    }
}
