/// Per-entity mean channel intensities recorded by the upstream statistics pass
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read side of the statistics collaborator.
pub trait ChannelStatsSource {
    /// Averages in [0,1] for `entity_id`, or `None` when nothing was recorded.
    fn channel_averages(&self, entity_id: u64) -> Result<Option<&[f64]>>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelStatsStore {
    averages: HashMap<u64, Vec<f64>>,
}

impl ChannelStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entity_id: u64, averages: Vec<f64>) {
        self.averages.insert(entity_id, averages);
    }

    pub fn len(&self) -> usize {
        self.averages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.averages.is_empty()
    }
}

impl ChannelStatsSource for ChannelStatsStore {
    fn channel_averages(&self, entity_id: u64) -> Result<Option<&[f64]>> {
        Ok(self
            .averages
            .get(&entity_id)
            .map(Vec::as_slice)
            .filter(|averages| !averages.is_empty()))
    }
}
