/// Error type shared by the registry, resolver and session loading.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unknown canonical label {0}")]
    NotFound(u32),

    #[error("canonical label space exhausted: next label {next} exceeds maximum {max}")]
    AllocatorExhausted { next: u64, max: u32 },

    #[error("label {label} is in the synthetic range starting at {first_synthetic_id}")]
    InvalidLabel { label: u32, first_synthetic_id: u32 },

    #[error("label {label} exceeds the label limit {max}")]
    LabelOutOfRange { label: u32, max: u32 },

    #[error("voxel index {index} outside volume of {volume_size} voxels")]
    VoxelOutOfRange { index: usize, volume_size: usize },

    #[error("channel statistics unavailable for entity {entity_id}: {reason}")]
    Stats { entity_id: u64, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MappingError>;
