//! # mask-colour-mapping
//!
//! Canonical labels for overlapping segmentation masks and the colour lookup
//! the volume renderer uses to draw them.
//!
//! A voxel compositing pass folds every mask into one label volume. Voxels
//! claimed by several masks receive a synthetic label from the
//! [`MaskCombinationRegistry`], one per distinct set of overlapping masks.
//! Once compositing is done the [`ColourResolver`] turns every original and
//! synthetic label into a four-byte `[r, g, b, style]` colour.

pub mod colour;
pub mod compositor;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod session;
mod stamp;
pub mod stats;

pub use colour::LabelColour;
pub use compositor::{CompositeStats, MaskVoxels, VoxelCompositor, mask_voxel_counts};
pub use config::MappingConfig;
pub use descriptor::{BackingEntity, EntityType, RenderableDescriptor, RenderableSet};
pub use error::{MappingError, Result};
pub use manifest::{ManifestGenerator, MappingManifest};
pub use pipeline::{MaskMappingPipeline, PipelineOutput};
pub use registry::{CombinationRecord, MaskCombinationRegistry};
pub use resolver::{ColourMapping, ColourResolver};
pub use session::{ParentAppearance, Session, SessionRenderable};
pub use stats::{ChannelStatsSource, ChannelStatsStore};
