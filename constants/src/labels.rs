/// Largest label a voxel can hold. The label volume is uploaded as a single
/// 16-bit texture channel, so synthetic IDs must stay within it.
pub const MAX_LABEL: u32 = u16::MAX as u32;

/// Label written into voxels that no mask has claimed yet.
pub const EMPTY_LABEL: u32 = 0;

/// Combination depth above which a warning is raised after compositing
pub const DEFAULT_MAX_MASK_DEPTH: usize = 8;

/// Intensity used for the RGB bytes of hidden labels
pub const NON_RENDER_INTENSITY: u8 = 0;

/// Number of imaging channels folded into an averaged colour
pub const AVERAGED_CHANNEL_COUNT: usize = 3;
