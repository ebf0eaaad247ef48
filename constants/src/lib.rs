/// Constants shared between the mask compositing pipeline and its consumers
pub mod labels;
pub mod palette;
pub mod style;

pub use labels::{
    AVERAGED_CHANNEL_COUNT, DEFAULT_MAX_MASK_DEPTH, EMPTY_LABEL, MAX_LABEL, NON_RENDER_INTENSITY,
};
pub use palette::{COLOUR_WHEEL, wheel_colour};
pub use style::{STYLE_MAP, StyleInfo, StyleTag, get_style_name};
