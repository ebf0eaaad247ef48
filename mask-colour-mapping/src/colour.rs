/// Four-byte label colours: RGB plus the renderer style tag
use bytemuck::{Pod, Zeroable};
use constants::{AVERAGED_CHANNEL_COUNT, NON_RENDER_INTENSITY, StyleTag, wheel_colour};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct LabelColour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub style: u8,
}

impl LabelColour {
    pub const fn new(r: u8, g: u8, b: u8, style: StyleTag) -> Self {
        Self {
            r,
            g,
            b,
            style: style as u8,
        }
    }

    /// Colour for labels the renderer must skip
    pub const fn non_rendering() -> Self {
        Self::new(
            NON_RENDER_INTENSITY,
            NON_RENDER_INTENSITY,
            NON_RENDER_INTENSITY,
            StyleTag::NonRendering,
        )
    }

    /// Black with the pass-through style; the renderer shows the raw signal.
    pub const fn pass_through() -> Self {
        Self::new(0, 0, 0, StyleTag::PassThrough)
    }

    /// Take four raw bytes as-is; the style byte is trusted.
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
            style: bytes[3],
        }
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.style]
    }

    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn style_tag(&self) -> Option<StyleTag> {
        StyleTag::from_byte(self.style)
    }

    /// Map mean channel intensities in [0,1] to bytes. Only the first three
    /// channels are used; missing channels stay dark.
    pub fn from_channel_averages(averages: &[f64], style: StyleTag) -> Self {
        let mut rgb = [0u8; 3];
        for (byte, &average) in rgb
            .iter_mut()
            .zip(averages.iter().take(AVERAGED_CHANNEL_COUNT))
        {
            *byte = average_to_byte(average);
        }
        Self::new(rgb[0], rgb[1], rgb[2], style)
    }

    /// Colour wheel entry for a translated label number
    pub fn from_wheel(label: u32, style: StyleTag) -> Self {
        let [r, g, b] = wheel_colour(label);
        Self::new(r, g, b, style)
    }

    /// Parse `rrggbb` or `#rrggbb`
    pub fn from_rgb_hex(text: &str, style: StyleTag) -> Option<Self> {
        let hex = text.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, style))
    }
}

fn average_to_byte(average: f64) -> u8 {
    if average.is_nan() {
        return 0;
    }
    (average.clamp(0.0, 1.0) * 255.0).round() as u8
}
