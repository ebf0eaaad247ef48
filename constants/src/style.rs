use serde::{Deserialize, Serialize};

/// Shading mode baked into the fourth byte of every label colour.
/// The renderer switches its fragment shader path on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum StyleTag {
    NonRendering = 0,
    Fragment = 1,
    Compartment = 2,
    PassThrough = 3,
}

impl StyleTag {
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Decode a style byte read back from a colour entry.
    pub fn from_byte(byte: u8) -> Option<Self> {
        STYLE_MAP.iter().find(|s| s.tag as u8 == byte).map(|s| s.tag)
    }
}

pub struct StyleInfo {
    pub tag: StyleTag,
    pub name: &'static str,
}

pub const STYLE_MAP: &[StyleInfo] = &[
    StyleInfo {
        tag: StyleTag::NonRendering,
        name: "non-rendering",
    },
    StyleInfo {
        tag: StyleTag::Fragment,
        name: "fragment",
    },
    StyleInfo {
        tag: StyleTag::Compartment,
        name: "compartment",
    },
    StyleInfo {
        tag: StyleTag::PassThrough,
        name: "pass-through",
    },
];

pub fn get_style_name(byte: u8) -> String {
    STYLE_MAP
        .iter()
        .find(|s| s.tag as u8 == byte)
        .map_or("unknown", |s| s.name)
        .to_string()
}
