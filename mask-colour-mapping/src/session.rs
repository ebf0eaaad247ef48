/// Session input: renderables, channel statistics and mask voxels for one board
use crate::colour::LabelColour;
use crate::compositor::MaskVoxels;
use crate::descriptor::{BackingEntity, EntityType, RenderableDescriptor, RenderableSet};
use crate::error::Result;
use crate::stats::ChannelStatsStore;
use constants::StyleTag;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Number of voxels in the flattened label volume
    pub volume_size: usize,
    #[serde(default)]
    pub renderables: Vec<SessionRenderable>,
    #[serde(default)]
    pub channel_averages: ChannelStatsStore,
    #[serde(default)]
    pub masks: Vec<MaskVoxels>,
    /// Appearance set on the sample or compartment set holding the renderables
    #[serde(default)]
    pub parent: ParentAppearance,
}

impl Session {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let session: Session = serde_json::from_str(&text)?;
        log::info!(
            "[Session] Loaded {}: {} renderables, {} masks, {} voxels",
            path.display(),
            session.renderables.len(),
            session.masks.len(),
            session.volume_size
        );
        Ok(session)
    }

    pub fn renderable_set(&self) -> RenderableSet {
        self.renderables
            .iter()
            .map(|renderable| renderable.to_descriptor(&self.parent))
            .collect()
    }
}

fn default_visible() -> bool {
    true
}

/// Colour and pass-through settings inherited from the enclosing item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParentAppearance {
    #[serde(default)]
    pub colour_hex: Option<String>,
    #[serde(default)]
    pub pass_through: bool,
}

impl ParentAppearance {
    fn colour(&self) -> Option<[u8; 3]> {
        parse_hex(self.colour_hex.as_deref()?, "parent")
    }
}

fn parse_hex(hex: &str, owner: &str) -> Option<[u8; 3]> {
    let rgb = LabelColour::from_rgb_hex(hex, StyleTag::Fragment).map(|c| c.rgb());
    if rgb.is_none() {
        log::warn!("[Session] Ignoring unreadable colour {:?} on {}", hex, owner);
    }
    rgb
}

/// One renderable as the board describes it, before appearance rules apply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRenderable {
    pub translated_number: u32,
    /// Raw `[r, g, b, style]` bytes, used verbatim
    #[serde(default)]
    pub colour: Option<[u8; 4]>,
    /// `#rrggbb` chosen by the user; style follows the entity type
    #[serde(default)]
    pub colour_hex: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Show the raw signal instead of a flat colour
    #[serde(default)]
    pub pass_through: bool,
    #[serde(default)]
    pub entity: Option<BackingEntity>,
    #[serde(default)]
    pub voxel_count: u64,
}

impl SessionRenderable {
    pub fn to_descriptor(&self, parent: &ParentAppearance) -> RenderableDescriptor {
        RenderableDescriptor {
            translated_number: self.translated_number,
            explicit_colour: self.explicit_colour(parent),
            entity: self.entity.clone(),
            voxel_count: self.voxel_count,
        }
    }

    /// `None` leaves the label to channel averages or the colour wheel.
    fn explicit_colour(&self, parent: &ParentAppearance) -> Option<LabelColour> {
        if !self.visible {
            return Some(LabelColour::non_rendering());
        }
        if let Some(bytes) = self.colour {
            return Some(LabelColour::from_bytes(bytes));
        }

        let own = self
            .colour_hex
            .as_deref()
            .and_then(|hex| parse_hex(hex, &format!("label {}", self.translated_number)));
        let Some([r, g, b]) = own.or_else(|| parent.colour()) else {
            if self.pass_through || parent.pass_through {
                return Some(LabelColour::pass_through());
            }
            return None;
        };

        let is_compartment =
            self.entity.as_ref().map(|e| e.entity_type) == Some(EntityType::Compartment);
        if is_compartment {
            // The parent overrides every compartment on the board.
            if parent.pass_through {
                return Some(LabelColour::pass_through());
            }
            let [r, g, b] = parent.colour().unwrap_or([r, g, b]);
            return Some(LabelColour::new(r, g, b, StyleTag::Compartment));
        }

        let style = if self.pass_through {
            StyleTag::PassThrough
        } else {
            StyleTag::Fragment
        };
        Some(LabelColour::new(r, g, b, style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderable(json: &str) -> SessionRenderable {
        serde_json::from_str(json).unwrap()
    }

    fn colour_of(r: &SessionRenderable) -> Option<LabelColour> {
        r.to_descriptor(&ParentAppearance::default()).explicit_colour
    }

    fn parent(colour_hex: Option<&str>, pass_through: bool) -> ParentAppearance {
        ParentAppearance {
            colour_hex: colour_hex.map(str::to_string),
            pass_through,
        }
    }

    const FRAGMENT: &str = r#"{"id": 5, "name": "nf", "entity_type": "fragment"}"#;
    const COMPARTMENT: &str = r#"{"id": 6, "name": "c", "entity_type": "compartment"}"#;

    fn with_entity(fields: &str, entity: &str) -> SessionRenderable {
        renderable(&format!(r#"{{{}, "entity": {}}}"#, fields, entity))
    }

    #[test]
    fn hidden_renderable_is_non_rendering() {
        let r = renderable(r#"{"translated_number": 3, "colour": [1, 2, 3, 1], "visible": false}"#);
        assert_eq!(
            colour_of(&r),
            Some(LabelColour::non_rendering())
        );
    }

    #[test]
    fn hex_colour_takes_style_from_entity() {
        let fragment = renderable(
            r##"{"translated_number": 1, "colour_hex": "#102030",
                "entity": {"id": 5, "name": "nf", "entity_type": "fragment"}}"##,
        );
        let compartment = renderable(
            r##"{"translated_number": 2, "colour_hex": "102030",
                "entity": {"id": 6, "name": "c", "entity_type": "compartment"}}"##,
        );
        assert_eq!(
            colour_of(&fragment),
            Some(LabelColour::new(16, 32, 48, StyleTag::Fragment))
        );
        assert_eq!(
            colour_of(&compartment),
            Some(LabelColour::new(16, 32, 48, StyleTag::Compartment))
        );
    }

    #[test]
    fn unreadable_hex_degrades_to_no_colour() {
        let r = renderable(r#"{"translated_number": 1, "colour_hex": "nope"}"#);
        assert_eq!(colour_of(&r), None);
    }

    #[test]
    fn raw_bytes_win_over_hex() {
        let r = renderable(
            r#"{"translated_number": 1, "colour": [9, 9, 9, 3], "colour_hex": "ffffff"}"#,
        );
        assert_eq!(
            colour_of(&r),
            Some(LabelColour::from_bytes([9, 9, 9, 3]))
        );
    }

    #[test]
    fn pass_through_without_colour_shows_raw_signal() {
        let own = with_entity(r#""translated_number": 1, "pass_through": true"#, FRAGMENT);
        assert_eq!(colour_of(&own), Some(LabelColour::pass_through()));

        let inherited = with_entity(r#""translated_number": 2"#, FRAGMENT);
        assert_eq!(
            inherited.to_descriptor(&parent(None, true)).explicit_colour,
            Some(LabelColour::pass_through())
        );
        assert_eq!(colour_of(&inherited), None);
    }

    #[test]
    fn coloured_pass_through_fragment_keeps_its_colour() {
        let r = with_entity(
            r##""translated_number": 1, "colour_hex": "#0a0b0c", "pass_through": true"##,
            FRAGMENT,
        );
        assert_eq!(
            colour_of(&r),
            Some(LabelColour::new(10, 11, 12, StyleTag::PassThrough))
        );
    }

    #[test]
    fn uncoloured_fragment_inherits_parent_colour() {
        let r = with_entity(r#""translated_number": 1"#, FRAGMENT);
        assert_eq!(
            r.to_descriptor(&parent(Some("#203040"), false)).explicit_colour,
            Some(LabelColour::new(32, 48, 64, StyleTag::Fragment))
        );
    }

    #[test]
    fn parent_overrides_compartment_colour() {
        let r = with_entity(r##""translated_number": 2, "colour_hex": "#102030""##, COMPARTMENT);
        assert_eq!(
            r.to_descriptor(&parent(Some("#ffffff"), false)).explicit_colour,
            Some(LabelColour::new(255, 255, 255, StyleTag::Compartment))
        );
        assert_eq!(
            r.to_descriptor(&parent(Some("#ffffff"), true)).explicit_colour,
            Some(LabelColour::pass_through())
        );
    }

    #[test]
    fn hidden_beats_pass_through() {
        let r = renderable(r#"{"translated_number": 3, "visible": false, "pass_through": true}"#);
        assert_eq!(
            r.to_descriptor(&parent(None, true)).explicit_colour,
            Some(LabelColour::non_rendering())
        );
    }

    #[test]
    fn session_defaults_optional_sections() {
        let session: Session = serde_json::from_str(r#"{"volume_size": 8}"#).unwrap();
        assert!(session.renderables.is_empty());
        assert!(session.channel_averages.is_empty());
        assert!(session.renderable_set().is_empty());
        assert!(!session.parent.pass_through);
    }

    #[test]
    fn session_parent_applies_to_every_renderable() {
        let session: Session = serde_json::from_str(
            r#"{"volume_size": 4,
                "renderables": [{"translated_number": 1}, {"translated_number": 2}],
                "parent": {"pass_through": true}}"#,
        )
        .unwrap();
        let set = session.renderable_set();
        assert!(
            set.descriptors()
                .iter()
                .all(|d| d.explicit_colour == Some(LabelColour::pass_through()))
        );
    }
}
