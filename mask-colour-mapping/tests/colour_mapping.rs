use constants::{MAX_LABEL, StyleTag, wheel_colour};
use mask_colour_mapping::{
    ChannelStatsStore, ColourResolver, EntityType, LabelColour, MaskCombinationRegistry,
    RenderableDescriptor, RenderableSet,
};

struct Board {
    renderables: RenderableSet,
    registry: MaskCombinationRegistry,
    stats: ChannelStatsStore,
    combination: u32,
}

const RED_FRAGMENT: LabelColour = LabelColour::new(200, 10, 10, StyleTag::Fragment);
const BLUE_FRAGMENT: LabelColour = LabelColour::new(10, 10, 200, StyleTag::Fragment);
const GREEN_COMPARTMENT: LabelColour = LabelColour::new(10, 200, 10, StyleTag::Compartment);

fn board() -> Board {
    let mut renderables = RenderableSet::new();
    renderables.push(
        RenderableDescriptor::new(1)
            .with_entity(1001, "neuron 1", EntityType::Fragment)
            .with_colour(RED_FRAGMENT),
    );
    renderables.push(
        RenderableDescriptor::new(2)
            .with_entity(1002, "neuron 2", EntityType::Fragment)
            .with_colour(BLUE_FRAGMENT),
    );
    renderables.push(RenderableDescriptor::new(3).with_entity(
        1003,
        "neuron 3",
        EntityType::Fragment,
    ));
    renderables.push(
        RenderableDescriptor::new(4)
            .with_entity(2004, "compartment 4", EntityType::Compartment)
            .with_colour(GREEN_COMPARTMENT),
    );
    renderables.push(RenderableDescriptor::new(5).with_entity(
        2005,
        "compartment 5",
        EntityType::Compartment,
    ));

    let mut stats = ChannelStatsStore::new();
    stats.record(1003, vec![0.5, 0.25, 0.125]);

    let mut registry = MaskCombinationRegistry::new();
    registry
        .set_first_synthetic_id(renderables.first_synthetic_id())
        .unwrap();
    // Fragment 1 was there first, so it dominates the overlap with 3.
    let combination = registry.resolve(3, 1).unwrap();

    Board {
        renderables,
        registry,
        stats,
        combination,
    }
}

#[test]
fn explicit_colours_pass_through_unchanged() {
    let b = board();
    let mapping =
        ColourResolver::build_mapping(&b.renderables, &b.registry, &b.stats).unwrap();

    assert_eq!(mapping.get(1), Some(RED_FRAGMENT));
    assert_eq!(mapping.get(2), Some(BLUE_FRAGMENT));
    assert_eq!(mapping.get(4), Some(GREEN_COMPARTMENT));
}

#[test]
fn averaged_fragment_uses_channel_means() {
    let b = board();
    let mapping =
        ColourResolver::build_mapping(&b.renderables, &b.registry, &b.stats).unwrap();

    let colour = mapping.get(3).unwrap();
    assert_eq!(colour.rgb(), [128, 64, 32]);
    assert_eq!(colour.style_tag(), Some(StyleTag::Fragment));
}

#[test]
fn bare_compartment_uses_palette_with_compartment_style() {
    let b = board();
    let mapping =
        ColourResolver::build_mapping(&b.renderables, &b.registry, &b.stats).unwrap();

    let colour = mapping.get(5).unwrap();
    assert_eq!(colour.rgb(), wheel_colour(5));
    assert_eq!(colour.style_tag(), Some(StyleTag::Compartment));
}

#[test]
fn combination_matches_dominant_fragment() {
    let b = board();
    assert_eq!(b.combination, 6);
    let mapping =
        ColourResolver::build_mapping(&b.renderables, &b.registry, &b.stats).unwrap();

    let colour = mapping.get(b.combination).unwrap();
    assert_eq!(colour.rgb(), RED_FRAGMENT.rgb());
    assert_eq!(colour.style, StyleTag::Fragment as u8);
    assert_eq!(mapping.len(), 6);
}

#[test]
fn unknown_label_without_entity_is_still_coloured() {
    let renderables: RenderableSet = [RenderableDescriptor::new(9)].into_iter().collect();
    let mut registry = MaskCombinationRegistry::new();
    registry.set_first_synthetic_id(10).unwrap();
    let mapping =
        ColourResolver::build_mapping(&renderables, &registry, &ChannelStatsStore::new())
            .unwrap();

    assert_eq!(
        mapping.get(9),
        Some(LabelColour::from_wheel(9, StyleTag::Compartment))
    );
}

#[test]
fn duplicate_label_last_writer_wins() {
    let mut b = board();
    b.renderables
        .push(RenderableDescriptor::new(2).with_colour(GREEN_COMPARTMENT));
    let mapping =
        ColourResolver::build_mapping(&b.renderables, &b.registry, &b.stats).unwrap();
    assert_eq!(mapping.get(2), Some(GREEN_COMPARTMENT));
}

#[test]
fn repeated_resolution_is_bit_identical() {
    let b = board();
    let mut resolver = ColourResolver::new();

    let first = resolver
        .compute_mapping(&b.renderables, &b.registry, &b.stats)
        .unwrap();
    let second = resolver
        .compute_mapping(&b.renderables, &b.registry, &b.stats)
        .unwrap();
    let uncached =
        ColourResolver::build_mapping(&b.renderables, &b.registry, &b.stats).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, uncached);
    assert_eq!(
        first.lookup_bytes(MAX_LABEL).unwrap(),
        uncached.lookup_bytes(MAX_LABEL).unwrap()
    );
}
