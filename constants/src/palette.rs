/// Fixed colour wheel for labels that carry neither an explicit colour nor
/// channel statistics. Indexed by translated label number modulo its length,
/// so neighbouring labels land on well separated hues.
pub const COLOUR_WHEEL: &[[u8; 3]] = &[
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
    [255, 0, 255],
    [0, 255, 255],
    [255, 128, 0],
    [128, 0, 255],
    [0, 255, 128],
    [255, 0, 128],
    [128, 255, 0],
    [0, 128, 255],
    [255, 128, 128],
    [128, 255, 128],
    [128, 128, 255],
    [192, 192, 192],
];

/// Palette entry for a label number.
pub fn wheel_colour(label: u32) -> [u8; 3] {
    COLOUR_WHEEL[label as usize % COLOUR_WHEEL.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_wraps_around() {
        let len = COLOUR_WHEEL.len() as u32;
        assert_eq!(wheel_colour(3), wheel_colour(3 + len));
        assert_eq!(wheel_colour(0), COLOUR_WHEEL[0]);
    }
}
