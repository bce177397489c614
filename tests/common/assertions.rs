//! Assertion helpers for tests.

use okpalette::models::Palette;
use okpalette::perceptual_color::{PerceptualColor, Srgb};

/// Largest per-channel 8-bit difference tolerated for "the same" color.
pub const CHANNEL_TOLERANCE: u8 = 2;

/// Assert `color` displays within [`CHANNEL_TOLERANCE`] of `expected`.
pub fn assert_color_near(color: &PerceptualColor, expected: [u8; 3]) {
    let actual = color.displayable().to_bytes();
    let close = actual
        .iter()
        .zip(expected)
        .all(|(&a, e)| a.abs_diff(e) <= CHANNEL_TOLERANCE);
    assert!(
        close,
        "Expected a color near {}, got {}",
        Srgb::from_bytes(expected).to_hex(),
        color
    );
}

/// Assert some palette color is near each expected color, in any order.
pub fn assert_palette_matches(palette: &Palette, expected: &[[u8; 3]]) {
    assert_eq!(
        palette.len(),
        expected.len(),
        "Expected {} colors, got {:?}",
        expected.len(),
        palette.hex_codes()
    );
    for want in expected {
        let found = palette.iter().any(|c| {
            c.displayable()
                .to_bytes()
                .iter()
                .zip(want)
                .all(|(&a, &e)| a.abs_diff(e) <= CHANNEL_TOLERANCE)
        });
        assert!(
            found,
            "No color near {} in {:?}",
            Srgb::from_bytes(*want).to_hex(),
            palette.hex_codes()
        );
    }
}

/// Assert every pair of palette colors is at least `threshold` apart.
pub fn assert_separated(palette: &Palette, threshold: f32) {
    let colors = palette.colors();
    for (i, a) in colors.iter().enumerate() {
        for b in &colors[i + 1..] {
            let d = a.perceptual_distance(b);
            assert!(
                d >= threshold,
                "{a} and {b} are {d} apart, threshold {threshold}"
            );
        }
    }
}

/// Assert the bytes start with the PNG signature.
pub fn assert_png_file(path: &std::path::Path) {
    let bytes = std::fs::read(path).unwrap();
    assert!(
        bytes.starts_with(&[0x89, b'P', b'N', b'G']),
        "{} is not a PNG ({} bytes)",
        path.display(),
        bytes.len()
    );
}
