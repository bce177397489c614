use perceptual_color::PerceptualColor;
use rand::seq::SliceRandom;
use rand::Rng;

/// Drops palette colors that are perceptually too close to others.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteDeduplicator {
    threshold: f32,
}

impl PaletteDeduplicator {
    /// `threshold` is the minimum Okhsl distance between kept colors. Zero
    /// or less keeps every color.
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Visit the colors in an order shuffled by `rng`, then filter.
    pub fn filter(&self, colors: &[PerceptualColor], rng: &mut impl Rng) -> Vec<PerceptualColor> {
        let mut order = colors.to_vec();
        order.shuffle(rng);
        self.filter_in_order(&order)
    }

    /// Filter with the visiting order given by the slice.
    ///
    /// A candidate is kept when it is more than `threshold` away from every
    /// color not yet excluded: the colors already kept and the ones still
    /// waiting. A color exactly `threshold` away counts as a duplicate. A
    /// rejected color no longer blocks later candidates. Every pair in the
    /// result is therefore more than `threshold` apart, and the
    /// last candidate always survives unless a kept color is close to it.
    pub fn filter_in_order(&self, colors: &[PerceptualColor]) -> Vec<PerceptualColor> {
        if self.threshold <= 0.0 || colors.len() < 2 {
            return colors.to_vec();
        }

        let mut kept: Vec<PerceptualColor> = Vec::with_capacity(colors.len());
        for (i, candidate) in colors.iter().enumerate() {
            let near = |other: &PerceptualColor| {
                candidate.perceptual_distance(other) <= self.threshold
            };
            if kept.iter().any(near) || colors[i + 1..].iter().any(near) {
                continue;
            }
            kept.push(*candidate);
        }

        tracing::debug!(
            before = colors.len(),
            after = kept.len(),
            threshold = self.threshold,
            "Deduplicated palette"
        );
        kept
    }
}

/// Convenience wrapper for [`PaletteDeduplicator::filter`].
pub fn deduplicate(
    colors: &[PerceptualColor],
    threshold: f32,
    rng: &mut impl Rng,
) -> Vec<PerceptualColor> {
    PaletteDeduplicator::new(threshold).filter(colors, rng)
}

/// Convenience wrapper for [`PaletteDeduplicator::filter_in_order`].
pub fn deduplicate_in_order(colors: &[PerceptualColor], threshold: f32) -> Vec<PerceptualColor> {
    PaletteDeduplicator::new(threshold).filter_in_order(colors)
}
