use perceptual_color::{Oklab, PerceptualColor, Srgb};
use serde::{Deserialize, Serialize};

/// The ordered colors produced by one extraction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Palette {
    colors: Vec<PerceptualColor>,
}

impl Palette {
    pub fn new(colors: Vec<PerceptualColor>) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &[PerceptualColor] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PerceptualColor> {
        self.colors.iter()
    }

    /// `#rrggbb` of every color, in palette order.
    pub fn hex_codes(&self) -> Vec<String> {
        self.colors.iter().map(PerceptualColor::to_hex).collect()
    }

    /// Smallest pairwise Okhsl distance, `None` for fewer than two colors.
    pub fn min_distance(&self) -> Option<f32> {
        let mut min: Option<f32> = None;
        for (i, a) in self.colors.iter().enumerate() {
            for b in &self.colors[i + 1..] {
                let d = a.perceptual_distance(b);
                min = Some(min.map_or(d, |m| m.min(d)));
            }
        }
        min
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a PerceptualColor;
    type IntoIter = std::slice::Iter<'a, PerceptualColor>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}

impl FromIterator<PerceptualColor> for Palette {
    fn from_iter<I: IntoIterator<Item = PerceptualColor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Serialized form of one palette color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRecord {
    /// Displayable (gamut-clipped) color
    pub hex: String,
    /// Device color, possibly outside 0..=1 for synthesized colors
    pub rgb: [f32; 3],
    /// Oklab `[L, a, b]`
    pub lab: [f32; 3],
    /// Okhsl `[h, s, l]`
    pub hsl: [f32; 3],
    /// Okhsv `[h, s, v]`
    pub hsv: [f32; 3],
    /// Display position `[saturation, lightness]`
    pub position: [f32; 2],
}

impl From<&PerceptualColor> for ColorRecord {
    fn from(color: &PerceptualColor) -> Self {
        let rgb = color.srgb();
        let hsl = color.okhsl();
        let hsv = color.okhsv();
        let (x, y) = color.position();
        Self {
            hex: color.to_hex(),
            rgb: [rgb.r, rgb.g, rgb.b],
            lab: color.oklab().to_array(),
            hsl: [hsl.h, hsl.s, hsl.l],
            hsv: [hsv.h, hsv.s, hsv.v],
            position: [x, y],
        }
    }
}

impl ColorRecord {
    /// Rebuild the color from its stored device values; the other fields
    /// are derived again rather than trusted.
    pub fn to_color(&self) -> PerceptualColor {
        let [r, g, b] = self.rgb;
        PerceptualColor::from_srgb(Srgb::new(r, g, b))
    }

    pub fn oklab(&self) -> Oklab {
        Oklab::from_array(self.lab)
    }
}

/// Serialized palette with a little provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteRecord {
    /// Input file the palette was extracted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Clustering method name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Number of clusters chosen by model selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,

    pub colors: Vec<ColorRecord>,
}

impl PaletteRecord {
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            source: None,
            method: None,
            k: None,
            colors: palette.iter().map(ColorRecord::from).collect(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>, k: Option<usize>) -> Self {
        self.method = Some(method.into());
        self.k = k;
        self
    }

    pub fn to_palette(&self) -> Palette {
        self.colors.iter().map(ColorRecord::to_color).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_palette() -> Palette {
        ["#d03020", "#2050c0", "#f0e0a0"]
            .iter()
            .map(|hex| hex.parse::<PerceptualColor>().unwrap())
            .collect()
    }

    #[test]
    fn test_hex_codes_in_order() {
        assert_eq!(
            sample_palette().hex_codes(),
            vec!["#d03020", "#2050c0", "#f0e0a0"]
        );
    }

    #[test]
    fn test_min_distance() {
        assert_eq!(Palette::default().min_distance(), None);

        let palette = sample_palette();
        let min = palette.min_distance().unwrap();
        let colors = palette.colors();
        let expected = colors[0]
            .perceptual_distance(&colors[1])
            .min(colors[0].perceptual_distance(&colors[2]))
            .min(colors[1].perceptual_distance(&colors[2]));
        assert_eq!(min, expected);
    }

    #[test]
    fn test_record_fields() {
        let color: PerceptualColor = "#2050c0".parse().unwrap();
        let record = ColorRecord::from(&color);

        assert_eq!(record.hex, "#2050c0");
        assert_eq!(record.lab, color.oklab().to_array());
        assert_eq!(record.position, [color.okhsl().s, color.okhsl().l]);
        assert_eq!(record.hsl[0], record.hsv[0], "Okhsl and Okhsv share hue");
    }

    #[test]
    fn test_record_rebuilds_palette() {
        let palette = sample_palette();
        let record = PaletteRecord::from_palette(&palette).with_method("kmeans", Some(3));
        let rebuilt = record.to_palette();

        assert_eq!(rebuilt.hex_codes(), palette.hex_codes());
        assert_eq!(record.method.as_deref(), Some("kmeans"));
        assert_eq!(record.k, Some(3));
    }

    #[test]
    fn test_json_omits_missing_provenance() {
        let record = PaletteRecord::from_palette(&Palette::default());
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"colors":[]}"#);
    }
}
