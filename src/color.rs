use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::ClassLabel;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Blue heat-map shade for a normalized intensity in `[0, 1]`.
/// Low counts render near-white, high counts a saturated blue.
pub fn heat_color(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    let hsl = Hsl::new(210.0, 0.75, 0.96 - 0.58 * t);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Text colour that stays readable on top of [`heat_color`].
pub fn heat_text_color(t: f64) -> Color32 {
    if t > 0.55 {
        Color32::WHITE
    } else {
        Color32::from_gray(40)
    }
}

// ---------------------------------------------------------------------------
// Class palette: class label → Color32
// ---------------------------------------------------------------------------

/// Maps the class labels of a condition target to distinct colours for the
/// distribution chart and its legend.
#[derive(Debug, Clone)]
pub struct ClassPalette {
    mapping: BTreeMap<ClassLabel, Color32>,
    default_color: Color32,
}

impl ClassPalette {
    /// Build a palette for sorted class labels.
    pub fn new<'a>(classes: impl ExactSizeIterator<Item = &'a ClassLabel>) -> Self {
        let palette = generate_palette(classes.len());
        let mapping: BTreeMap<ClassLabel, Color32> = classes
            .zip(palette.into_iter())
            .map(|(label, color)| (label.clone(), color))
            .collect();

        ClassPalette {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, label: &ClassLabel) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}
