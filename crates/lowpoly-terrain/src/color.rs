//! Per-triangle face colors

use crate::config::{ColorMode, Coloring};
use crate::heightfield::HeightField;
use lowpoly_core::Color;
use rand::Rng;

/// Picks one color per triangle from the configured coloring mode.
pub struct ColorEvaluator<'a> {
    coloring: &'a Coloring,
    heights: &'a HeightField,
}

impl<'a> ColorEvaluator<'a> {
    pub fn new(coloring: &'a Coloring, heights: &'a HeightField) -> Self {
        Self { coloring, heights }
    }

    /// Color for the triangle `ids`. Random mode draws from `rng`; gradient
    /// mode is a pure function of the heights.
    pub fn evaluate<R: Rng + ?Sized>(&self, ids: [u32; 3], rng: &mut R) -> Color {
        match self.coloring.mode {
            ColorMode::Random => Color::rgb(rng.gen(), rng.gen(), rng.gen()),
            ColorMode::HeightGradient => {
                let t = self.normalized_height(ids);
                self.coloring.gradient.evaluate(t as f32)
            }
        }
    }

    /// Average elevation of the triangle mapped back into `[0, 1]` against
    /// the field's raw min/max.
    pub fn normalized_height(&self, ids: [u32; 3]) -> f64 {
        let average = ids.iter().map(|&id| self.heights.elevation(id)).sum::<f64>() / 3.0;
        self.heights.normalize(self.heights.unscale(average))
    }
}
