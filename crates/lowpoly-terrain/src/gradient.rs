//! Color gradients keyed by normalized height

use lowpoly_core::{Color, Result, TerrainError};
use serde::{Deserialize, Serialize};

/// A color pinned at a position in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f32,
    pub color: Color,
}

impl GradientStop {
    pub fn new(position: f32, color: Color) -> Self {
        Self { position, color }
    }
}

/// Ordered color stops, linearly blended between neighbours.
///
/// Lookups before the first stop return the first color and lookups past
/// the last stop return the last color.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    stops: Vec<GradientStop>,
}

impl Gradient {
    /// Build a gradient, sorting the stops by position.
    pub fn new(mut stops: Vec<GradientStop>) -> Self {
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self { stops }
    }

    pub fn two_stop(from: Color, to: Color) -> Self {
        Self::new(vec![GradientStop::new(0.0, from), GradientStop::new(1.0, to)])
    }

    /// Valley-to-peak palette used when no gradient is configured.
    pub fn terrain() -> Self {
        Self::new(vec![
            GradientStop::new(0.0, Color::from_hex(0x264653)),
            GradientStop::new(0.3, Color::from_hex(0x2A9D8F)),
            GradientStop::new(0.5, Color::from_hex(0x8AB17D)),
            GradientStop::new(0.75, Color::from_hex(0x9C8B6E)),
            GradientStop::new(1.0, Color::from_hex(0xF1FAEE)),
        ])
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Check that the gradient has stops and that every stop sits in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.stops.is_empty() {
            return Err(TerrainError::InvalidConfiguration(
                "height gradient has no color stops".to_string(),
            ));
        }
        for stop in &self.stops {
            if !(0.0..=1.0).contains(&stop.position) {
                return Err(TerrainError::ValueOutOfRange {
                    field: "coloring.gradient.position".to_string(),
                    min: 0.0,
                    max: 1.0,
                    value: stop.position as f64,
                });
            }
        }
        Ok(())
    }

    /// Color at `t`, clamped to `[0, 1]`.
    pub fn evaluate(&self, t: f32) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let Some(first) = self.stops.first() else {
            return Color::MAGENTA;
        };

        let upper = match self.stops.iter().position(|s| s.position >= t) {
            Some(0) => return first.color,
            Some(i) => i,
            None => return self.stops[self.stops.len() - 1].color,
        };

        let lo = &self.stops[upper - 1];
        let hi = &self.stops[upper];
        let span = hi.position - lo.position;
        if span <= 0.0 {
            return hi.color;
        }
        lo.color.lerp(&hi.color, (t - lo.position) / span)
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::terrain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-5
            && (a.g - b.g).abs() < 1e-5
            && (a.b - b.b).abs() < 1e-5
            && (a.a - b.a).abs() < 1e-5
    }

    #[test]
    fn black_to_white_midpoint_is_gray() {
        let g = Gradient::two_stop(Color::BLACK, Color::WHITE);
        assert!(approx(g.evaluate(0.5), Color::rgb(0.5, 0.5, 0.5)));
        assert!(approx(g.evaluate(0.0), Color::BLACK));
        assert!(approx(g.evaluate(1.0), Color::WHITE));
    }

    #[test]
    fn lookups_outside_the_range_clamp() {
        let g = Gradient::two_stop(Color::BLACK, Color::WHITE);
        assert!(approx(g.evaluate(-3.0), Color::BLACK));
        assert!(approx(g.evaluate(7.5), Color::WHITE));
        assert!(approx(g.evaluate(f32::NAN), Color::BLACK));
    }

    #[test]
    fn stops_are_sorted_and_inner_stops_hold_before_first() {
        let red = Color::rgb(1.0, 0.0, 0.0);
        let blue = Color::rgb(0.0, 0.0, 1.0);
        let g = Gradient::new(vec![GradientStop::new(0.8, blue), GradientStop::new(0.2, red)]);

        assert_eq!(g.stops()[0].position, 0.2);
        assert!(approx(g.evaluate(0.1), red));
        assert!(approx(g.evaluate(0.9), blue));
        assert!(approx(g.evaluate(0.5), Color::rgb(0.5, 0.0, 0.5)));
    }

    #[test]
    fn validation_rejects_empty_and_out_of_range_stops() {
        assert!(Gradient::new(Vec::new()).validate().is_err());

        let bad = Gradient::new(vec![GradientStop::new(1.5, Color::WHITE)]);
        let err = bad.validate().unwrap_err();
        assert!(err.is_configuration_error());

        assert!(Gradient::terrain().validate().is_ok());
    }
}
