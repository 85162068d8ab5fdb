//! Layered Perlin elevation per triangulation vertex

use crate::config::NoiseSettings;
use crate::triangulate::Vertex;
use lowpoly_core::{Result, TerrainError};
use noise::{NoiseFn, Perlin};

/// Valleys are scaled by `height_scale / VALLEY_COMPRESSION`, peaks by the
/// full `height_scale`.
pub const VALLEY_COMPRESSION: f64 = 10.0;

/// Permutation seed of the Perlin lattice. The configured seed shifts the
/// sample coordinates instead of reseeding the lattice.
const LATTICE_SEED: u32 = 0;

/// Seed-stable 2D coherent noise in `[0, 1]`.
pub struct CoherentNoise {
    perlin: Perlin,
}

impl CoherentNoise {
    pub fn new() -> Self {
        Self {
            perlin: Perlin::new(LATTICE_SEED),
        }
    }

    pub fn sample(&self, x: f64, y: f64) -> f64 {
        ((self.perlin.get([x, y]) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

impl Default for CoherentNoise {
    fn default() -> Self {
        Self::new()
    }
}

/// Elevations indexed by vertex id, plus the raw noise range.
///
/// Built once per generation pass and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    elevations: Vec<f64>,
    min_raw: f64,
    max_raw: f64,
    height_scale: f64,
}

impl HeightField {
    /// Accumulate `settings.octaves` layers of noise for every vertex.
    ///
    /// `vertices` must be ordered by id. A height that is non-finite, or
    /// that overflows `f32` once scaled, is reported as an error rather
    /// than stored.
    pub fn compute(vertices: &[Vertex], settings: &NoiseSettings) -> Result<Self> {
        let noise = CoherentNoise::new();
        let seed = settings.seed as f64;

        let mut raw = Vec::with_capacity(vertices.len());
        for vertex in vertices {
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            let mut noise_height = 0.0;

            for _ in 0..settings.octaves {
                let sample_x = vertex.position.x / settings.scale * frequency + settings.offset.x + seed;
                let sample_y = vertex.position.y / settings.scale * frequency + settings.offset.y + seed;

                let n = (noise.sample(sample_x, sample_y) * 2.0 - 1.0) * settings.dampening;
                noise_height += n * amplitude;

                amplitude *= settings.persistence;
                frequency *= settings.lacunarity;
            }

            // Mesh positions are f32, so the scaled elevation must survive the cast.
            let scaled = scale_height(noise_height, settings.height_scale);
            if !noise_height.is_finite() || !(scaled as f32).is_finite() {
                return Err(TerrainError::NonFiniteHeight {
                    vertex: vertex.id,
                    value: scaled,
                });
            }
            raw.push(noise_height);
        }

        let field = Self::from_raw(raw, settings.height_scale);
        tracing::debug!(
            "Height field: {} vertices, raw range [{:.4}, {:.4}]",
            field.len(),
            field.min_raw,
            field.max_raw
        );
        Ok(field)
    }

    /// Build a field from raw (pre-scale) noise heights.
    pub fn from_raw(raw: Vec<f64>, height_scale: f64) -> Self {
        let mut min_raw = f64::INFINITY;
        let mut max_raw = f64::NEG_INFINITY;
        for &h in &raw {
            // Independent checks: the first value must seed both bounds.
            if h > max_raw {
                max_raw = h;
            }
            if h < min_raw {
                min_raw = h;
            }
        }
        if raw.is_empty() {
            min_raw = 0.0;
            max_raw = 0.0;
        }

        let elevations = raw.into_iter().map(|h| scale_height(h, height_scale)).collect();
        Self {
            elevations,
            min_raw,
            max_raw,
            height_scale,
        }
    }

    pub fn len(&self) -> usize {
        self.elevations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elevations.is_empty()
    }

    /// Elevation of the vertex with this id.
    pub fn elevation(&self, id: u32) -> f64 {
        self.elevations[id as usize]
    }

    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    pub fn min_raw(&self) -> f64 {
        self.min_raw
    }

    pub fn max_raw(&self) -> f64 {
        self.max_raw
    }

    pub fn height_scale(&self) -> f64 {
        self.height_scale
    }

    /// Undo the asymmetric scaling of an elevation.
    pub fn unscale(&self, elevation: f64) -> f64 {
        if elevation < 0.0 {
            elevation / self.height_scale * VALLEY_COMPRESSION
        } else {
            elevation / self.height_scale
        }
    }

    /// Position of a raw height within the observed range, clamped to
    /// `[0, 1]`. A flat field maps everything to 0.
    pub fn normalize(&self, raw: f64) -> f64 {
        let span = self.max_raw - self.min_raw;
        if span == 0.0 {
            return 0.0;
        }
        ((raw - self.min_raw) / span).clamp(0.0, 1.0)
    }
}

/// Peaks scale by `height_scale`, valleys by a tenth of it.
pub fn scale_height(raw: f64, height_scale: f64) -> f64 {
    if raw < 0.0 {
        raw * height_scale / VALLEY_COMPRESSION
    } else {
        raw * height_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lowpoly_core::Point2;

    fn vertices(points: &[(f64, f64)]) -> Vec<Vertex> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Vertex {
                id: i as u32,
                position: Point2::new(x, y),
            })
            .collect()
    }

    fn grid_vertices(n: usize, step: f64) -> Vec<Vertex> {
        let pts: Vec<(f64, f64)> = (0..n * n)
            .map(|i| ((i % n) as f64 * step, (i / n) as f64 * step))
            .collect();
        vertices(&pts)
    }

    #[test]
    fn noise_stays_in_unit_range() {
        let noise = CoherentNoise::new();
        for i in 0..200 {
            let v = noise.sample(i as f64 * 0.37, i as f64 * 0.91);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn computing_twice_is_bit_identical() {
        let verts = grid_vertices(8, 7.3);
        let settings = NoiseSettings {
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            seed: 17,
            ..Default::default()
        };
        let a = HeightField::compute(&verts, &settings).unwrap();
        let b = HeightField::compute(&verts, &settings).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn same_position_gives_same_elevation() {
        let verts = vertices(&[(12.5, 40.25), (3.0, 3.0), (12.5, 40.25)]);
        let settings = NoiseSettings {
            octaves: 1,
            dampening: 0.5,
            seed: 0,
            ..Default::default()
        };
        let field = HeightField::compute(&verts, &settings).unwrap();
        assert_eq!(field.elevation(0), field.elevation(2));
    }

    #[test]
    fn seed_shifts_the_sampled_lattice() {
        let verts = grid_vertices(6, 11.0);
        let base = NoiseSettings::default();
        let a = HeightField::compute(&verts, &base).unwrap();
        let b = HeightField::compute(&verts, &NoiseSettings { seed: 7, ..base }).unwrap();
        assert_ne!(a.elevations(), b.elevations());
    }

    #[test]
    fn valleys_are_compressed_tenfold() {
        assert_eq!(scale_height(0.2, 50.0), 10.0);
        assert_eq!(scale_height(-0.2, 50.0), -1.0);

        let field = HeightField::from_raw(vec![0.2, -0.2], 50.0);
        assert!((field.unscale(field.elevation(0)) - 0.2).abs() < 1e-12);
        assert!((field.unscale(field.elevation(1)) + 0.2).abs() < 1e-12);
    }

    #[test]
    fn min_max_track_every_vertex() {
        // Descending values: an if/else-if scheme would never set the min
        // from the first vertex.
        let field = HeightField::from_raw(vec![0.3, 0.1, -0.4], 10.0);
        assert_eq!(field.max_raw(), 0.3);
        assert_eq!(field.min_raw(), -0.4);

        let single = HeightField::from_raw(vec![0.25], 10.0);
        assert_eq!(single.max_raw(), 0.25);
        assert_eq!(single.min_raw(), 0.25);
    }

    #[test]
    fn extremes_normalize_to_unit_bounds() {
        let field = HeightField::from_raw(vec![-5.0, 2.0, 5.0], 1.0);
        assert_eq!(field.normalize(field.max_raw()), 1.0);
        assert_eq!(field.normalize(field.min_raw()), 0.0);
        assert_eq!(field.normalize(0.0), 0.5);
        assert_eq!(field.normalize(99.0), 1.0);
    }

    #[test]
    fn non_finite_noise_is_an_error() {
        let verts = vertices(&[(1.0, 1.0), (7.0, 3.0)]);
        let settings = NoiseSettings {
            octaves: 3,
            persistence: f64::MAX,
            dampening: f64::MAX,
            ..Default::default()
        };
        match HeightField::compute(&verts, &settings) {
            Err(TerrainError::NonFiniteHeight { value, .. }) => assert!(!value.is_finite()),
            other => panic!("expected NonFiniteHeight, got {:?}", other),
        }
    }

    #[test]
    fn scaled_height_beyond_f32_is_an_error() {
        let verts = vertices(&[(1.0, 1.0), (7.0, 3.0), (12.0, 9.0)]);
        let settings = NoiseSettings {
            dampening: 1e30,
            height_scale: 1e30,
            ..Default::default()
        };
        match HeightField::compute(&verts, &settings) {
            Err(TerrainError::NonFiniteHeight { vertex, value }) => {
                assert!(vertex < 3);
                assert!(value.abs() > f32::MAX as f64);
            }
            other => panic!("expected NonFiniteHeight, got {:?}", other),
        }
    }

    #[test]
    fn empty_vertex_set_gives_empty_field() {
        let field = HeightField::compute(&[], &NoiseSettings::default()).unwrap();
        assert!(field.is_empty());
        assert_eq!(field.normalize(1.0), 0.0);
    }
}
