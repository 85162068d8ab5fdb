//! Generation pass orchestration

use crate::color::ColorEvaluator;
use crate::config::GenerationConfig;
use crate::heightfield::HeightField;
use crate::mesh::{build_mesh, TerrainMesh};
use crate::sampler::sample_points;
use crate::triangulate::{SpadeTriangulator, Triangulation, Triangulator};
use lowpoly_core::{Point2, Result};
use std::fmt;

/// Why a pass produced no triangles
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Degeneracy {
    /// Fewer than three distinct points reached the triangulator
    TooFewPoints(usize),
    /// Enough points, but all on one line
    Collinear,
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degeneracy::TooFewPoints(n) => write!(f, "only {} usable point(s), need at least 3", n),
            Degeneracy::Collinear => write!(f, "all points are collinear"),
        }
    }
}

/// Everything one generation pass produced
#[derive(Clone, Debug)]
pub struct Terrain {
    /// Sampled input points
    pub points: Vec<Point2>,
    /// Triangulated vertices and triangles
    pub triangulation: Triangulation,
    /// Per-vertex elevations
    pub heights: HeightField,
    /// The renderable mesh
    pub mesh: TerrainMesh,
    /// Set when the input could not be triangulated; the mesh is empty
    pub degeneracy: Option<Degeneracy>,
}

impl Terrain {
    /// Run the full pipeline with the default spade triangulator.
    pub fn generate(config: &GenerationConfig) -> Result<Self> {
        if config.conform_to_region {
            Self::generate_with(config, &SpadeTriangulator::for_region(config.size_x, config.size_y))
        } else {
            Self::generate_with(config, &SpadeTriangulator::new())
        }
    }

    /// Run the full pipeline with a caller-supplied triangulator.
    ///
    /// The config is validated before any sampling happens, and the
    /// triangulator's output is checked before anything indexes into it.
    /// Every call starts from scratch; nothing is carried over from earlier
    /// passes.
    pub fn generate_with(config: &GenerationConfig, triangulator: &dyn Triangulator) -> Result<Self> {
        config.validate()?;

        let mut rng = config.sampling_rng();

        let points = sample_points(config.size_x, config.size_y, &config.sampling, &mut rng);
        tracing::debug!(
            "Sampled {} points ({} mode) over {}x{}",
            points.len(),
            config.sampling.mode_name(),
            config.size_x,
            config.size_y
        );

        let triangulation = triangulator.triangulate(&points);
        triangulation.check()?;
        tracing::debug!(
            "Triangulated {} vertices into {} triangles",
            triangulation.vertices.len(),
            triangulation.triangles.len()
        );

        let degeneracy = if !triangulation.is_empty() {
            None
        } else if triangulation.vertices.len() < 3 {
            Some(Degeneracy::TooFewPoints(triangulation.vertices.len()))
        } else {
            Some(Degeneracy::Collinear)
        };
        if let Some(reason) = degeneracy {
            tracing::warn!("Degenerate terrain input, emitting empty mesh: {}", reason);
        }

        let heights = HeightField::compute(&triangulation.vertices, &config.noise)?;

        let colors = ColorEvaluator::new(&config.coloring, &heights);
        let mesh = build_mesh(&triangulation, &heights, &colors, &mut rng)?;

        tracing::info!(
            "Generated terrain: {} triangles, {} vertices",
            mesh.triangle_count(),
            mesh.vertex_count()
        );

        Ok(Self {
            points,
            triangulation,
            heights,
            mesh,
            degeneracy,
        })
    }
}

/// Generate a terrain mesh from `config`.
pub fn generate(config: &GenerationConfig) -> Result<TerrainMesh> {
    Terrain::generate(config).map(|terrain| terrain.mesh)
}
