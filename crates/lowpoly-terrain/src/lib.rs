//! Lowpoly Terrain - Procedural low-poly terrain generation
//!
//! Distributes sample points over a rectangular footprint, triangulates
//! them, shapes the vertices with layered Perlin noise and emits a
//! flat-shaded triangle soup with per-face colors. Does not depend on any
//! renderer: outputs raw vertex data (positions, normals, UVs, colors,
//! indices) for the host to consume.

pub mod color;
pub mod config;
pub mod gradient;
pub mod heightfield;
pub mod mesh;
pub mod sampler;
pub mod terrain;
pub mod triangulate;

pub use color::ColorEvaluator;
pub use config::{ColorMode, Coloring, GenerationConfig, NoiseSettings, Sampling, TerrainConfigFile};
pub use gradient::{Gradient, GradientStop};
pub use heightfield::HeightField;
pub use mesh::TerrainMesh;
pub use terrain::{generate, Degeneracy, Terrain};
pub use triangulate::{SpadeTriangulator, Triangulation, Triangulator, Vertex};
