//! Flat-shaded triangle soup assembly

use crate::color::ColorEvaluator;
use crate::heightfield::HeightField;
use crate::triangulate::Triangulation;
use lowpoly_core::{Result, TerrainError, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Renderable terrain geometry.
///
/// No vertex is shared between triangles: every triangle owns three
/// consecutive entries in each attribute array, all carrying the same face
/// normal and color.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainMesh {
    /// Vertex positions, region XY mapped to XZ and elevation to Y
    pub positions: Vec<[f32; 3]>,
    /// Face normals, unnormalized cross products
    pub normals: Vec<[f32; 3]>,
    /// Placeholder UVs, always zero
    pub uvs: Vec<[f32; 2]>,
    /// RGBA vertex colors
    pub colors: Vec<[f32; 4]>,
    /// Triangle indices, three sequential per triangle
    pub indices: Vec<u32>,
    /// AABB minimum corner
    pub aabb_min: [f32; 3],
    /// AABB maximum corner
    pub aabb_max: [f32; 3],
}

impl TerrainMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Export the geometry as a trimesh for physics colliders.
    pub fn trimesh_data(&self) -> (Vec<[f32; 3]>, Vec<[u32; 3]>) {
        let triangles = self
            .indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect();
        (self.positions.clone(), triangles)
    }
}

/// Walk the triangulation and emit one flat-shaded face per triangle.
///
/// Each triangle's ids are consumed third, second, first so that the
/// counter-clockwise region-space winding yields upward-facing normals once
/// region Y becomes render Z. A face whose normal overflows `f32` is an
/// error; no NaN or infinity is written into the mesh.
pub fn build_mesh<R: Rng + ?Sized>(
    triangulation: &Triangulation,
    heights: &HeightField,
    colors: &ColorEvaluator<'_>,
    rng: &mut R,
) -> Result<TerrainMesh> {
    let tri_count = triangulation.triangles.len();
    let vert_count = tri_count * 3;

    let mut positions = Vec::with_capacity(vert_count);
    let mut normals = Vec::with_capacity(vert_count);
    let mut uvs = Vec::with_capacity(vert_count);
    let mut vertex_colors = Vec::with_capacity(vert_count);
    let mut indices = Vec::with_capacity(vert_count);

    let mut aabb_min = [f32::MAX; 3];
    let mut aabb_max = [f32::MIN; 3];

    for (t, tri) in triangulation.triangles.iter().enumerate() {
        let corners = [tri[2], tri[1], tri[0]].map(|id| {
            let p = triangulation.position(id);
            Vec3::new(p.x as f32, heights.elevation(id) as f32, p.y as f32)
        });

        let base = positions.len() as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2]);

        let normal = (corners[1] - corners[0]).cross(&(corners[2] - corners[0]));
        if !normal.is_finite() {
            return Err(TerrainError::NonFiniteNormal { triangle: t });
        }
        let color = colors.evaluate(*tri, rng);

        for corner in &corners {
            let pos = corner.to_array();
            for i in 0..3 {
                aabb_min[i] = aabb_min[i].min(pos[i]);
                aabb_max[i] = aabb_max[i].max(pos[i]);
            }
            positions.push(pos);
            normals.push(normal.to_array());
            uvs.push([0.0, 0.0]);
            vertex_colors.push(color.to_array());
        }
    }

    if positions.is_empty() {
        aabb_min = [0.0; 3];
        aabb_max = [0.0; 3];
    }

    Ok(TerrainMesh {
        positions,
        normals,
        uvs,
        colors: vertex_colors,
        indices,
        aabb_min,
        aabb_max,
    })
}
