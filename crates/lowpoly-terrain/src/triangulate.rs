//! Delaunay triangulation of the sample points

use lowpoly_core::{Point2, Result, TerrainError};
use spade::{ConstrainedDelaunayTriangulation, Point2 as SpadePoint, Triangulation as _};

/// A triangulated point with its dense, zero-based id
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub id: u32,
    pub position: Point2,
}

/// Output of a triangulator.
///
/// `vertices[i].id == i` for every vertex and every triangle references
/// ids below `vertices.len()`. Triangles wind counter-clockwise in region
/// space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Triangulation {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<[u32; 3]>,
}

impl Triangulation {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn position(&self, id: u32) -> Point2 {
        self.vertices[id as usize].position
    }

    /// Verify the id invariants that height and mesh lookups index by.
    pub fn check(&self) -> Result<()> {
        if let Some((i, v)) = self
            .vertices
            .iter()
            .enumerate()
            .find(|(i, v)| v.id as usize != *i)
        {
            return Err(TerrainError::InvalidTriangulation(format!(
                "vertex at index {} has id {}",
                i, v.id
            )));
        }
        let count = self.vertices.len();
        if let Some(tri) = self
            .triangles
            .iter()
            .find(|tri| tri.iter().any(|&id| id as usize >= count))
        {
            return Err(TerrainError::InvalidTriangulation(format!(
                "triangle {:?} references a vertex outside 0..{}",
                tri, count
            )));
        }
        Ok(())
    }
}

/// Anything that can turn a point cloud into a Delaunay mesh
pub trait Triangulator {
    fn triangulate(&self, points: &[Point2]) -> Triangulation;
}

/// Constrained Delaunay triangulation backed by `spade`.
///
/// Without a boundary this is a plain Delaunay triangulation of the convex
/// hull. With a boundary, its edges are inserted as constraints that get
/// split where they cross existing edges, and triangles outside the outline
/// are dropped.
#[derive(Clone, Debug, Default)]
pub struct SpadeTriangulator {
    boundary: Option<Vec<Point2>>,
}

impl SpadeTriangulator {
    pub fn new() -> Self {
        Self { boundary: None }
    }

    /// Conform the triangulation to a closed outline (implicitly closed,
    /// no repeated first point).
    pub fn with_boundary(outline: Vec<Point2>) -> Self {
        Self {
            boundary: Some(outline),
        }
    }

    /// Conform to the `[0, size_x] x [0, size_y]` rectangle.
    pub fn for_region(size_x: f64, size_y: f64) -> Self {
        Self::with_boundary(vec![
            Point2::new(0.0, 0.0),
            Point2::new(size_x, 0.0),
            Point2::new(size_x, size_y),
            Point2::new(0.0, size_y),
        ])
    }
}

impl Triangulator for SpadeTriangulator {
    fn triangulate(&self, points: &[Point2]) -> Triangulation {
        let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint<f64>>::new();

        for p in points {
            if let Err(e) = cdt.insert(sanitize(*p)) {
                tracing::warn!("Skipping point ({}, {}): {:?}", p.x, p.y, e);
            }
        }

        if let Some(outline) = &self.boundary {
            let handles: Vec<_> = outline.iter().map(|p| cdt.insert(sanitize(*p))).collect();
            for ia in 0..handles.len() {
                let ib = (ia + 1) % handles.len();
                if let (Ok(a), Ok(b)) = (handles[ia], handles[ib]) {
                    if a != b {
                        let _ = cdt.add_constraint_and_split(a, b, |v| v);
                    }
                }
            }
        }

        // Spade's fixed handles are already dense and zero-based.
        let mut vertices: Vec<Vertex> = cdt
            .vertices()
            .map(|v| {
                let p = v.position();
                Vertex {
                    id: v.fix().index() as u32,
                    position: Point2::new(p.x, p.y),
                }
            })
            .collect();
        vertices.sort_by_key(|v| v.id);

        let triangles = cdt
            .inner_faces()
            .map(|face| face.vertices().map(|v| v.fix().index() as u32))
            .filter(|tri| match &self.boundary {
                Some(outline) => {
                    let centroid = centroid(tri.map(|id| vertices[id as usize].position));
                    point_in_polygon(centroid, outline)
                }
                None => true,
            })
            .collect();

        Triangulation { vertices, triangles }
    }
}

/// Clamp tiny coordinates to zero so spade accepts them.
fn sanitize(p: Point2) -> SpadePoint<f64> {
    let clean = |c: f64| if c.abs() <= spade::MIN_ALLOWED_VALUE { 0.0 } else { c };
    SpadePoint::new(clean(p.x), clean(p.y))
}

fn centroid(pts: [Point2; 3]) -> Point2 {
    Point2::new(
        (pts[0].x + pts[1].x + pts[2].x) / 3.0,
        (pts[0].y + pts[1].y + pts[2].y) / 3.0,
    )
}

/// Even-odd crossing test.
fn point_in_polygon(p: Point2, polygon: &[Point2]) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
