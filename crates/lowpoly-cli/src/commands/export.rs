//! Mesh persistence: Wavefront OBJ and JSON writers

use lowpoly_core::{Result, TerrainError};
use lowpoly_terrain::TerrainMesh;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Obj,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Obj => "obj",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "obj" => Ok(ExportFormat::Obj),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("unknown format '{}'; valid values: obj, json", s)),
        }
    }
}

/// File name embedding the noise seed, e.g. `GeneratedMesh42.obj`
pub fn mesh_file_name(seed: i32, format: ExportFormat) -> String {
    format!("GeneratedMesh{}.{}", seed, format.extension())
}

/// Write `mesh` into `dir` under the seed-derived name.
pub fn write_mesh(mesh: &TerrainMesh, dir: &Path, seed: i32, format: ExportFormat) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(mesh_file_name(seed, format));

    let body = match format {
        ExportFormat::Obj => to_obj(mesh, seed),
        ExportFormat::Json => to_json(mesh)?,
    };
    std::fs::write(&path, &body)?;
    tracing::debug!(
        "Wrote {} triangles ({} bytes) to {}",
        mesh.triangle_count(),
        body.len(),
        path.display()
    );
    Ok(path)
}

pub fn to_json(mesh: &TerrainMesh) -> Result<String> {
    serde_json::to_string(mesh).map_err(|e| TerrainError::ExportError(e.to_string()))
}

/// Wavefront OBJ with `v x y z r g b` vertex colors. Attribute arrays are
/// already flat-shaded, so face corners index position, uv and normal with
/// the same number.
pub fn to_obj(mesh: &TerrainMesh, seed: i32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# lowpoly terrain, seed {}", seed);
    let _ = writeln!(out, "# {} triangles", mesh.triangle_count());

    for (p, c) in mesh.positions.iter().zip(&mesh.colors) {
        let _ = writeln!(out, "v {} {} {} {} {} {}", p[0], p[1], p[2], c[0], c[1], c[2]);
    }
    for uv in &mesh.uvs {
        let _ = writeln!(out, "vt {} {}", uv[0], uv[1]);
    }
    for n in &mesh.normals {
        let _ = writeln!(out, "vn {} {} {}", n[0], n[1], n[2]);
    }
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
        let _ = writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_triangle() -> TerrainMesh {
        TerrainMesh {
            positions: vec![[0.0, 1.0, 0.0], [1.0, 0.5, 0.0], [0.0, 0.0, 1.0]],
            normals: vec![[0.0, 1.0, 0.0]; 3],
            uvs: vec![[0.0, 0.0]; 3],
            colors: vec![[0.5, 0.5, 0.5, 1.0]; 3],
            indices: vec![0, 1, 2],
            aabb_min: [0.0, 0.0, 0.0],
            aabb_max: [1.0, 1.0, 1.0],
        }
    }

    #[test]
    fn file_name_embeds_the_seed() {
        assert_eq!(mesh_file_name(42, ExportFormat::Obj), "GeneratedMesh42.obj");
        assert_eq!(mesh_file_name(-3, ExportFormat::Json), "GeneratedMesh-3.json");
    }

    #[test]
    fn obj_faces_are_one_based() {
        let obj = to_obj(&one_triangle(), 7);
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 3);
        assert_eq!(obj.lines().filter(|l| l.starts_with("vn ")).count(), 3);
        assert!(obj.contains("f 1/1/1 2/2/2 3/3/3"));
        assert!(obj.contains("v 0 1 0 0.5 0.5 0.5"));
    }

    #[test]
    fn json_export_writes_a_loadable_mesh() {
        let dir = std::env::temp_dir().join(format!("lowpoly_export_test_{}", uuid::Uuid::new_v4()));
        let mesh = one_triangle();

        let path = write_mesh(&mesh, &dir, 5, ExportFormat::Json).unwrap();
        assert!(path.ends_with("GeneratedMesh5.json"));

        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: TerrainMesh = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded, mesh);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!("fbx".parse::<ExportFormat>().is_err());
        assert_eq!("obj".parse::<ExportFormat>(), Ok(ExportFormat::Obj));
    }
}
