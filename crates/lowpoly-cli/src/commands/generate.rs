//! Terrain generation command

use super::export::{self, ExportFormat};
use anyhow::{Context, Result};
use lowpoly_terrain::{GenerationConfig, Sampling, Terrain};
use std::path::Path;

pub struct GenerateArgs {
    pub config: Option<String>,
    pub output: String,
    pub format: ExportFormat,
    pub seed: Option<i32>,
    pub new_seed: bool,
    pub sampling_seed: Option<u64>,
    pub dry_run: bool,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let mut config = GenerationConfig::load(args.config.as_deref().map(Path::new))
        .context("Failed to load terrain config")?;

    if let Some(seed) = args.seed {
        config.noise.seed = seed;
    }
    if args.new_seed {
        config = config.with_random_seed(&mut rand::thread_rng());
    }
    if args.sampling_seed.is_some() {
        config.sampling_seed = args.sampling_seed;
    }
    tracing::debug!(
        "Resolved config: {}x{} region, {} sampling, noise seed {}, sampling seed {:?}",
        config.size_x,
        config.size_y,
        config.sampling.mode_name(),
        config.noise.seed,
        config.sampling_seed
    );

    let terrain = Terrain::generate(&config).context("Terrain generation failed")?;
    print_summary(&config, &terrain);

    if let Some(reason) = terrain.degeneracy {
        println!("Warning: no triangles produced ({})", reason);
    }

    if args.dry_run {
        tracing::debug!("Dry run, mesh not written");
        return Ok(());
    }

    let path = export::write_mesh(&terrain.mesh, Path::new(&args.output), config.noise.seed, args.format)
        .context("Failed to save mesh")?;
    println!("Saved mesh to {}", path.display());
    Ok(())
}

fn print_summary(config: &GenerationConfig, terrain: &Terrain) {
    println!("Region: {} x {}", config.size_x, config.size_y);
    match config.sampling {
        Sampling::Uniform { point_density } => println!("Sampling: uniform, {} points", point_density),
        Sampling::Poisson {
            min_distance,
            rejection_samples,
        } => println!(
            "Sampling: poisson, min distance {}, {} rejection samples",
            min_distance, rejection_samples
        ),
    }
    println!("Noise seed: {}", config.noise.seed);
    println!("Points: {}", terrain.points.len());
    println!("Vertices: {}", terrain.triangulation.vertices.len());
    println!("Triangles: {}", terrain.mesh.triangle_count());
    println!(
        "Raw height range: [{:.4}, {:.4}]",
        terrain.heights.min_raw(),
        terrain.heights.max_raw()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_writes_a_seed_named_mesh() {
        let dir = std::env::temp_dir().join(format!("lowpoly_generate_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let config_path = dir.join("terrain.toml");
        std::fs::write(
            &config_path,
            "[region]\nsize_x = 40.0\nsize_y = 40.0\n\n[sampling]\nmode = \"uniform\"\npoint_density = 50\n",
        )
        .unwrap();

        run(GenerateArgs {
            config: Some(config_path.to_string_lossy().to_string()),
            output: dir.to_string_lossy().to_string(),
            format: ExportFormat::Obj,
            seed: Some(23),
            new_seed: false,
            sampling_seed: Some(4),
            dry_run: false,
        })
        .unwrap();

        let obj = std::fs::read_to_string(dir.join("GeneratedMesh23.obj")).unwrap();
        assert!(obj.lines().any(|l| l.starts_with("f ")));

        std::fs::remove_dir_all(&dir).ok();
    }
}
