//! Starter config command

use anyhow::{Context, Result};
use lowpoly_terrain::GenerationConfig;
use std::fs;
use std::path::Path;

const HEADER: &str = "\
# lowpoly terrain configuration
#
# [sampling] mode: \"poisson\" (min_distance, rejection_samples) or
#                  \"uniform\" (point_density). Set `seed` for repeatable points.
# [coloring] mode: \"height_gradient\" or \"random\".
# LOWPOLY_SEED and LOWPOLY_SAMPLING_SEED override the seeds below.

";

pub fn run(path: &str, force: bool) -> Result<()> {
    let path = Path::new(path);

    if path.exists() && !force {
        anyhow::bail!("'{}' already exists (use --force to overwrite)", path.display());
    }

    let body = GenerationConfig::default()
        .to_file()
        .to_toml_string()
        .context("Failed to serialize default config")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{}{}", HEADER, body))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote default config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_config_loads_back_as_defaults() {
        let dir = std::env::temp_dir().join(format!("lowpoly_init_test_{}", uuid::Uuid::new_v4()));
        let path = dir.join("lowpoly.toml");
        let path_str = path.to_string_lossy().to_string();

        run(&path_str, false).unwrap();
        let loaded = GenerationConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.sampling, GenerationConfig::default().sampling);
        assert_eq!(loaded.noise, GenerationConfig::default().noise);

        assert!(run(&path_str, false).is_err());
        assert!(run(&path_str, true).is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }
}
