//! Generation configuration
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `LOWPOLY_SEED`, `LOWPOLY_SAMPLING_SEED`
//! 2. A TOML file (explicit path, or `lowpoly.toml` in the working directory)
//! 3. Built-in defaults
//!
//! The file shape (`TerrainConfigFile`) keeps modes as strings so that an
//! unknown mode surfaces as a configuration error when it is resolved into
//! a `GenerationConfig`.

use crate::gradient::{Gradient, GradientStop};
use lowpoly_core::{Color, Point2, Result, TerrainError};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "lowpoly.toml";

/// Exclusive upper bound of seeds produced by the "new seed" action
pub const RANDOM_SEED_RANGE: i32 = 100;

/// How sample points are distributed over the region
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sampling {
    /// `point_density` independent uniform draws
    Uniform { point_density: u32 },
    /// Blue-noise points at least `min_distance` apart
    Poisson {
        min_distance: f64,
        rejection_samples: u32,
    },
}

impl Sampling {
    pub fn mode_name(&self) -> &'static str {
        match self {
            Sampling::Uniform { .. } => "uniform",
            Sampling::Poisson { .. } => "poisson",
        }
    }
}

/// Layered Perlin noise parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseSettings {
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    /// Horizontal size of one noise feature in region units
    pub scale: f64,
    pub dampening: f64,
    /// Peak multiplier; valleys are scaled by a tenth of this
    pub height_scale: f64,
    pub offset: Point2,
    /// Added to both sample coordinates, shifting the noise lattice
    pub seed: i32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            octaves: 1,
            persistence: 0.1,
            lacunarity: 1.5,
            scale: 34.0,
            dampening: 0.21,
            height_scale: 50.0,
            offset: Point2::ZERO,
            seed: 0,
        }
    }
}

/// How triangles are colored
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Random,
    HeightGradient,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Random => "random",
            ColorMode::HeightGradient => "height_gradient",
        }
    }
}

impl FromStr for ColorMode {
    type Err = TerrainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(ColorMode::Random),
            "height_gradient" | "gradient" => Ok(ColorMode::HeightGradient),
            other => Err(TerrainError::InvalidConfiguration(format!(
                "unknown color mode '{}'; valid values: random, height_gradient",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Coloring {
    pub mode: ColorMode,
    pub gradient: Gradient,
}

impl Default for Coloring {
    fn default() -> Self {
        Self {
            mode: ColorMode::HeightGradient,
            gradient: Gradient::terrain(),
        }
    }
}

/// The full, validated parameter set for one generation pass
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationConfig {
    pub size_x: f64,
    pub size_y: f64,
    pub sampling: Sampling,
    pub noise: NoiseSettings,
    pub coloring: Coloring,
    /// Seeds the generator shared by point placement and random coloring.
    /// `None` draws a fresh seed from the OS on every pass.
    pub sampling_seed: Option<u64>,
    /// Constrain the triangulation to the region rectangle
    pub conform_to_region: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            size_x: 100.0,
            size_y: 100.0,
            sampling: Sampling::Poisson {
                min_distance: 10.0,
                rejection_samples: 30,
            },
            noise: NoiseSettings::default(),
            coloring: Coloring::default(),
            sampling_seed: None,
            conform_to_region: false,
        }
    }
}

impl GenerationConfig {
    /// Load config with layered precedence: defaults < file < env vars
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            }
        };

        let mut file = match path {
            Some(p) => TerrainConfigFile::load(&p)?,
            None => TerrainConfigFile::default(),
        };
        file.apply_env_overrides(|key| std::env::var(key).ok())?;
        Self::from_file(file)
    }

    /// Load config from a specific file path only, without env overrides
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::from_file(TerrainConfigFile::load(path)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TerrainConfigFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    /// Resolve the file shape into a typed config and validate it.
    pub fn from_file(file: TerrainConfigFile) -> Result<Self> {
        let sampling = match file.sampling.mode.as_str() {
            "poisson" => Sampling::Poisson {
                min_distance: file.sampling.min_distance,
                rejection_samples: file.sampling.rejection_samples,
            },
            "uniform" | "random" => Sampling::Uniform {
                point_density: file.sampling.point_density,
            },
            other => {
                return Err(TerrainError::InvalidConfiguration(format!(
                    "unknown sampling mode '{}'; valid values: poisson, uniform",
                    other
                )))
            }
        };

        let gradient = match file.coloring.gradient {
            Some(stops) => Gradient::new(
                stops
                    .into_iter()
                    .map(|s| GradientStop::new(s.position, Color::rgb(s.color[0], s.color[1], s.color[2])))
                    .collect(),
            ),
            None => Gradient::terrain(),
        };

        let config = Self {
            size_x: file.region.size_x,
            size_y: file.region.size_y,
            sampling,
            noise: NoiseSettings {
                octaves: file.noise.octaves,
                persistence: file.noise.persistence,
                lacunarity: file.noise.lacunarity,
                scale: file.noise.scale,
                dampening: file.noise.dampening,
                height_scale: file.noise.height_scale,
                offset: Point2::new(file.noise.offset[0], file.noise.offset[1]),
                seed: file.noise.seed,
            },
            coloring: Coloring {
                mode: file.coloring.mode.parse()?,
                gradient,
            },
            sampling_seed: file.sampling.seed,
            conform_to_region: file.region.conform,
        };
        config.validate()?;
        Ok(config)
    }

    /// Convert back into the file shape (used to write starter configs).
    pub fn to_file(&self) -> TerrainConfigFile {
        let defaults = SamplingSection::default();
        let sampling = match self.sampling {
            Sampling::Uniform { point_density } => SamplingSection {
                mode: "uniform".to_string(),
                point_density,
                seed: self.sampling_seed,
                ..defaults
            },
            Sampling::Poisson {
                min_distance,
                rejection_samples,
            } => SamplingSection {
                mode: "poisson".to_string(),
                min_distance,
                rejection_samples,
                seed: self.sampling_seed,
                ..defaults
            },
        };

        TerrainConfigFile {
            region: RegionSection {
                size_x: self.size_x,
                size_y: self.size_y,
                conform: self.conform_to_region,
            },
            sampling,
            noise: NoiseSection {
                octaves: self.noise.octaves,
                persistence: self.noise.persistence,
                lacunarity: self.noise.lacunarity,
                scale: self.noise.scale,
                dampening: self.noise.dampening,
                height_scale: self.noise.height_scale,
                offset: [self.noise.offset.x, self.noise.offset.y],
                seed: self.noise.seed,
            },
            coloring: ColoringSection {
                mode: self.coloring.mode.as_str().to_string(),
                gradient: Some(
                    self.coloring
                        .gradient
                        .stops()
                        .iter()
                        .map(|s| GradientStopFile {
                            position: s.position,
                            color: [s.color.r, s.color.g, s.color.b],
                        })
                        .collect(),
                ),
            },
        }
    }

    /// Reject parameters that would make the pipeline meaningless or
    /// produce non-finite geometry. Runs before any sampling work.
    pub fn validate(&self) -> Result<()> {
        positive("region.size_x", self.size_x)?;
        positive("region.size_y", self.size_y)?;

        if let Sampling::Poisson {
            min_distance,
            rejection_samples,
        } = self.sampling
        {
            positive("sampling.min_distance", min_distance)?;
            if rejection_samples == 0 {
                return Err(TerrainError::InvalidConfiguration(
                    "sampling.rejection_samples must be greater than 0".to_string(),
                ));
            }
        }

        let noise = &self.noise;
        if noise.octaves == 0 {
            return Err(TerrainError::InvalidConfiguration(
                "noise.octaves must be greater than 0".to_string(),
            ));
        }
        positive("noise.scale", noise.scale)?;
        positive("noise.height_scale", noise.height_scale)?;
        finite("noise.persistence", noise.persistence)?;
        finite("noise.lacunarity", noise.lacunarity)?;
        finite("noise.dampening", noise.dampening)?;
        if !noise.offset.is_finite() {
            return Err(TerrainError::InvalidConfiguration(
                "noise.offset must be finite".to_string(),
            ));
        }

        if self.coloring.mode == ColorMode::HeightGradient {
            self.coloring.gradient.validate()?;
        }
        Ok(())
    }

    /// The "new seed" action: only the noise seed changes.
    pub fn with_random_seed<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.noise.seed = rng.gen_range(0..RANDOM_SEED_RANGE);
        self
    }

    /// Generator for point placement and random coloring. Independent of
    /// the noise seed so that reseeding the noise leaves the points alone.
    pub fn sampling_rng(&self) -> Pcg64Mcg {
        match self.sampling_seed {
            Some(seed) => Pcg64Mcg::seed_from_u64(seed),
            None => Pcg64Mcg::from_entropy(),
        }
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TerrainError::ValueOutOfRange {
            field: field.to_string(),
            min: f64::MIN_POSITIVE,
            max: f64::MAX,
            value,
        })
    }
}

fn finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TerrainError::InvalidConfiguration(format!(
            "{} must be finite, got {}",
            field, value
        )))
    }
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerrainConfigFile {
    #[serde(default)]
    pub region: RegionSection,
    #[serde(default)]
    pub sampling: SamplingSection,
    #[serde(default)]
    pub noise: NoiseSection,
    #[serde(default)]
    pub coloring: ColoringSection,
}

impl TerrainConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: TerrainConfigFile = toml::from_str(&content).map_err(|e| {
            TerrainError::TomlParseError(format!(
                "Failed to parse config {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(file)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `LOWPOLY_SEED` and `LOWPOLY_SAMPLING_SEED` through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("LOWPOLY_SEED") {
            self.noise.seed = raw.trim().parse().map_err(|_| {
                TerrainError::InvalidConfiguration(format!(
                    "LOWPOLY_SEED must be an integer, got '{}'",
                    raw
                ))
            })?;
        }
        if let Some(raw) = lookup("LOWPOLY_SAMPLING_SEED") {
            let seed = raw.trim().parse().map_err(|_| {
                TerrainError::InvalidConfiguration(format!(
                    "LOWPOLY_SAMPLING_SEED must be an unsigned integer, got '{}'",
                    raw
                ))
            })?;
            self.sampling.seed = Some(seed);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSection {
    #[serde(default = "default_size")]
    pub size_x: f64,
    #[serde(default = "default_size")]
    pub size_y: f64,
    #[serde(default)]
    pub conform: bool,
}

impl Default for RegionSection {
    fn default() -> Self {
        Self {
            size_x: default_size(),
            size_y: default_size(),
            conform: false,
        }
    }
}

fn default_size() -> f64 {
    100.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingSection {
    #[serde(default = "default_sampling_mode")]
    pub mode: String,
    #[serde(default = "default_point_density")]
    pub point_density: u32,
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,
    #[serde(default = "default_rejection_samples")]
    pub rejection_samples: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SamplingSection {
    fn default() -> Self {
        Self {
            mode: default_sampling_mode(),
            point_density: default_point_density(),
            min_distance: default_min_distance(),
            rejection_samples: default_rejection_samples(),
            seed: None,
        }
    }
}

fn default_sampling_mode() -> String {
    "poisson".to_string()
}
fn default_point_density() -> u32 {
    500
}
fn default_min_distance() -> f64 {
    10.0
}
fn default_rejection_samples() -> u32 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseSection {
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    #[serde(default = "default_persistence")]
    pub persistence: f64,
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_dampening")]
    pub dampening: f64,
    #[serde(default = "default_height_scale")]
    pub height_scale: f64,
    #[serde(default)]
    pub offset: [f64; 2],
    #[serde(default)]
    pub seed: i32,
}

impl Default for NoiseSection {
    fn default() -> Self {
        let n = NoiseSettings::default();
        Self {
            octaves: n.octaves,
            persistence: n.persistence,
            lacunarity: n.lacunarity,
            scale: n.scale,
            dampening: n.dampening,
            height_scale: n.height_scale,
            offset: [n.offset.x, n.offset.y],
            seed: n.seed,
        }
    }
}

fn default_octaves() -> u32 {
    NoiseSettings::default().octaves
}
fn default_persistence() -> f64 {
    NoiseSettings::default().persistence
}
fn default_lacunarity() -> f64 {
    NoiseSettings::default().lacunarity
}
fn default_scale() -> f64 {
    NoiseSettings::default().scale
}
fn default_dampening() -> f64 {
    NoiseSettings::default().dampening
}
fn default_height_scale() -> f64 {
    NoiseSettings::default().height_scale
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColoringSection {
    #[serde(default = "default_color_mode")]
    pub mode: String,
    /// Falls back to the built-in terrain palette when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Vec<GradientStopFile>>,
}

impl Default for ColoringSection {
    fn default() -> Self {
        Self {
            mode: default_color_mode(),
            gradient: None,
        }
    }
}

fn default_color_mode() -> String {
    "height_gradient".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientStopFile {
    pub position: f32,
    pub color: [f32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lowpoly_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("lowpoly.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn empty_file_resolves_to_defaults() {
        let config = GenerationConfig::from_toml_str("").unwrap();
        assert_eq!(config, GenerationConfig::default());
    }

    #[test]
    fn load_config_from_file() {
        let config_str = r#"
[region]
size_x = 250.0
size_y = 80.0
conform = true

[sampling]
mode = "uniform"
point_density = 1200
seed = 7

[noise]
octaves = 4
persistence = 0.5
lacunarity = 2.0
offset = [3.0, -1.5]
seed = 42

[coloring]
mode = "height_gradient"
gradient = [
    { position = 0.0, color = [0.0, 0.0, 0.0] },
    { position = 1.0, color = [1.0, 1.0, 1.0] },
]
"#;
        let path = temp_config(config_str);
        let config = GenerationConfig::load_from_file(&path).unwrap();

        assert_eq!(config.size_x, 250.0);
        assert_eq!(config.size_y, 80.0);
        assert!(config.conform_to_region);
        assert_eq!(config.sampling, Sampling::Uniform { point_density: 1200 });
        assert_eq!(config.sampling_seed, Some(7));
        assert_eq!(config.noise.octaves, 4);
        assert_eq!(config.noise.offset, Point2::new(3.0, -1.5));
        assert_eq!(config.noise.seed, 42);
        assert_eq!(config.noise.scale, 34.0);
        assert_eq!(config.coloring.gradient.stops().len(), 2);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn unknown_color_mode_is_invalid_configuration() {
        let err = GenerationConfig::from_toml_str("[coloring]\nmode = \"plaid\"\n").unwrap_err();
        assert!(matches!(err, TerrainError::InvalidConfiguration(_)));
        assert!("plaid".parse::<ColorMode>().is_err());
    }

    #[test]
    fn unknown_sampling_mode_is_invalid_configuration() {
        let err = GenerationConfig::from_toml_str("[sampling]\nmode = \"hex\"\n").unwrap_err();
        assert!(matches!(err, TerrainError::InvalidConfiguration(_)));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = GenerationConfig::default();
        config.size_x = 0.0;
        assert!(config.validate().unwrap_err().is_configuration_error());

        let mut config = GenerationConfig::default();
        config.sampling = Sampling::Poisson {
            min_distance: -1.0,
            rejection_samples: 30,
        };
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::default();
        config.sampling = Sampling::Poisson {
            min_distance: 5.0,
            rejection_samples: 0,
        };
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::default();
        config.noise.octaves = 0;
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::default();
        config.noise.scale = 0.0;
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::default();
        config.noise.persistence = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn uniform_mode_with_zero_density_is_valid() {
        let mut config = GenerationConfig::default();
        config.sampling = Sampling::Uniform { point_density: 0 };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_replace_seeds() {
        let mut file = TerrainConfigFile::default();
        file.apply_env_overrides(|key| match key {
            "LOWPOLY_SEED" => Some("17".to_string()),
            "LOWPOLY_SAMPLING_SEED" => Some(" 99 ".to_string()),
            _ => None,
        })
        .unwrap();

        let config = GenerationConfig::from_file(file).unwrap();
        assert_eq!(config.noise.seed, 17);
        assert_eq!(config.sampling_seed, Some(99));
    }

    #[test]
    fn malformed_env_seed_is_rejected() {
        let mut file = TerrainConfigFile::default();
        let result = file.apply_env_overrides(|key| {
            (key == "LOWPOLY_SEED").then(|| "not-a-number".to_string())
        });
        assert!(result.unwrap_err().is_configuration_error());
    }

    #[test]
    fn file_shape_survives_a_toml_round_trip() {
        let mut config = GenerationConfig::default();
        config.sampling = Sampling::Uniform { point_density: 64 };
        config.coloring.mode = ColorMode::Random;
        config.noise.seed = 12;

        let text = config.to_file().to_toml_string().unwrap();
        let reloaded = GenerationConfig::from_toml_str(&text).unwrap();
        assert_eq!(reloaded.sampling, config.sampling);
        assert_eq!(reloaded.coloring.mode, ColorMode::Random);
        assert_eq!(reloaded.noise.seed, 12);
    }

    #[test]
    fn random_seed_only_touches_the_noise_seed() {
        let config = GenerationConfig {
            sampling_seed: Some(5),
            ..Default::default()
        };
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let reseeded = config.clone().with_random_seed(&mut rng);

        assert!((0..RANDOM_SEED_RANGE).contains(&reseeded.noise.seed));
        assert_eq!(reseeded.sampling, config.sampling);
        assert_eq!(reseeded.sampling_seed, config.sampling_seed);
        assert_eq!(reseeded.coloring, config.coloring);
    }
}
