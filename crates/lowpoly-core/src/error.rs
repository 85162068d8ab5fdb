//! Error types for terrain generation

use thiserror::Error;

/// The main error type for terrain generation
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Non-finite height at vertex {vertex}: {value}")]
    NonFiniteHeight { vertex: u32, value: f64 },

    #[error("Non-finite normal on triangle {triangle}")]
    NonFiniteNormal { triangle: usize },

    #[error("Invalid triangulation: {0}")]
    InvalidTriangulation(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("Export error: {0}")]
    ExportError(String),
}

impl TerrainError {
    /// True for errors caused by the generation parameters rather than I/O.
    /// Non-finite heights and normals only arise from degenerate noise
    /// settings, so they count as configuration errors too.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            TerrainError::InvalidConfiguration(_)
                | TerrainError::ValueOutOfRange { .. }
                | TerrainError::NonFiniteHeight { .. }
                | TerrainError::NonFiniteNormal { .. }
        )
    }
}

/// Result type alias for terrain operations
pub type Result<T> = std::result::Result<T, TerrainError>;

impl From<toml::de::Error> for TerrainError {
    fn from(err: toml::de::Error) -> Self {
        TerrainError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for TerrainError {
    fn from(err: toml::ser::Error) -> Self {
        TerrainError::TomlSerError(err.to_string())
    }
}
