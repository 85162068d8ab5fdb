//! Lowpoly Core - Foundational types for the lowpoly terrain generator
//!
//! This crate provides the types shared by the pipeline and the CLI:
//! - `Point2` - Region-space sample points
//! - `Vec3`, `Color` - Render-space vectors and RGBA colors
//! - Error types and Result alias

mod error;
mod types;

pub use error::{Result, TerrainError};
pub use types::{Color, Point2, Vec3};
