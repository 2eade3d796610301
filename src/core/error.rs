//! Error types for terrain splitting

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// A required collaborator (terrain, viewpoint) is missing or unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Tile or blade size that cannot produce a grid.
    #[error("Degenerate grid: {0}")]
    DegenerateGrid(String),

    /// Kernel dispatch or readback mismatch on any device.
    #[error("Compute error: {0}")]
    Compute(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
