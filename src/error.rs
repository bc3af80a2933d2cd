//! Error types for favicon generation.

use crate::ico::EncodeError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a favicon set.
#[derive(Debug, Error)]
pub enum Error {
    /// The input file does not exist.
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    /// A color string could not be parsed.
    #[error("invalid color {0:?} (expected \"transparent\" or hex like \"#1a2b3c\")")]
    InvalidColor(String),

    /// Decoding, resizing or re-encoding an image failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Building the multi-resolution icon container failed.
    #[error("ICO encoding error: {0}")]
    Encode(#[from] EncodeError),

    /// Serializing the web manifest failed.
    #[error("manifest serialization error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Reading or writing an output file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
