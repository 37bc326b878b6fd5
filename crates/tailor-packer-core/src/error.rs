use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TailorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid sheet dimensions: max_width={max_width}")]
    InvalidDimensions { max_width: u32 },
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Sprite '{name}' is {width}px wide, wider than the sheet max_width {max_width}px")]
    SpriteTooWide {
        name: String,
        width: u32,
        max_width: u32,
    },
    #[error("Invalid tailor file {}: {reason}", path.display())]
    InvalidTailorFile { path: PathBuf, reason: String },
    #[error("PNG optimizer '{program}' failed: {reason}")]
    Optimizer { program: String, reason: String },
}

pub type Result<T> = std::result::Result<T, TailorError>;
