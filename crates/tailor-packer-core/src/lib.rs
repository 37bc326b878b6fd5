//! Core library for packing folders of sprites into spritesheets.
//!
//! - Packer: row-based shelf packing (`packer::shelf::ShelfPacker`) behind the `Packer` trait
//! - Sheet: composes placed sprites onto one RGBA canvas, writes PNG, runs a `PngOptimizer`
//! - Pipeline: `run` walks one folder per tailor and writes sheets plus the tailors manifest
//! - Data model is serde-serializable; the manifest is a JSON array of `TailorRecord`.
//!
//! Quick example:
//! ```ignore
//! use std::path::Path;
//! use tailor_packer_core::{PackerConfig, NoopOptimizer, run};
//! # fn main() -> anyhow::Result<()> {
//! let cfg = PackerConfig::builder().max_width(2048).build();
//! let tailors = run(
//!     Path::new("sprites"),
//!     Path::new("out/sheets"),
//!     Path::new("out/tailors.json"),
//!     &cfg,
//!     &NoopOptimizer,
//! )?;
//! println!("tailors: {}", tailors.len());
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod manifest;
pub mod model;
pub mod optimize;
pub mod packer;
pub mod pipeline;
pub mod sheet;

pub use config::*;
pub use error::*;
pub use manifest::*;
pub use model::*;
pub use optimize::*;
pub use packer::*;
pub use pipeline::*;
pub use sheet::*;

/// Convenience prelude for common types and functions.
/// Importing `tailor_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        ManifestMode, OptimizerKind, PackerConfig, PackerConfigBuilder, TailorOverrides,
    };
    pub use crate::model::{PlacedSprite, Rect, SheetStats, TailorRecord};
    pub use crate::optimize::{NoopOptimizer, OptiPng, PngOptimizer};
    pub use crate::packer::{Packer, shelf::ShelfPacker};
    pub use crate::sheet::Sheet;
    pub use crate::{read_manifest, run, run_with, write_manifest};
}
