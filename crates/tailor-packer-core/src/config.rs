use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, TailorError};
use crate::model::TailorRecord;

/// Name of the optional per-folder override file.
pub const TAILOR_FILE_NAME: &str = "tailor.json";
/// Default sheet width limit in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 6400;
/// Default stacking order for a tailor without an explicit `z-index`.
pub const DEFAULT_Z_INDEX: i64 = 100;
/// Transparent orange-red.
pub const DEFAULT_BACKGROUND: [u8; 4] = [255, 69, 0, 0];

/// Which PNG optimizer runs over every written sheet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    /// Use `optipng` when it can be found, otherwise skip optimization with a warning.
    Auto,
    /// Always run `optipng`; a missing binary aborts the run.
    OptiPng,
    /// Leave written sheets untouched.
    None,
}

impl FromStr for OptimizerKind {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "optipng" => Ok(Self::OptiPng),
            "none" | "off" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// When the manifest is written to disk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ManifestMode {
    /// Rewrite the manifest after every finished tailor, so the sheets already
    /// on disk are always described even if a later folder fails.
    Incremental,
    /// Write the manifest once, after every tailor has been packed.
    Final,
}

impl FromStr for ManifestMode {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "incremental" => Ok(Self::Incremental),
            "final" => Ok(Self::Final),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Maximum sheet width in pixels. Rows wrap before exceeding it.
    pub max_width: u32,
    /// RGBA fill for sheet pixels not covered by a sprite.
    #[serde(default = "default_background")]
    pub background_color: [u8; 4],
    #[serde(default = "default_manifest_mode")]
    pub manifest_mode: ManifestMode,

    #[serde(default = "default_optimizer")]
    pub optimizer: OptimizerKind,
    /// Explicit optipng binary. None => look it up on `PATH`.
    #[serde(default)]
    pub optipng_path: Option<PathBuf>,
    /// optipng `-o` level (0..=7). None => optipng's own default.
    #[serde(default)]
    pub optimization_level: Option<u8>,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            background_color: default_background(),
            manifest_mode: default_manifest_mode(),
            optimizer: default_optimizer(),
            optipng_path: None,
            optimization_level: None,
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if `max_width` is zero or the optimization level is
    /// outside optipng's `0..=7` range.
    pub fn validate(&self) -> Result<()> {
        if self.max_width == 0 {
            return Err(TailorError::InvalidDimensions {
                max_width: self.max_width,
            });
        }
        if let Some(level) = self.optimization_level {
            if level > 7 {
                return Err(TailorError::InvalidConfig(format!(
                    "optimization_level ({}) must be within 0..=7",
                    level
                )));
            }
        }
        Ok(())
    }

    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}

fn default_background() -> [u8; 4] {
    DEFAULT_BACKGROUND
}
fn default_manifest_mode() -> ManifestMode {
    ManifestMode::Incremental
}
fn default_optimizer() -> OptimizerKind {
    OptimizerKind::Auto
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn max_width(mut self, v: u32) -> Self {
        self.cfg.max_width = v;
        self
    }
    pub fn background_color(mut self, v: [u8; 4]) -> Self {
        self.cfg.background_color = v;
        self
    }
    pub fn manifest_mode(mut self, v: ManifestMode) -> Self {
        self.cfg.manifest_mode = v;
        self
    }
    pub fn optimizer(mut self, v: OptimizerKind) -> Self {
        self.cfg.optimizer = v;
        self
    }
    pub fn optipng_path(mut self, v: Option<PathBuf>) -> Self {
        self.cfg.optipng_path = v;
        self
    }
    pub fn optimization_level(mut self, v: Option<u8>) -> Self {
        self.cfg.optimization_level = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

/// Contents of a folder's `tailor.json`. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TailorOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_clear: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spritesheet: Option<String>,
    #[serde(rename = "z-index", default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    /// Any other keys; passed through to the manifest untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TailorOverrides {
    /// Loads `path` if it exists. A missing file or a file holding `null`
    /// yields the defaults; anything other than a JSON object is rejected.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text).map_err(|e| {
            TailorError::InvalidTailorFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        let overrides: Self = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(_) => {
                serde_json::from_value(value).map_err(|e| TailorError::InvalidTailorFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?
            }
            other => {
                return Err(TailorError::InvalidTailorFile {
                    path: path.to_path_buf(),
                    reason: format!("expected a JSON object, found {}", json_kind(&other)),
                });
            }
        };
        if let Some(stem) = &overrides.spritesheet {
            check_sheet_stem(stem).map_err(|reason| TailorError::InvalidTailorFile {
                path: path.to_path_buf(),
                reason,
            })?;
        }
        Ok(overrides)
    }

    /// Fills unset keys with the defaults for folder `dir_name` and returns a
    /// record with no dressings yet.
    pub fn resolve(self, dir_name: &str) -> TailorRecord {
        let mut extra = self.extra;
        // dressings are always regenerated from the folder contents
        extra.remove("dressings");
        TailorRecord {
            name: self.name.unwrap_or_else(|| dir_name.to_string()),
            allow_clear: self.allow_clear.unwrap_or(true),
            spritesheet: self.spritesheet.unwrap_or_else(|| dir_name.to_string()),
            z_index: self.z_index.unwrap_or(DEFAULT_Z_INDEX),
            extra,
            dressings: Vec::new(),
        }
    }
}

/// A sheet stem must name a single file inside the sheet directory.
fn check_sheet_stem(stem: &str) -> std::result::Result<(), String> {
    if stem.is_empty() {
        return Err("spritesheet must not be empty".into());
    }
    if stem.contains(['/', '\\']) {
        return Err(format!("spritesheet '{}' must not contain a path separator", stem));
    }
    if stem == "." || stem == ".." {
        return Err(format!("spritesheet '{}' is not a file name", stem));
    }
    Ok(())
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
