//! Post-write PNG optimization.
//!
//! Sheets are written by the `image` crate first and then handed to a
//! [`PngOptimizer`], which may rewrite the file in place. The default is the
//! external `optipng` binary; [`NoopOptimizer`] covers environments without it.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::config::{OptimizerKind, PackerConfig};
use crate::error::{Result, TailorError};

/// Losslessly shrinks a PNG file in place.
pub trait PngOptimizer {
    fn name(&self) -> &str;
    fn optimize(&self, path: &Path) -> Result<()>;
}

/// Leaves the file as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOptimizer;

impl PngOptimizer for NoopOptimizer {
    fn name(&self) -> &str {
        "none"
    }

    fn optimize(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// Runs `optipng [-o<level>] -quiet <file>` with stdout discarded.
#[derive(Debug, Clone)]
pub struct OptiPng {
    program: PathBuf,
    level: Option<u8>,
}

impl OptiPng {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            level: None,
        }
    }

    pub fn with_level(mut self, level: Option<u8>) -> Self {
        self.level = level;
        self
    }
}

impl PngOptimizer for OptiPng {
    fn name(&self) -> &str {
        "optipng"
    }

    fn optimize(&self, path: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        if let Some(level) = self.level {
            cmd.arg(format!("-o{}", level));
        }
        cmd.arg("-quiet").arg(path).stdout(Stdio::null()).stderr(Stdio::piped());
        debug!(program = %self.program.display(), file = %path.display(), "running optimizer");

        let output = cmd.output().map_err(|e| TailorError::Optimizer {
            program: self.program.display().to_string(),
            reason: e.to_string(),
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TailorError::Optimizer {
                program: self.program.display().to_string(),
                reason: format!("{} ({})", output.status, stderr.trim()),
            });
        }
        Ok(())
    }
}

#[cfg(windows)]
const OPTIPNG_BIN: &str = "optipng.exe";
#[cfg(not(windows))]
const OPTIPNG_BIN: &str = "optipng";

fn find_on_path(bin: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    std::env::split_paths(path_var?)
        .map(|dir| dir.join(bin))
        .find(|candidate| candidate.is_file())
}

/// Builds the optimizer selected by `cfg.optimizer`.
///
/// `Auto` degrades to [`NoopOptimizer`] when no binary is found. `OptiPng`
/// never degrades: if the binary is missing, the first sheet write fails.
pub fn from_config(cfg: &PackerConfig) -> Box<dyn PngOptimizer> {
    let path_var = std::env::var_os("PATH");
    from_config_with_path(cfg, path_var.as_deref())
}

/// [`from_config`] with an explicit `PATH` value for the binary lookup.
pub fn from_config_with_path(
    cfg: &PackerConfig,
    path_var: Option<&OsStr>,
) -> Box<dyn PngOptimizer> {
    let located = || {
        cfg.optipng_path
            .clone()
            .or_else(|| find_on_path(OPTIPNG_BIN, path_var))
    };
    match cfg.optimizer {
        OptimizerKind::None => Box::new(NoopOptimizer),
        OptimizerKind::OptiPng => {
            let program = located().unwrap_or_else(|| PathBuf::from(OPTIPNG_BIN));
            Box::new(OptiPng::new(program).with_level(cfg.optimization_level))
        }
        OptimizerKind::Auto => match located() {
            Some(program) => Box::new(OptiPng::new(program).with_level(cfg.optimization_level)),
            None => {
                warn!("optipng not found on PATH; sheets will be written unoptimized");
                Box::new(NoopOptimizer)
            }
        },
    }
}
