use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use serde::Deserialize;
use tailor_packer_core::config::{
    DEFAULT_BACKGROUND, DEFAULT_MAX_WIDTH, ManifestMode, OptimizerKind,
};
use tailor_packer_core::{PackerConfig, optimize, run_with};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "tailor-packer",
    about = "Pack folders of sprites into spritesheets plus a tailors manifest",
    version,
    author
)]
struct Cli {
    // Input/Output
    /// Sprite root; every immediate subfolder becomes one tailor and one sheet
    #[arg(help_heading = "Input/Output")]
    sprite_root: PathBuf,
    /// Directory the spritesheet PNGs are written to
    #[arg(help_heading = "Input/Output")]
    sheet_dir: PathBuf,
    /// Path of the tailors JSON manifest
    #[arg(help_heading = "Input/Output")]
    manifest: PathBuf,
    /// YAML config file path (overrides the options below)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    // Layout
    /// Max sheet width; rows wrap before crossing it
    #[arg(long, default_value_t = DEFAULT_MAX_WIDTH, help_heading = "Layout")]
    max_width: u32,
    /// Background RGBA as r,g,b,a
    #[arg(long, default_value = "255,69,0,0", help_heading = "Layout")]
    background: String,

    // Export
    /// PNG optimizer: auto | optipng | none
    #[arg(long, value_parser = ["auto", "optipng", "none"], default_value = "auto", help_heading = "Export")]
    optimizer: String,
    /// optipng binary (default: looked up on PATH)
    #[arg(long, help_heading = "Export")]
    optipng_path: Option<PathBuf>,
    /// optipng optimization level (0..=7)
    #[arg(long, help_heading = "Export")]
    optimization_level: Option<u8>,
    /// Manifest writes: incremental (after every tailor) | final (once at the end)
    #[arg(long, value_parser = ["incremental", "final"], default_value = "incremental", help_heading = "Export")]
    manifest_mode: String,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,

    /// Show a progress bar (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    run_pack(&cli, cli.progress && !cli.quiet)
}

fn run_pack(cli: &Cli, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }
    cfg.validate()?;

    let optimizer = optimize::from_config(&cfg);
    let bar = if show_progress {
        use indicatif::{ProgressBar, ProgressStyle};
        let b = ProgressBar::new(0);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} packing {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };

    let tailors = run_with(
        &cli.sprite_root,
        &cli.sheet_dir,
        &cli.manifest,
        &cfg,
        optimizer.as_ref(),
        |report| {
            if let Some(b) = &bar {
                b.set_length(report.total as u64);
                b.set_message(report.record.name.clone());
                b.inc(1);
            }
        },
    )
    .with_context(|| format!("pack sprites from {}", cli.sprite_root.display()))?;

    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    let sprites: usize = tailors.iter().map(|t| t.dressings.len()).sum();
    info!(
        tailors = tailors.len(),
        sprites,
        manifest = ?cli.manifest,
        "tailors written"
    );
    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<PackerConfig> {
    let base = PackerConfig {
        max_width: cli.max_width,
        background_color: parse_rgba(&cli.background)?,
        manifest_mode: parse_manifest_mode(&cli.manifest_mode)?,
        optimizer: parse_optimizer(&cli.optimizer)?,
        optipng_path: cli.optipng_path.clone(),
        optimization_level: cli.optimization_level,
    };
    // config file sets options en bloc on top of the CLI values
    let cfg = if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        y.into_packer_config(base)?
    } else {
        base
    };
    Ok(cfg)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct YamlConfig {
    max_width: Option<u32>,
    background_color: Option<[u8; 4]>,
    manifest_mode: Option<String>,
    optimizer: Option<String>,
    optipng_path: Option<PathBuf>,
    optimization_level: Option<u8>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> anyhow::Result<PackerConfig> {
        if let Some(v) = self.max_width {
            cfg.max_width = v;
        }
        if let Some(v) = self.background_color {
            cfg.background_color = v;
        }
        if let Some(v) = self.manifest_mode {
            cfg.manifest_mode = parse_manifest_mode(&v)?;
        }
        if let Some(v) = self.optimizer {
            cfg.optimizer = parse_optimizer(&v)?;
        }
        if let Some(v) = self.optipng_path {
            cfg.optipng_path = Some(v);
        }
        if let Some(v) = self.optimization_level {
            cfg.optimization_level = Some(v);
        }
        Ok(cfg)
    }
}

fn parse_optimizer(s: &str) -> anyhow::Result<OptimizerKind> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown optimizer: {}", s))
}

fn parse_manifest_mode(s: &str) -> anyhow::Result<ManifestMode> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown manifest mode: {}", s))
}

fn parse_rgba(s: &str) -> anyhow::Result<[u8; 4]> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        anyhow::bail!("background must be r,g,b,a, got: {}", s);
    }
    let mut out = DEFAULT_BACKGROUND;
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .with_context(|| format!("invalid color channel '{}' in {}", part, s))?;
    }
    Ok(out)
}
