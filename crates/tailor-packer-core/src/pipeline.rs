use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::config::{ManifestMode, PackerConfig, TAILOR_FILE_NAME, TailorOverrides};
use crate::error::Result;
use crate::manifest::write_manifest;
use crate::model::{SheetStats, TailorRecord};
use crate::optimize::PngOptimizer;
use crate::sheet::Sheet;

/// Progress notification handed to the `run_with` observer after each tailor.
#[derive(Debug, Clone, Copy)]
pub struct TailorReport<'a> {
    /// Zero-based position of this tailor in the (sorted) folder list.
    pub index: usize,
    pub total: usize,
    pub record: &'a TailorRecord,
    pub sheet_path: &'a Path,
    pub stats: SheetStats,
}

/// Packs every immediate subfolder of `sprite_root` into
/// `<sheet_dir>/<spritesheet>.png` and writes the tailors manifest to
/// `manifest_path`. Returns the records that were written.
///
/// Folders and sprites are visited in file-name order, so the output does not
/// depend on filesystem enumeration order. The first error aborts the run.
pub fn run(
    sprite_root: &Path,
    sheet_dir: &Path,
    manifest_path: &Path,
    cfg: &PackerConfig,
    optimizer: &dyn PngOptimizer,
) -> Result<Vec<TailorRecord>> {
    run_with(sprite_root, sheet_dir, manifest_path, cfg, optimizer, |_| {})
}

/// Same as [`run`], calling `on_tailor` once each tailor's sheet is on disk.
#[instrument(skip_all, fields(root = %sprite_root.display()))]
pub fn run_with<F>(
    sprite_root: &Path,
    sheet_dir: &Path,
    manifest_path: &Path,
    cfg: &PackerConfig,
    optimizer: &dyn PngOptimizer,
    mut on_tailor: F,
) -> Result<Vec<TailorRecord>>
where
    F: FnMut(&TailorReport<'_>),
{
    cfg.validate()?;
    let dirs = tailor_dirs(sprite_root)?;
    fs::create_dir_all(sheet_dir)?;
    info!(tailors = dirs.len(), optimizer = optimizer.name(), "packing sprite folders");

    let mut tailors: Vec<TailorRecord> = Vec::with_capacity(dirs.len());
    // sheet stem -> tailor that first wrote it
    let mut written: HashMap<String, String> = HashMap::new();

    for (index, dir) in dirs.iter().enumerate() {
        let (record, sheet) = pack_tailor_dir(dir, cfg)?;
        let sheet_path = sheet_dir.join(format!("{}.png", record.spritesheet));
        if let Some(previous) = written.insert(record.spritesheet.clone(), record.name.clone()) {
            warn!(
                sheet = ?sheet_path,
                previous = %previous,
                tailor = %record.name,
                "sheet written by more than one tailor; earlier sheet is overwritten"
            );
        }
        sheet.save(&sheet_path, optimizer)?;

        let stats = sheet.stats();
        info!(
            tailor = %record.name,
            sheet = ?sheet_path,
            stats = %stats.summary(),
            "tailor packed"
        );

        tailors.push(record);
        if cfg.manifest_mode == ManifestMode::Incremental {
            write_manifest(manifest_path, &tailors)?;
        }
        if let Some(record) = tailors.last() {
            on_tailor(&TailorReport {
                index,
                total: dirs.len(),
                record,
                sheet_path: &sheet_path,
                stats,
            });
        }
    }

    if cfg.manifest_mode == ManifestMode::Final || tailors.is_empty() {
        write_manifest(manifest_path, &tailors)?;
    }
    info!(manifest = ?manifest_path, tailors = tailors.len(), "manifest written");
    Ok(tailors)
}

/// Packs the PNGs of a single tailor folder into a fresh sheet.
///
/// The returned record carries the folder's `tailor.json` overrides (or the
/// defaults) and one dressing per sprite, in placement order.
pub fn pack_tailor_dir(dir: &Path, cfg: &PackerConfig) -> Result<(TailorRecord, Sheet)> {
    let dir_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let overrides = TailorOverrides::load(&dir.join(TAILOR_FILE_NAME))?;
    let mut record = overrides.resolve(&dir_name);

    let mut sheet = Sheet::new(cfg.max_width).with_background(cfg.background_color);
    for path in sprite_paths(dir)? {
        let image = ImageReader::open(&path)?.with_guessed_format()?.decode()?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let placed = sheet.add_sprite(name, &image)?;
        record.dressings.push(placed);
    }
    debug!(
        tailor = %record.name,
        dir = %dir.display(),
        sprites = record.dressings.len(),
        "folder packed"
    );
    Ok((record, sheet))
}

/// Immediate subdirectories of `root`, sorted by name.
pub fn tailor_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.path().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

/// `*.png` files directly inside `dir`, sorted by name. Hidden files are
/// skipped, as a shell glob would.
pub fn sprite_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut list = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let p = entry.path();
        if p.is_file() && is_png(p) && !is_hidden(p) {
            list.push(entry.into_path());
        }
    }
    Ok(list)
}

fn is_png(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

fn is_hidden(p: &Path) -> bool {
    p.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
