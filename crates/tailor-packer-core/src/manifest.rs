use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::Result;
use crate::model::TailorRecord;

const INDENT: &[u8] = b"    ";

/// Serialize the tailors as a JSON array, pretty-printed with 4-space indentation.
/// Shape: `[ { name, allow_clear, spritesheet, z-index, ..extra, dressings: [{name, width, height, x, y}] } ]`.
pub fn to_json_string(records: &[TailorRecord]) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    records.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes the manifest to `path` by writing a sibling `*.tmp` file and renaming
/// it over the target, so readers never observe a half-written manifest.
pub fn write_manifest(path: &Path, records: &[TailorRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = to_json_string(records)?;
    let tmp = tmp_path(path);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn read_manifest(path: &Path) -> Result<Vec<TailorRecord>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
