use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    /// True if the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
}

/// A sprite ("dressing") placed on a sheet. Serialized verbatim into the manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacedSprite {
    /// File stem of the source PNG.
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl PlacedSprite {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// One manifest entry: a sprite folder ("tailor") and the sheet it was packed into.
///
/// Keys from `tailor.json` that are not modelled here are kept in `extra` and
/// written back out next to the known ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TailorRecord {
    pub name: String,
    pub allow_clear: bool,
    /// Sheet file stem; the image lives at `<sheet_dir>/<spritesheet>.png`.
    pub spritesheet: String,
    #[serde(rename = "z-index")]
    pub z_index: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub dressings: Vec<PlacedSprite>,
}

/// Statistics about how well a sheet is filled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SheetStats {
    pub num_sprites: usize,
    pub width: u32,
    pub height: u32,
    /// `width * height` of the sheet.
    pub sheet_area: u64,
    /// Sum of `width * height` over every placed sprite.
    pub used_area: u64,
    /// used_area / sheet_area (0.0 to 1.0). Zero for an empty sheet.
    pub occupancy: f64,
}

impl SheetStats {
    pub fn from_sprites(width: u32, height: u32, sprites: &[PlacedSprite]) -> Self {
        let sheet_area = (width as u64) * (height as u64);
        let used_area = sprites
            .iter()
            .map(|s| (s.width as u64) * (s.height as u64))
            .sum();
        let occupancy = if sheet_area > 0 {
            used_area as f64 / sheet_area as f64
        } else {
            0.0
        };
        Self {
            num_sprites: sprites.len(),
            width,
            height,
            sheet_area,
            used_area,
            occupancy,
        }
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.sheet_area.saturating_sub(self.used_area)
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Sprites: {}, Size: {}x{}, Occupancy: {:.2}%, Wasted: {} px²",
            self.num_sprites,
            self.width,
            self.height,
            self.occupancy * 100.0,
            self.wasted_area(),
        )
    }
}
