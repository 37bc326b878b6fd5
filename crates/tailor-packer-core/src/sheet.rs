use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::debug;

use crate::compositing::{blit_rgba, new_canvas};
use crate::config::DEFAULT_BACKGROUND;
use crate::error::Result;
use crate::model::{PlacedSprite, SheetStats};
use crate::optimize::PngOptimizer;
use crate::packer::{Packer, shelf::ShelfPacker};

/// A spritesheet under construction: placements from a [`Packer`] plus the
/// pixels of every placed sprite.
pub struct Sheet<P: Packer = ShelfPacker> {
    packer: P,
    background: [u8; 4],
    sprites: Vec<PlacedSprite>,
    images: Vec<RgbaImage>,
}

impl Sheet<ShelfPacker> {
    /// Shelf-packed sheet that wraps rows at `max_width`.
    pub fn new(max_width: u32) -> Self {
        Self::with_packer(ShelfPacker::new(max_width))
    }
}

impl<P: Packer> Sheet<P> {
    pub fn with_packer(packer: P) -> Self {
        Self {
            packer,
            background: DEFAULT_BACKGROUND,
            sprites: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn with_background(mut self, background: [u8; 4]) -> Self {
        self.background = background;
        self
    }

    /// Places `image` and keeps its pixels for [`Sheet::compose`].
    pub fn add_sprite(
        &mut self,
        name: impl Into<String>,
        image: &DynamicImage,
    ) -> Result<PlacedSprite> {
        let rgba = image.to_rgba8();
        let (w, h) = rgba.dimensions();
        let placed = self.packer.place(name.into(), w, h)?;
        debug!(name = %placed.name, x = placed.x, y = placed.y, w, h, "placed sprite");
        self.sprites.push(placed.clone());
        self.images.push(rgba);
        Ok(placed)
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Occupied `(width, height)`; `(0, 0)` until something is placed.
    pub fn dimensions(&self) -> (u32, u32) {
        self.packer.extents()
    }

    pub fn stats(&self) -> SheetStats {
        let (w, h) = self.dimensions();
        SheetStats::from_sprites(w, h, &self.sprites)
    }

    /// Renders the sheet. An empty sheet renders as a single background pixel
    /// so it can still be written as a valid PNG.
    pub fn compose(&self) -> RgbaImage {
        let (w, h) = self.dimensions();
        let mut canvas = new_canvas(w.max(1), h.max(1), self.background);
        for (sprite, rgba) in self.sprites.iter().zip(&self.images) {
            blit_rgba(rgba, &mut canvas, sprite.x, sprite.y);
        }
        canvas
    }

    /// Writes the composed sheet to `path` as PNG, then runs `optimizer` on it.
    pub fn save(&self, path: &Path, optimizer: &dyn PngOptimizer) -> Result<()> {
        let canvas = self.compose();
        canvas.save_with_format(path, ImageFormat::Png)?;
        debug!(path = %path.display(), optimizer = optimizer.name(), "wrote sheet");
        optimizer.optimize(path)
    }
}
