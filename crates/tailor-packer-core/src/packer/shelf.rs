use super::Packer;
use crate::error::{Result, TailorError};
use crate::model::PlacedSprite;

/// Row-based ("shelf") packer.
///
/// Sprites go left to right along the current row; a sprite that would cross
/// `max_width` starts a new row directly below the tallest sprite of the
/// previous one. The sheet grows to the rightmost and bottom-most occupied pixel.
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    max_width: u32,
    width: u32,
    height: u32,
    cursor_x: u32,
    row_top: u32,
    row_height: u32,
}

impl ShelfPacker {
    pub fn new(max_width: u32) -> Self {
        Self {
            max_width,
            width: 0,
            height: 0,
            cursor_x: 0,
            row_top: 0,
            row_height: 0,
        }
    }

    /// Height of the row currently being filled.
    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    #[inline]
    fn fits_in_row(&self, w: u32) -> bool {
        self.cursor_x as u64 + w as u64 <= self.max_width as u64
    }
}

impl Packer for ShelfPacker {
    fn can_place(&self, w: u32, _h: u32) -> bool {
        w <= self.max_width
    }

    fn place(&mut self, name: String, w: u32, h: u32) -> Result<PlacedSprite> {
        if !self.can_place(w, h) {
            return Err(TailorError::SpriteTooWide {
                name,
                width: w,
                max_width: self.max_width,
            });
        }

        let (x, y) = if self.fits_in_row(w) {
            self.row_height = self.row_height.max(h);
            (self.cursor_x, self.row_top)
        } else {
            self.row_top = self.row_top.saturating_add(self.row_height);
            self.row_height = h;
            (0, self.row_top)
        };

        self.cursor_x = x + w;
        self.width = self.width.max(x + w);
        self.height = self.row_top.saturating_add(self.row_height);
        debug_assert!(self.width <= self.max_width);

        Ok(PlacedSprite {
            name,
            width: w,
            height: h,
            x,
            y,
        })
    }

    fn extents(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
