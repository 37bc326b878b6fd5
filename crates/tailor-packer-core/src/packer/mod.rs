use crate::error::Result;
use crate::model::PlacedSprite;

pub mod shelf;

/// A packer places sprites onto a single sheet that grows as needed.
///
/// Implementations must ensure no overlaps and never rotate, trim or resize.
/// `place` returns an error when the sprite can never fit on the sheet.
pub trait Packer {
    fn can_place(&self, w: u32, h: u32) -> bool;
    fn place(&mut self, name: String, w: u32, h: u32) -> Result<PlacedSprite>;
    /// Current occupied `(width, height)` of the sheet.
    fn extents(&self) -> (u32, u32);
}
