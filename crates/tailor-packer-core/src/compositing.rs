use image::{Rgba, RgbaImage};

use crate::model::Rect;

/// Allocate a `w x h` canvas filled with `background`.
pub fn new_canvas(w: u32, h: u32, background: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(background))
}

/// Copy all of `src` into `canvas` with its top-left at (dx, dy).
///
/// Pixels replace whatever is underneath, alpha included; nothing is blended.
/// Parts of `src` falling outside the canvas are dropped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    let rw = sw.min(cw.saturating_sub(dx));
    let rh = sh.min(ch.saturating_sub(dy));
    for yy in 0..rh {
        for xx in 0..rw {
            canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
        }
    }
}

/// Copy the pixels under `rect` out of `sheet`. Returns None if `rect` is not
/// fully inside the sheet.
pub fn extract_rgba(sheet: &RgbaImage, rect: &Rect) -> Option<RgbaImage> {
    let (w, h) = sheet.dimensions();
    if !Rect::new(0, 0, w, h).contains(rect) {
        return None;
    }
    Some(RgbaImage::from_fn(rect.w, rect.h, |x, y| {
        *sheet.get_pixel(rect.x + x, rect.y + y)
    }))
}
