//! Diagnostic overlay: draws each active mask as a small tile strip.
//!
//! Tile `i` occupies pixels `(100*i + 5, 100)` to `(100*(i+1), 200)`
//! with a one-pixel outline, so mask coverage can be eyeballed during
//! playback without attaching a debugger.

use crate::mask::MaskBuffer;

/// RGBA f32 render target the overlay draws into.
#[derive(Debug)]
pub struct DiagTarget<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a mut [f32],
}

impl<'a> DiagTarget<'a> {
    /// Wraps a row-major RGBA buffer.
    pub fn new(width: u32, height: u32, data: &'a mut [f32]) -> Self {
        debug_assert_eq!(data.len(), (width * height * 4) as usize);
        Self { width, height, data }
    }

    fn put(&mut self, x: i32, y: i32, rgba: [f32; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let base = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.data[base..base + 4].copy_from_slice(&rgba);
    }
}

const OUTLINE: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

/// Tile bounds for mask index `i`: `(x1, y1, x2, y2)` inclusive.
#[inline]
pub fn tile_bounds(i: usize) -> (i32, i32, i32, i32) {
    let i = i as i32;
    (100 * i + 5, 100, 100 * (i + 1), 200)
}

/// Draws one mask into its tile: greyscale coverage plus the outline.
pub fn draw_tile(target: &mut DiagTarget<'_>, index: usize, mask: &MaskBuffer) {
    let (x1, y1, x2, y2) = tile_bounds(index);
    let (tw, th) = ((x2 - x1) as f32, (y2 - y1) as f32);

    // downsampled mask content
    for y in y1..=y2 {
        for x in x1..=x2 {
            let u = ((x - x1) as f32 / tw * mask.width as f32) as u32;
            let v = ((y - y1) as f32 / th * mask.height as f32) as u32;
            let m = mask.at(u.min(mask.width - 1), v.min(mask.height - 1));
            target.put(x, y, [m, m, m, 1.0]);
        }
    }

    // 1-px outline
    for x in x1..=x2 {
        target.put(x, y1, OUTLINE);
        target.put(x, y2, OUTLINE);
    }
    for y in y1..=y2 {
        target.put(x1, y, OUTLINE);
        target.put(x2, y, OUTLINE);
    }
}

/// Draws the whole strip, one tile per mask.
pub fn draw_strip(target: &mut DiagTarget<'_>, masks: &[&MaskBuffer]) {
    for (i, mask) in masks.iter().enumerate() {
        draw_tile(target, i, mask);
    }
}
