//! Region mask rasterization with the even-odd fill rule.
//!
//! Shapes are closed polygons in image space (origin at the image
//! center, y-up, height-normalized). Each shape is filled even-odd, so
//! self-intersecting and multi-loop outlines behave the way a stencil
//! INVERT pass does; shapes within a region accumulate as a union.
//!
//! Point mapping to framebuffer pixels keeps the horizontal extent
//! aspect-correct:
//!
//! ```text
//! x_px = height * p.x + 0.5 * width
//! y_px = height * p.y + 0.5 * height
//! ```

use rayon::prelude::*;

use crate::{CompError, CompResult};

/// Single-channel float mask, row-major, `width * height` texels.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl MaskBuffer {
    /// Allocates an all-zero mask.
    pub fn new(width: u32, height: u32) -> CompResult<Self> {
        if width == 0 || height == 0 {
            return Err(CompError::InvalidDimensions(width, height));
        }
        Ok(Self {
            width,
            height,
            data: vec![0.0; (width as usize) * (height as usize)],
        })
    }

    /// Texel value at (x, y).
    #[inline]
    pub fn at(&self, x: u32, y: u32) -> f32 {
        self.data[(y as usize) * (self.width as usize) + x as usize]
    }
}

/// Maps an image-space point to framebuffer pixel coordinates.
#[inline]
pub fn image_to_pixel(point: (f32, f32), width: u32, height: u32) -> (f32, f32) {
    let h = height as f32;
    (
        h * point.0 + 0.5 * width as f32,
        h * point.1 + 0.5 * h,
    )
}

/// Rasterizes a region's shapes into a mask.
///
/// Each shape is even-odd filled; shapes accumulate as a union (white
/// over white is idempotent). Shapes with fewer than three points
/// contribute nothing.
pub fn rasterize(
    width: u32,
    height: u32,
    shapes: &[Vec<(f32, f32)>],
) -> CompResult<MaskBuffer> {
    let mut mask = MaskBuffer::new(width, height)?;

    let polygons: Vec<Vec<(f32, f32)>> = shapes
        .iter()
        .filter(|s| s.len() >= 3)
        .map(|s| {
            s.iter()
                .map(|&p| image_to_pixel(p, width, height))
                .collect()
        })
        .collect();

    if polygons.is_empty() {
        return Ok(mask);
    }

    let w = width as usize;
    mask.data
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(row, out)| {
            let y = row as f32 + 0.5;
            for poly in &polygons {
                fill_scanline(poly, y, out);
            }
        });

    Ok(mask)
}

/// Even-odd fills one scanline of a polygon into `out`.
///
/// A pixel is covered when its center lies inside an odd number of
/// edge crossings, which is exactly the parity a stencil INVERT pass
/// accumulates.
fn fill_scanline(poly: &[(f32, f32)], y: f32, out: &mut [f32]) {
    let mut crossings: Vec<f32> = Vec::with_capacity(8);

    let n = poly.len();
    for i in 0..n {
        let (x1, y1) = poly[i];
        let (x2, y2) = poly[(i + 1) % n];
        if (y1 <= y) != (y2 <= y) {
            crossings.push(x1 + (y - y1) * (x2 - x1) / (y2 - y1));
        }
    }

    crossings.sort_by(|a, b| a.total_cmp(b));

    for pair in crossings.chunks_exact(2) {
        let (a, b) = (pair[0], pair[1]);
        let start = (a - 0.5).ceil().max(0.0) as usize;
        let end = ((b - 0.5).ceil().max(0.0) as usize).min(out.len());
        for v in &mut out[start..end] {
            *v = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Square centered at the image origin, half-extent `e` in image space.
    fn square(e: f32) -> Vec<(f32, f32)> {
        vec![(-e, -e), (e, -e), (e, e), (-e, e)]
    }

    /// Self-intersecting hourglass: bottom and top lobes fill, the
    /// left/right wings around the crossing stay empty.
    fn hourglass(e: f32) -> Vec<(f32, f32)> {
        vec![(-e, -e), (e, -e), (-e, e), (e, e)]
    }

    #[test]
    fn test_convex_interior_and_exterior() {
        let mask = rasterize(64, 64, &[square(0.25)]).unwrap();

        // center pixel inside
        assert_eq!(mask.at(32, 32), 1.0);
        // interior corner-ish
        assert_eq!(mask.at(20, 20), 1.0);
        // well outside
        assert_eq!(mask.at(2, 2), 0.0);
        assert_eq!(mask.at(60, 32), 0.0);
    }

    #[test]
    fn test_even_odd_hourglass() {
        let mask = rasterize(64, 64, &[hourglass(0.3)]).unwrap();

        // lobes above and below the crossing are covered once
        assert_eq!(mask.at(32, 20), 1.0);
        assert_eq!(mask.at(32, 44), 1.0);
        // wings beside the crossing are covered zero times
        assert_eq!(mask.at(20, 32), 0.0);
        assert_eq!(mask.at(44, 32), 0.0);
    }

    #[test]
    fn test_union_of_shapes() {
        let left: Vec<(f32, f32)> = vec![(-0.4, -0.1), (-0.2, -0.1), (-0.2, 0.1), (-0.4, 0.1)];
        let right: Vec<(f32, f32)> = vec![(0.2, -0.1), (0.4, -0.1), (0.4, 0.1), (0.2, 0.1)];
        let mask = rasterize(64, 64, &[left, right]).unwrap();

        assert_eq!(mask.at(13, 32), 1.0);
        assert_eq!(mask.at(51, 32), 1.0);
        // gap between them
        assert_eq!(mask.at(32, 32), 0.0);
    }

    #[test]
    fn test_degenerate_shapes_contribute_nothing() {
        let mask = rasterize(
            32,
            32,
            &[vec![], vec![(0.0, 0.0)], vec![(0.0, 0.0), (0.2, 0.2)]],
        )
        .unwrap();
        assert!(mask.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_aspect_correct_mapping() {
        // a unit-height square in a 2:1 frame lands centered, scaled by height
        let (x, y) = image_to_pixel((0.0, 0.0), 128, 64);
        assert_eq!((x, y), (64.0, 32.0));
        let (x, _) = image_to_pixel((0.5, 0.0), 128, 64);
        assert_eq!(x, 96.0);
    }

    #[test]
    fn test_zero_dims_rejected() {
        assert!(matches!(
            rasterize(0, 32, &[]),
            Err(CompError::InvalidDimensions(0, 32))
        ));
    }
}
