//! Separable soft-edge blur for region masks.
//!
//! A two-pass smoothstep-weighted box filter. For each tap
//! `i in [-r, +r]` the weight is `smoothstep(0, 1, 1 - |i|/r)`; the
//! weighted sum is divided by the integer radius `r`, not by the sum
//! of weights. That normalization makes falloff also scale mask
//! opacity slightly at small radii and is kept to match the shipping
//! player pending product-owner review.
//!
//! Radius derivation:
//!
//! ```text
//! diameter = falloff * image_height          (pixels)
//! r        = clamp(round(diameter / 2), 2, 256)
//! step     = diameter / (2 r * dim)          (UV, per pass axis)
//! ```

use rayon::prelude::*;
use tracing::trace;

use crate::CompResult;
use crate::mask::MaskBuffer;

/// Hard lower bound on the blur radius in pixels.
pub const MIN_RADIUS: i32 = 2;
/// Hard upper bound on the blur radius in pixels.
pub const MAX_RADIUS: i32 = 256;

/// Blur radius in pixels for a falloff and image height.
#[inline]
pub fn blur_radius(falloff: f32, image_height: u32) -> i32 {
    let diameter = falloff * image_height as f32;
    ((0.5 * diameter).round() as i32).clamp(MIN_RADIUS, MAX_RADIUS)
}

#[inline]
fn smoothstep(x: f32) -> f32 {
    let t = x.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Tap weights for radius `r`: `smoothstep(1 - |i|/r)` for `i in [-r, r]`.
fn weights(r: i32) -> Vec<f32> {
    (-r..=r)
        .map(|i| smoothstep(1.0 - (i.abs() as f32) / r as f32))
        .collect()
}

/// Mirrored-repeat addressing, matching the mask texture wrap mode.
#[inline]
fn mirror(i: i32, len: i32) -> i32 {
    if len == 1 {
        return 0;
    }
    let period = 2 * len;
    let mut m = i.rem_euclid(period);
    if m >= len {
        m = period - 1 - m;
    }
    m
}

/// Linearly samples a row/column at a fractional coordinate.
#[inline]
fn sample(line: &[f32], x: f32) -> f32 {
    let len = line.len() as i32;
    let floor = x.floor();
    let frac = x - floor;
    let a = line[mirror(floor as i32, len) as usize];
    let b = line[mirror(floor as i32 + 1, len) as usize];
    a + (b - a) * frac
}

fn blur_line(src: &[f32], dst: &mut [f32], weights: &[f32], r: i32, step_px: f32) {
    for (x, out) in dst.iter_mut().enumerate() {
        let mut acc = 0.0f32;
        for (k, &w) in weights.iter().enumerate() {
            let i = k as i32 - r;
            acc += w * sample(src, x as f32 + i as f32 * step_px);
        }
        *out = acc / r as f32;
    }
}

/// Applies the two-pass blur in place: vertical into scratch, then
/// horizontal back into the mask.
pub fn separable_blur(mask: &mut MaskBuffer, falloff: f32) -> CompResult<()> {
    let (w, h) = (mask.width as usize, mask.height as usize);
    let r = blur_radius(falloff, mask.height);
    let diameter = falloff * mask.height as f32;
    // per-tap distance in pixels; the UV step times the pass dimension
    let step_px = diameter / (2.0 * r as f32);
    let weights = weights(r);

    trace!(r, step_px, falloff, "separable blur");

    // pass 1: vertical, mask -> scratch
    let mut scratch = vec![0.0f32; w * h];
    {
        let columns: Vec<(usize, Vec<f32>)> = (0..w)
            .map(|x| (x, (0..h).map(|y| mask.data[y * w + x]).collect()))
            .collect();

        let blurred: Vec<(usize, Vec<f32>)> = columns
            .par_iter()
            .map(|(x, col)| {
                let mut out = vec![0.0f32; h];
                blur_line(col, &mut out, &weights, r, step_px);
                (*x, out)
            })
            .collect();

        for (x, col) in blurred {
            for (y, v) in col.into_iter().enumerate() {
                scratch[y * w + x] = v;
            }
        }
    }

    // pass 2: horizontal, scratch -> mask
    mask.data
        .par_chunks_mut(w)
        .zip(scratch.par_chunks(w))
        .for_each(|(dst, src)| {
            blur_line(src, dst, &weights, r, step_px);
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::rasterize;
    use approx::assert_relative_eq;

    #[test]
    fn test_radius_boundaries() {
        // falloff 0 clamps up to the minimum
        assert_eq!(blur_radius(0.0, 1080), 2);
        // falloff 1 on a 256-tall image
        assert_eq!(blur_radius(1.0, 256), 128);
        // falloff 1 on a 1024-tall image clamps down to the maximum
        assert_eq!(blur_radius(1.0, 1024), 256);
    }

    #[test]
    fn test_weights_shape() {
        let w = weights(2);
        assert_eq!(w.len(), 5);
        assert_eq!(w[2], 1.0);
        assert_relative_eq!(w[1], 0.5, epsilon = 1e-6);
        assert_eq!(w[0], 0.0);
    }

    #[test]
    fn test_zero_falloff_is_identity() {
        // diameter 0 makes every tap sample the same texel and the
        // weight sum equals r, so the pass divides out exactly
        let square = vec![vec![(-0.25, -0.25), (0.25, -0.25), (0.25, 0.25), (-0.25, 0.25)]];
        let mut mask = rasterize(32, 32, &square).unwrap();
        let original = mask.clone();

        separable_blur(&mut mask, 0.0).unwrap();
        separable_blur(&mut mask, 0.0).unwrap();

        for (a, b) in mask.data.iter().zip(original.data.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_blur_softens_edge() {
        let square = vec![vec![(-0.2, -0.2), (0.2, -0.2), (0.2, 0.2), (-0.2, 0.2)]];
        let mut mask = rasterize(64, 64, &square).unwrap();
        separable_blur(&mut mask, 0.3).unwrap();

        // deep interior stays strong, edge texel becomes fractional
        assert!(mask.at(32, 32) > 0.8);
        let edge = mask.at(19, 32);
        assert!(edge > 0.0 && edge < 1.0, "edge texel should be soft, got {edge}");
        // far exterior stays near zero
        assert!(mask.at(2, 32) < 0.05);
    }

    #[test]
    fn test_mirror_addressing() {
        assert_eq!(mirror(-1, 4), 0);
        assert_eq!(mirror(4, 4), 3);
        assert_eq!(mirror(5, 4), 2);
        assert_eq!(mirror(2, 4), 2);
    }
}
