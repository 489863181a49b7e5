//! ASC CDL correction parameters.
//!
//! The CDL formula applies Slope, Offset, Power (SOP) followed by
//! Saturation:
//!
//! ```text
//! // Per-channel SOP:
//! out = clamp(in * slope + offset, 0, 1) ^ power
//!
//! // Global saturation:
//! luma = 0.2126 * R + 0.7152 * G + 0.0722 * B
//! out = luma + (out - luma) * saturation
//! ```

use crate::{REC709_LUMA_B, REC709_LUMA_G, REC709_LUMA_R};

/// Color Decision List correction: slope, offset, power, saturation.
///
/// # Example
///
/// ```rust
/// use rcc_core::Cdl;
///
/// let cdl = Cdl::new()
///     .with_slope([1.1, 1.0, 0.9])
///     .with_saturation(1.2);
///
/// let mut rgb = [0.5, 0.5, 0.5];
/// cdl.apply(&mut rgb);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Cdl {
    /// Slope (multiply) per channel [R, G, B].
    pub slope: [f32; 3],
    /// Offset (add) per channel [R, G, B].
    pub offset: [f32; 3],
    /// Power (gamma) per channel [R, G, B].
    pub power: [f32; 3],
    /// Saturation adjustment (1.0 = no change).
    pub saturation: f32,
}

impl Default for Cdl {
    fn default() -> Self {
        Self::new()
    }
}

impl Cdl {
    /// Creates an identity CDL (no color change).
    pub fn new() -> Self {
        Self {
            slope: [1.0, 1.0, 1.0],
            offset: [0.0, 0.0, 0.0],
            power: [1.0, 1.0, 1.0],
            saturation: 1.0,
        }
    }

    /// Sets the slope values.
    pub fn with_slope(mut self, slope: [f32; 3]) -> Self {
        self.slope = slope;
        self
    }

    /// Sets the offset values.
    pub fn with_offset(mut self, offset: [f32; 3]) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the power values.
    pub fn with_power(mut self, power: [f32; 3]) -> Self {
        self.power = power;
        self
    }

    /// Sets the saturation value.
    pub fn with_saturation(mut self, saturation: f32) -> Self {
        self.saturation = saturation;
        self
    }

    /// Check if this CDL is identity (no-op).
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.slope == [1.0, 1.0, 1.0]
            && self.offset == [0.0, 0.0, 0.0]
            && self.power == [1.0, 1.0, 1.0]
            && (self.saturation - 1.0).abs() < 1e-6
    }

    /// Applies the CDL correction to an RGB pixel in-place.
    #[inline]
    pub fn apply(&self, rgb: &mut [f32; 3]) {
        // Order: Slope -> Offset -> Clamp [0,1] -> Power -> Saturation
        for i in 0..3 {
            let v = rgb[i] * self.slope[i] + self.offset[i];
            let clamped = v.clamp(0.0, 1.0);
            rgb[i] = if self.power[i] == 1.0 {
                clamped
            } else {
                clamped.powf(self.power[i])
            };
        }

        if (self.saturation - 1.0).abs() > 1e-6 {
            let src = *rgb;
            let luma =
                src[0] * REC709_LUMA_R + src[1] * REC709_LUMA_G + src[2] * REC709_LUMA_B;
            rgb[0] = luma + self.saturation * (src[0] - luma);
            rgb[1] = luma + self.saturation * (src[1] - luma);
            rgb[2] = luma + self.saturation * (src[2] - luma);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let cdl = Cdl::new();
        assert!(cdl.is_identity());

        let mut pixel = [0.5, 0.3, 0.2];
        let original = pixel;
        cdl.apply(&mut pixel);

        assert!((pixel[0] - original[0]).abs() < 0.001);
        assert!((pixel[1] - original[1]).abs() < 0.001);
        assert!((pixel[2] - original[2]).abs() < 0.001);
    }

    #[test]
    fn test_slope() {
        let cdl = Cdl::new().with_slope([2.0, 1.0, 0.5]);
        let mut pixel = [0.25, 0.5, 0.5];
        cdl.apply(&mut pixel);

        assert!((pixel[0] - 0.5).abs() < 0.001);
        assert!((pixel[1] - 0.5).abs() < 0.001);
        assert!((pixel[2] - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_saturation_to_gray() {
        let cdl = Cdl::new().with_saturation(0.0);
        let mut pixel = [1.0, 0.0, 0.0];
        cdl.apply(&mut pixel);

        let luma = REC709_LUMA_R;
        assert!((pixel[0] - luma).abs() < 0.001);
        assert!((pixel[1] - luma).abs() < 0.001);
        assert!((pixel[2] - luma).abs() < 0.001);
    }
}
