//! Grade correction parameters (blackpoint/whitepoint/lift/gain/multiply/gamma).
//!
//! Applied after the CDL, the grade remaps the black and white points,
//! lifts shadows, scales highlights, multiplies overall and applies a
//! per-channel gamma:
//!
//! ```text
//! A = multiply * (gain - lift) / (whitepoint - blackpoint)
//! B = lift - A * blackpoint
//! out = (A * in + B) ^ (1 / gamma)
//! ```

/// Minimum divisor to keep whitepoint == blackpoint from blowing up.
const MIN_DIVISOR: f32 = 1e-6;

/// Six-knob grade correction.
///
/// # Example
///
/// ```rust
/// use rcc_core::Grade;
///
/// let grade = Grade::new().with_gain([1.2, 1.0, 0.8]);
/// let mut rgb = [0.5, 0.5, 0.5];
/// grade.apply(&mut rgb);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    /// Input level mapped to 0 [R, G, B].
    pub blackpoint: [f32; 3],
    /// Input level mapped to 1 [R, G, B].
    pub whitepoint: [f32; 3],
    /// Output level for blacks [R, G, B].
    pub lift: [f32; 3],
    /// Output level for whites [R, G, B].
    pub gain: [f32; 3],
    /// Overall multiplier [R, G, B].
    pub multiply: [f32; 3],
    /// Per-channel gamma [R, G, B].
    pub gamma: [f32; 3],
}

impl Default for Grade {
    fn default() -> Self {
        Self::new()
    }
}

impl Grade {
    /// Creates an identity grade (no color change).
    pub fn new() -> Self {
        Self {
            blackpoint: [0.0, 0.0, 0.0],
            whitepoint: [1.0, 1.0, 1.0],
            lift: [0.0, 0.0, 0.0],
            gain: [1.0, 1.0, 1.0],
            multiply: [1.0, 1.0, 1.0],
            gamma: [1.0, 1.0, 1.0],
        }
    }

    /// Sets the blackpoint values.
    pub fn with_blackpoint(mut self, blackpoint: [f32; 3]) -> Self {
        self.blackpoint = blackpoint;
        self
    }

    /// Sets the whitepoint values.
    pub fn with_whitepoint(mut self, whitepoint: [f32; 3]) -> Self {
        self.whitepoint = whitepoint;
        self
    }

    /// Sets the lift values.
    pub fn with_lift(mut self, lift: [f32; 3]) -> Self {
        self.lift = lift;
        self
    }

    /// Sets the gain values.
    pub fn with_gain(mut self, gain: [f32; 3]) -> Self {
        self.gain = gain;
        self
    }

    /// Sets the multiply values.
    pub fn with_multiply(mut self, multiply: [f32; 3]) -> Self {
        self.multiply = multiply;
        self
    }

    /// Sets the gamma values.
    pub fn with_gamma(mut self, gamma: [f32; 3]) -> Self {
        self.gamma = gamma;
        self
    }

    /// Check if this grade is identity (no-op).
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.blackpoint == [0.0, 0.0, 0.0]
            && self.whitepoint == [1.0, 1.0, 1.0]
            && self.lift == [0.0, 0.0, 0.0]
            && self.gain == [1.0, 1.0, 1.0]
            && self.multiply == [1.0, 1.0, 1.0]
            && self.gamma == [1.0, 1.0, 1.0]
    }

    /// Applies the grade to an RGB pixel in-place.
    #[inline]
    pub fn apply(&self, rgb: &mut [f32; 3]) {
        for i in 0..3 {
            let range = (self.whitepoint[i] - self.blackpoint[i]).max(MIN_DIVISOR);
            let a = self.multiply[i] * (self.gain[i] - self.lift[i]) / range;
            let b = self.lift[i] - a * self.blackpoint[i];
            let v = (a * rgb[i] + b).max(0.0);
            rgb[i] = if self.gamma[i] == 1.0 {
                v
            } else {
                v.powf(1.0 / self.gamma[i].max(MIN_DIVISOR))
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let grade = Grade::new();
        assert!(grade.is_identity());

        let mut pixel = [0.5, 0.3, 0.2];
        grade.apply(&mut pixel);
        assert!((pixel[0] - 0.5).abs() < 0.001);
        assert!((pixel[1] - 0.3).abs() < 0.001);
        assert!((pixel[2] - 0.2).abs() < 0.001);
    }

    #[test]
    fn test_lift_raises_black() {
        let grade = Grade::new().with_lift([0.1, 0.1, 0.1]);
        let mut pixel = [0.0, 0.0, 0.0];
        grade.apply(&mut pixel);
        assert!((pixel[0] - 0.1).abs() < 0.001);
    }

    #[test]
    fn test_gain_scales_white() {
        let grade = Grade::new().with_gain([2.0, 2.0, 2.0]);
        let mut pixel = [1.0, 0.5, 0.0];
        grade.apply(&mut pixel);
        assert!((pixel[0] - 2.0).abs() < 0.001);
        assert!((pixel[1] - 1.0).abs() < 0.001);
        assert!(pixel[2].abs() < 0.001);
    }

    #[test]
    fn test_blackpoint_remap() {
        let grade = Grade::new().with_blackpoint([0.2, 0.2, 0.2]);
        let mut pixel = [0.2, 0.2, 0.2];
        grade.apply(&mut pixel);
        assert!(pixel[0].abs() < 0.001);
    }
}
