//! Full correction: CDL followed by Grade, with fixed binary packing.
//!
//! The packed form is 28 little-endian f32 values in declaration order
//! (slope, offset, power, saturation, blackpoint, whitepoint, lift,
//! gain, multiply, gamma) and is consumed verbatim by the downstream
//! grading shader.

use crate::{Cdl, CoreError, CoreResult, Grade};

/// Combined CDL + Grade correction.
///
/// # Example
///
/// ```rust
/// use rcc_core::Correction;
///
/// let cc = Correction::new()
///     .with_slope([1.1, 1.0, 0.9])
///     .with_gain([1.2, 1.2, 1.2]);
///
/// assert_eq!(cc.to_bytes().len(), 112);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Correction {
    /// CDL stage (applied first).
    pub cdl: Cdl,
    /// Grade stage (applied second).
    pub grade: Grade,
}

/// Field names and tuple widths, in packing order.
pub const FIELDS: [(&str, usize); 10] = [
    ("slope", 3),
    ("offset", 3),
    ("power", 3),
    ("saturation", 1),
    ("blackpoint", 3),
    ("whitepoint", 3),
    ("lift", 3),
    ("gain", 3),
    ("multiply", 3),
    ("gamma", 3),
];

impl Correction {
    /// Number of packed f32 values.
    pub const FLOAT_COUNT: usize = 28;
    /// Packed size in bytes.
    pub const BYTE_SIZE: usize = Self::FLOAT_COUNT * 4;

    /// Creates an identity correction.
    pub fn new() -> Self {
        Self {
            cdl: Cdl::new(),
            grade: Grade::new(),
        }
    }

    /// Sets the CDL slope.
    pub fn with_slope(mut self, v: [f32; 3]) -> Self {
        self.cdl.slope = v;
        self
    }

    /// Sets the CDL offset.
    pub fn with_offset(mut self, v: [f32; 3]) -> Self {
        self.cdl.offset = v;
        self
    }

    /// Sets the CDL power.
    pub fn with_power(mut self, v: [f32; 3]) -> Self {
        self.cdl.power = v;
        self
    }

    /// Sets the CDL saturation.
    pub fn with_saturation(mut self, v: f32) -> Self {
        self.cdl.saturation = v;
        self
    }

    /// Sets the grade blackpoint.
    pub fn with_blackpoint(mut self, v: [f32; 3]) -> Self {
        self.grade.blackpoint = v;
        self
    }

    /// Sets the grade whitepoint.
    pub fn with_whitepoint(mut self, v: [f32; 3]) -> Self {
        self.grade.whitepoint = v;
        self
    }

    /// Sets the grade lift.
    pub fn with_lift(mut self, v: [f32; 3]) -> Self {
        self.grade.lift = v;
        self
    }

    /// Sets the grade gain.
    pub fn with_gain(mut self, v: [f32; 3]) -> Self {
        self.grade.gain = v;
        self
    }

    /// Sets the grade multiply.
    pub fn with_multiply(mut self, v: [f32; 3]) -> Self {
        self.grade.multiply = v;
        self
    }

    /// Sets the grade gamma.
    pub fn with_gamma(mut self, v: [f32; 3]) -> Self {
        self.grade.gamma = v;
        self
    }

    /// Check if both stages are identity.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.cdl.is_identity() && self.grade.is_identity()
    }

    /// Applies CDL then Grade to an RGB pixel in-place.
    #[inline]
    pub fn apply(&self, rgb: &mut [f32; 3]) {
        self.cdl.apply(rgb);
        self.grade.apply(rgb);
    }

    /// Reads a field by name as a flat tuple.
    pub fn field(&self, name: &str) -> CoreResult<Vec<f32>> {
        let v = match name {
            "slope" => self.cdl.slope.to_vec(),
            "offset" => self.cdl.offset.to_vec(),
            "power" => self.cdl.power.to_vec(),
            "saturation" => vec![self.cdl.saturation],
            "blackpoint" => self.grade.blackpoint.to_vec(),
            "whitepoint" => self.grade.whitepoint.to_vec(),
            "lift" => self.grade.lift.to_vec(),
            "gain" => self.grade.gain.to_vec(),
            "multiply" => self.grade.multiply.to_vec(),
            "gamma" => self.grade.gamma.to_vec(),
            other => return Err(CoreError::UnknownField(other.to_string())),
        };
        Ok(v)
    }

    /// Writes a field by name from a flat tuple.
    ///
    /// Extra trailing elements are ignored; too few is an error.
    pub fn set_field(&mut self, name: &str, values: &[f32]) -> CoreResult<()> {
        fn triple(field: &'static str, values: &[f32]) -> CoreResult<[f32; 3]> {
            if values.len() < 3 {
                return Err(CoreError::FieldWidth {
                    field,
                    expected: 3,
                    actual: values.len(),
                });
            }
            Ok([values[0], values[1], values[2]])
        }

        match name {
            "slope" => self.cdl.slope = triple("slope", values)?,
            "offset" => self.cdl.offset = triple("offset", values)?,
            "power" => self.cdl.power = triple("power", values)?,
            "saturation" => {
                self.cdl.saturation = *values.first().ok_or(CoreError::FieldWidth {
                    field: "saturation",
                    expected: 1,
                    actual: 0,
                })?;
            }
            "blackpoint" => self.grade.blackpoint = triple("blackpoint", values)?,
            "whitepoint" => self.grade.whitepoint = triple("whitepoint", values)?,
            "lift" => self.grade.lift = triple("lift", values)?,
            "gain" => self.grade.gain = triple("gain", values)?,
            "multiply" => self.grade.multiply = triple("multiply", values)?,
            "gamma" => self.grade.gamma = triple("gamma", values)?,
            other => return Err(CoreError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Flattens to the 28-float packed order.
    pub fn to_floats(&self) -> [f32; Self::FLOAT_COUNT] {
        let mut out = [0.0f32; Self::FLOAT_COUNT];
        let mut i = 0;
        for (name, _) in FIELDS {
            // field() cannot fail for names out of FIELDS
            for v in self.field(name).unwrap_or_default() {
                out[i] = v;
                i += 1;
            }
        }
        out
    }

    /// Serializes to 112 little-endian bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::BYTE_SIZE);
        for v in self.to_floats() {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }

    /// Deserializes from 112 little-endian bytes.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != Self::BYTE_SIZE {
            return Err(CoreError::PayloadSize {
                expected: Self::BYTE_SIZE,
                actual: bytes.len(),
            });
        }

        let mut floats = [0.0f32; Self::FLOAT_COUNT];
        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            floats[i] = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let mut cc = Self::new();
        let mut off = 0;
        for (name, width) in FIELDS {
            cc.set_field(name, &floats[off..off + width])?;
            off += width;
        }
        Ok(cc)
    }

    /// Applies a partial update; `None` entries leave fields untouched.
    pub fn update(&mut self, patch: &CorrectionPatch) {
        if let Some(v) = patch.slope {
            self.cdl.slope = v;
        }
        if let Some(v) = patch.offset {
            self.cdl.offset = v;
        }
        if let Some(v) = patch.power {
            self.cdl.power = v;
        }
        if let Some(v) = patch.saturation {
            self.cdl.saturation = v;
        }
        if let Some(v) = patch.blackpoint {
            self.grade.blackpoint = v;
        }
        if let Some(v) = patch.whitepoint {
            self.grade.whitepoint = v;
        }
        if let Some(v) = patch.lift {
            self.grade.lift = v;
        }
        if let Some(v) = patch.gain {
            self.grade.gain = v;
        }
        if let Some(v) = patch.multiply {
            self.grade.multiply = v;
        }
        if let Some(v) = patch.gamma {
            self.grade.gamma = v;
        }
    }
}

/// Partial correction update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionPatch {
    pub slope: Option<[f32; 3]>,
    pub offset: Option<[f32; 3]>,
    pub power: Option<[f32; 3]>,
    pub saturation: Option<f32>,
    pub blackpoint: Option<[f32; 3]>,
    pub whitepoint: Option<[f32; 3]>,
    pub lift: Option<[f32; 3]>,
    pub gain: Option<[f32; 3]>,
    pub multiply: Option<[f32; 3]>,
    pub gamma: Option<[f32; 3]>,
}

impl CorrectionPatch {
    /// Creates an empty patch (updates nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the saturation entry.
    pub fn with_saturation(mut self, v: f32) -> Self {
        self.saturation = Some(v);
        self
    }

    /// Sets the slope entry.
    pub fn with_slope(mut self, v: [f32; 3]) -> Self {
        self.slope = Some(v);
        self
    }

    /// Sets the gain entry.
    pub fn with_gain(mut self, v: [f32; 3]) -> Self {
        self.gain = Some(v);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_size() {
        let cc = Correction::new();
        assert_eq!(cc.to_bytes().len(), 112);
    }

    #[test]
    fn test_saturation_offset_in_packing() {
        // saturation is the 10th float: bytes 36..40
        let cc = Correction::new().with_saturation(2.0);
        let bytes = cc.to_bytes();
        let sat = f32::from_le_bytes([bytes[36], bytes[37], bytes[38], bytes[39]]);
        assert_eq!(sat, 2.0);
    }

    #[test]
    fn test_identity_packing() {
        let floats = Correction::new().to_floats();
        let expected: [f32; 28] = [
            1.0, 1.0, 1.0, // slope
            0.0, 0.0, 0.0, // offset
            1.0, 1.0, 1.0, // power
            1.0, // saturation
            0.0, 0.0, 0.0, // blackpoint
            1.0, 1.0, 1.0, // whitepoint
            0.0, 0.0, 0.0, // lift
            1.0, 1.0, 1.0, // gain
            1.0, 1.0, 1.0, // multiply
            1.0, 1.0, 1.0, // gamma
        ];
        assert_eq!(floats, expected);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let cc = Correction::new()
            .with_slope([1.1, 1.0, 0.9])
            .with_offset([0.01, 0.0, -0.01])
            .with_saturation(1.2)
            .with_lift([0.05, 0.0, 0.0])
            .with_gamma([1.0, 1.1, 1.0]);

        let decoded = Correction::from_bytes(&cc.to_bytes()).unwrap();
        assert_eq!(decoded, cc);
    }

    #[test]
    fn test_from_bytes_wrong_size() {
        assert!(matches!(
            Correction::from_bytes(&[0u8; 64]),
            Err(CoreError::PayloadSize { expected: 112, actual: 64 })
        ));
    }

    #[test]
    fn test_set_field_extra_elements_ignored() {
        let mut cc = Correction::new();
        cc.set_field("slope", &[2.0, 2.0, 2.0, 9.0, 9.0]).unwrap();
        assert_eq!(cc.cdl.slope, [2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_set_field_unknown() {
        let mut cc = Correction::new();
        assert!(matches!(
            cc.set_field("hue", &[1.0]),
            Err(CoreError::UnknownField(_))
        ));
    }

    #[test]
    fn test_patch_none_entries_ignored() {
        let mut cc = Correction::new().with_saturation(2.0);
        let patch = CorrectionPatch::new().with_gain([1.5, 1.5, 1.5]);
        cc.update(&patch);

        assert_eq!(cc.cdl.saturation, 2.0);
        assert_eq!(cc.grade.gain, [1.5, 1.5, 1.5]);
    }
}
