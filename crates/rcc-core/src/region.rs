//! Region correction record: a correction with stable identity and falloff.

use uuid::Uuid;

use crate::Correction;

/// A correction applied inside a soft-edged mask.
///
/// The GUID is the region's identity across persistence, reordering and
/// GPU binding; falloff in [0,1] drives the mask-edge blur radius.
///
/// # Example
///
/// ```rust
/// use rcc_core::RegionCorrection;
///
/// let region = RegionCorrection::generate();
/// assert_eq!(region.key_guid().len(), 32);
/// assert_eq!(region.falloff, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RegionCorrection {
    /// Stable 128-bit identity.
    pub guid: Uuid,
    /// Mask edge softness in [0,1].
    pub falloff: f32,
    /// The correction payload.
    pub correction: Correction,
}

impl RegionCorrection {
    /// Creates a record with a freshly generated GUID and identity
    /// correction. New regions start hard-edged (falloff 0).
    pub fn generate() -> Self {
        Self::with_guid(Uuid::new_v4())
    }

    /// Creates a record for a known GUID.
    pub fn with_guid(guid: Uuid) -> Self {
        Self {
            guid,
            falloff: 0.0,
            correction: Correction::new(),
        }
    }

    /// Sets the falloff, clamped to [0,1].
    pub fn with_falloff(mut self, falloff: f32) -> Self {
        self.falloff = falloff.clamp(0.0, 1.0);
        self
    }

    /// Sets the correction payload.
    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.correction = correction;
        self
    }

    /// GUID in the 32-hex-character form used in property keys.
    pub fn key_guid(&self) -> String {
        self.guid.simple().to_string()
    }
}

/// Parses a GUID from its 32-hex-character key form.
pub fn parse_key_guid(s: &str) -> Option<Uuid> {
    Uuid::parse_str(s).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique() {
        let a = RegionCorrection::generate();
        let b = RegionCorrection::generate();
        assert_ne!(a.guid, b.guid);
    }

    #[test]
    fn test_key_guid_roundtrip() {
        let region = RegionCorrection::generate();
        let parsed = parse_key_guid(&region.key_guid()).unwrap();
        assert_eq!(parsed, region.guid);
    }

    #[test]
    fn test_falloff_clamped() {
        let region = RegionCorrection::generate().with_falloff(2.5);
        assert_eq!(region.falloff, 1.0);
        let region = RegionCorrection::generate().with_falloff(-1.0);
        assert_eq!(region.falloff, 0.0);
    }
}
