//! Core types for per-frame region color correction.
//!
//! A correction is a CDL (slope/offset/power/saturation) followed by a
//! Grade (blackpoint/whitepoint/lift/gain/multiply/gamma). Region
//! corrections add a stable GUID and a falloff scalar that drives the
//! soft-edge blur downstream.
//!
//! # Example
//!
//! ```rust
//! use rcc_core::Correction;
//!
//! let cc = Correction::new().with_saturation(2.0);
//! let bytes = cc.to_bytes();
//! assert_eq!(bytes.len(), Correction::BYTE_SIZE);
//! ```

pub mod cdl;
pub mod grade;
pub mod correction;
pub mod region;

pub use cdl::Cdl;
pub use grade::Grade;
pub use correction::{Correction, CorrectionPatch, FIELDS};
pub use region::{RegionCorrection, parse_key_guid};

use thiserror::Error;

/// Rec. 709 luma weight for red.
pub const REC709_LUMA_R: f32 = 0.2126;
/// Rec. 709 luma weight for green.
pub const REC709_LUMA_G: f32 = 0.7152;
/// Rec. 709 luma weight for blue.
pub const REC709_LUMA_B: f32 = 0.0722;

/// Error type for the correction model.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A field name that is not part of the correction model.
    #[error("unknown correction field: {0}")]
    UnknownField(String),

    /// A field value with the wrong number of components.
    #[error("field {field} expects {expected} components, got {actual}")]
    FieldWidth {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Byte slice with the wrong length for deserialization.
    #[error("correction payload must be {expected} bytes, got {actual}")]
    PayloadSize { expected: usize, actual: usize },
}

/// Result type for the correction model.
pub type CoreResult<T> = Result<T, CoreError>;
