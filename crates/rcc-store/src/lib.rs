//! Typed property storage for the region color corrector.
//!
//! Properties are addressed by dotted string keys and hold flat vectors
//! of int32, float32 or UTF-8 string values with a declared tuple
//! width. The host owns the real store; [`MemoryStore`] is the
//! in-process implementation used by the player and by every test.
//!
//! The [`tuples`] adapter reshapes flat vectors into width-sized tuples
//! and back; [`record`] persists whole correction records through it.
//!
//! # Example
//!
//! ```rust
//! use rcc_store::{MemoryStore, PropertyStore, PropData, PropType};
//!
//! let mut store = MemoryStore::new();
//! store.set("cc.slope", PropData::Float(vec![1.1, 1.0, 0.9]), 3, true).unwrap();
//! assert!(store.exists("cc.slope"));
//! ```

pub mod memory;
pub mod record;
pub mod tuples;

pub use memory::MemoryStore;

use thiserror::Error;

/// Scalar element type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropType {
    /// 32-bit signed integer.
    Int,
    /// 32-bit float.
    Float,
    /// UTF-8 string.
    Str,
}

impl PropType {
    /// Human-readable name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "int32",
            Self::Float => "float32",
            Self::Str => "string",
        }
    }
}

/// Flat property payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PropData {
    Int(Vec<i32>),
    Float(Vec<f32>),
    Str(Vec<String>),
}

impl PropData {
    /// Element type of this payload.
    pub fn prop_type(&self) -> PropType {
        match self {
            Self::Int(_) => PropType::Int,
            Self::Float(_) => PropType::Float,
            Self::Str(_) => PropType::Str,
        }
    }

    /// Number of scalar elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Str(v) => v.len(),
        }
    }

    /// True when the payload holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Property metadata: element type and tuple width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropInfo {
    pub ty: PropType,
    pub width: usize,
}

/// Error type for property storage.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key not present in the store.
    #[error("no such property: {0}")]
    MissingProperty(String),

    /// Key already present on create.
    #[error("property already exists: {0}")]
    AlreadyExists(String),

    /// Payload element type differs from the stored type.
    #[error("type mismatch on {key}: expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Value that is not int32, float32 or string.
    #[error("unsupported property type: {0}")]
    UnsupportedType(String),

    /// Tuple width of zero or payload not divisible into tuples.
    #[error("invalid width {width} for {key}")]
    InvalidWidth { key: String, width: usize },
}

/// Result type for property storage.
pub type StoreResult<T> = Result<T, StoreError>;

/// Abstract typed key/value store, implemented by the host.
///
/// Keys are dotted paths; every property carries a scalar type and a
/// tuple width (elements per tuple).
pub trait PropertyStore {
    /// True when the key is present.
    fn exists(&self, key: &str) -> bool;

    /// Type and width of an existing property.
    fn info(&self, key: &str) -> StoreResult<PropInfo>;

    /// Flat payload of an existing property (width x N elements).
    fn get(&self, key: &str) -> StoreResult<PropData>;

    /// Creates an empty property. Fails if the key exists.
    fn create(&mut self, key: &str, ty: PropType, width: usize) -> StoreResult<()>;

    /// Replaces a property's payload.
    ///
    /// With `create_if_missing` the property is created on first write;
    /// otherwise a missing key is an error.
    fn set(
        &mut self,
        key: &str,
        data: PropData,
        width: usize,
        create_if_missing: bool,
    ) -> StoreResult<()>;

    /// Removes a property. A missing key is an error unless
    /// `ignore_missing` is set.
    fn delete(&mut self, key: &str, ignore_missing: bool) -> StoreResult<()>;
}
