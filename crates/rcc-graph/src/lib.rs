//! Node-graph binding and mutation surface for region color correction.
//!
//! The host exposes its property store, frame context and coordinate
//! mapping through the [`HostBackend`] seam; [`NodeGraphBinder`] turns
//! "the image under this timeline frame" into property-key prefixes on
//! a ColorCorrector pipeline node, and [`CorrectorApi`] is the
//! operation surface other plugins call.
//!
//! # Architecture
//!
//! ```text
//! CorrectorApi (mutations/queries, refresh counter)
//!     └── NodeGraphBinder (frame -> source -> node, key schema)
//!             └── HostBackend: PropertyStore + FrameContext + CoordinateMap
//! ```

pub mod api;
pub mod binder;
pub mod host;
pub mod keys;
pub mod session;

pub use api::{CorrectorApi, DrawingFlag};
pub use binder::{NodeGraphBinder, Resolution};
pub use host::{CoordinateMap, FrameContext, HostBackend, MediaInfo, NodeId, SourceId};

use thiserror::Error;

/// Error taxonomy of the public corrector surface.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The frame maps to zero or more than one source.
    #[error("frame maps to no unique source")]
    NoSource,

    /// No ColorCorrector node exists and none could be created.
    #[error("no ColorCorrector node for source")]
    NoNode,

    /// A region or shape GUID not present for the current frame.
    #[error("unknown guid: {0}")]
    UnknownGuid(String),

    /// Reorder input is not a permutation of the current region set.
    #[error("guid set does not match the current region list")]
    GuidSetMismatch,

    /// Underlying property-store failure (including unsupported types).
    #[error(transparent)]
    Store(#[from] rcc_store::StoreError),

    /// Correction field failure.
    #[error(transparent)]
    Core(#[from] rcc_core::CoreError),
}

/// Result type for the corrector surface.
pub type ApiResult<T> = Result<T, ApiError>;
