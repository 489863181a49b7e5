//! Per-frame region compositor: masks, soft edges, GPU parameters.
//!
//! On every presented frame this crate turns the region state held in
//! the property store into one soft-edged alpha mask per region and a
//! packed parameter payload, both consumed by the downstream grading
//! shader.
//!
//! # Architecture
//!
//! ```text
//! FrameCompositor (pre-render / render / post-render)
//!     ├── MaskBackend trait
//!     │       ├── CpuMaskBackend (scanline even-odd + rayon)
//!     │       └── WgpuMaskBackend (compute shaders, `wgpu` feature)
//!     ├── ParameterPacker (fixed SSBO byte layout)
//!     └── diag (mask tile overlay)
//! ```
//!
//! # Example
//!
//! ```rust
//! use rcc_comp::{FrameCompositor, backend::CpuMaskBackend};
//! use rcc_graph::session::SingleSourceSession;
//!
//! let mut host = SingleSourceSession::new("clip0", 64, 64);
//! let mut comp = FrameCompositor::with_backend(Box::new(CpuMaskBackend::new()));
//! comp.pre_render(&mut host, 1);
//! comp.post_render();
//! ```

pub mod backend;
pub mod blur;
pub mod compositor;
pub mod diag;
pub mod mask;
pub mod pack;
mod shaders;

pub use backend::{CpuMaskBackend, MaskBackend};
pub use blur::blur_radius;
pub use compositor::{FrameCompositor, HostEvent, RegionMask};
pub use diag::DiagTarget;
pub use mask::{MaskBuffer, rasterize};
pub use pack::{MASK_UNIT_BASE, PARAMS_BINDING, ParameterPacker};

use thiserror::Error;

/// Compositor errors.
#[derive(Error, Debug)]
pub enum CompError {
    /// Second construction of the process-wide compositor.
    #[error("compositor already initialized")]
    AlreadyInitialized,

    /// Zero-sized mask target.
    #[error("invalid mask dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),

    /// Backend (GPU or CPU) failure during a render phase.
    #[error("mask backend fault: {0}")]
    BackendFault(String),

    /// Property-store failure while gathering per-frame state.
    #[error(transparent)]
    Store(#[from] rcc_store::StoreError),
}

/// Result type for the compositor.
pub type CompResult<T> = Result<T, CompError>;
