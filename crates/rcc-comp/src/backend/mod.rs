//! Mask build backends.
//!
//! The compositor builds every region mask through [`MaskBackend`], so
//! the CPU scanline path and the wgpu compute path are interchangeable.

mod cpu_backend;

#[cfg(feature = "wgpu")]
mod wgpu_backend;

pub use cpu_backend::CpuMaskBackend;

#[cfg(feature = "wgpu")]
pub use wgpu_backend::WgpuMaskBackend;

use crate::CompResult;
use crate::mask::MaskBuffer;

/// Rasterizes and blurs region masks.
pub trait MaskBackend: Send + Sync {
    /// Backend name.
    fn name(&self) -> &'static str;

    /// Even-odd fills the region's shapes into a fresh mask.
    fn rasterize(
        &self,
        width: u32,
        height: u32,
        shapes: &[Vec<(f32, f32)>],
    ) -> CompResult<MaskBuffer>;

    /// Applies the two-pass soft-edge blur in place.
    fn blur(&self, mask: &mut MaskBuffer, falloff: f32) -> CompResult<()>;

    /// Rasterize + blur in one call.
    fn build_mask(
        &self,
        width: u32,
        height: u32,
        shapes: &[Vec<(f32, f32)>],
        falloff: f32,
    ) -> CompResult<MaskBuffer> {
        let mut mask = self.rasterize(width, height, shapes)?;
        self.blur(&mut mask, falloff)?;
        Ok(mask)
    }
}
