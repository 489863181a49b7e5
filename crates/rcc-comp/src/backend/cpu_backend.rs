//! CPU mask backend using rayon.

use tracing::debug;

use super::MaskBackend;
use crate::CompResult;
use crate::blur::separable_blur;
use crate::mask::{MaskBuffer, rasterize};

/// Scanline rasterizer + separable blur, parallelized over rows.
#[derive(Debug, Default, Clone)]
pub struct CpuMaskBackend;

impl CpuMaskBackend {
    pub fn new() -> Self {
        debug!("CPU mask backend");
        Self
    }
}

impl MaskBackend for CpuMaskBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn rasterize(
        &self,
        width: u32,
        height: u32,
        shapes: &[Vec<(f32, f32)>],
    ) -> CompResult<MaskBuffer> {
        rasterize(width, height, shapes)
    }

    fn blur(&self, mask: &mut MaskBuffer, falloff: f32) -> CompResult<()> {
        separable_blur(mask, falloff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_mask_combines_passes() {
        let backend = CpuMaskBackend::new();
        let square = vec![vec![(-0.2, -0.2), (0.2, -0.2), (0.2, 0.2), (-0.2, 0.2)]];
        let mask = backend.build_mask(64, 64, &square, 0.2).unwrap();

        assert!(mask.at(32, 32) > 0.8);
        assert!(mask.at(2, 2) < 0.05);
    }
}
