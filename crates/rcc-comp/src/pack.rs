//! Fixed-layout parameter payload for the grading shader.
//!
//! The shader reads one storage buffer at a fixed binding index:
//!
//! ```text
//! offset   0  clip correction   (112 B, 28 f32 LE)
//! offset 112  frame correction  (112 B)
//! offset 224  region count      (i32 LE)
//! offset 228  region payloads   (count * 112 B, list order)
//! ```
//!
//! Region guid and falloff never enter the payload; falloff is baked
//! into the mask texture and the guid only keys the store. Mask
//! textures bind at `MASK_UNIT_BASE + i` with `i` matching payload
//! order.

use rcc_core::Correction;

/// Storage-buffer binding index the grading shader declares.
pub const PARAMS_BINDING: u32 = 16;
/// First texture unit for region masks; region `i` binds at `16 + i`.
pub const MASK_UNIT_BASE: u32 = 16;

/// Byte offset of the frame correction.
pub const FRAME_OFFSET: usize = Correction::BYTE_SIZE;
/// Byte offset of the region count.
pub const COUNT_OFFSET: usize = 2 * Correction::BYTE_SIZE;
/// Byte offset of the first region payload.
pub const REGIONS_OFFSET: usize = COUNT_OFFSET + 4;

/// Serializes clip, frame and region corrections into the shader's
/// storage-buffer layout.
#[derive(Debug, Default, Clone)]
pub struct ParameterPacker;

impl ParameterPacker {
    pub fn new() -> Self {
        Self
    }

    /// Packs the payload. Output length is `228 + 112 * regions.len()`.
    pub fn pack(&self, clip: &Correction, frame: &Correction, regions: &[Correction]) -> Vec<u8> {
        let mut out = Vec::with_capacity(REGIONS_OFFSET + Correction::BYTE_SIZE * regions.len());
        out.extend_from_slice(&clip.to_bytes());
        out.extend_from_slice(&frame.to_bytes());
        out.extend_from_slice(&(regions.len() as i32).to_le_bytes());
        for region in regions {
            out.extend_from_slice(&region.to_bytes());
        }
        out
    }

    /// Payload with identity clip/frame and no regions, used after
    /// teardown so the shader grades nothing.
    pub fn pack_empty(&self) -> Vec<u8> {
        self.pack(&Correction::new(), &Correction::new(), &[])
    }
}
