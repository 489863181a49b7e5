//! Per-frame render orchestration.
//!
//! The host drives three phases around every presented frame:
//!
//! - **pre-render**: resolve the source and corrector node, load the
//!   clip/frame/region corrections, build one soft mask per region and
//!   pack the shader parameters;
//! - **render**: optionally draw the diagnostic tile strip;
//! - **post-render**: release the masks and the packed payload.
//!
//! Any failure while gathering frame state tears the per-frame state
//! down and leaves the frame ungraded; the host keeps playing.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace, warn};
use uuid::Uuid;

use rcc_core::parse_key_guid;
use rcc_graph::binder::NodeGraphBinder;
use rcc_graph::host::HostBackend;
use rcc_graph::keys;
use rcc_store::record::load_region;
use rcc_store::tuples::{float_tuples, string_list};

use crate::backend::MaskBackend;
use crate::diag::{DiagTarget, draw_strip};
use crate::mask::MaskBuffer;
use crate::pack::{MASK_UNIT_BASE, ParameterPacker};
use crate::{CompError, CompResult};

/// Process-wide compositor slot.
static COMPOSITOR_SLOT: AtomicBool = AtomicBool::new(false);

/// One region's mask, bound at `texture_unit` during the frame.
#[derive(Debug)]
pub struct RegionMask {
    pub guid: Uuid,
    pub falloff: f32,
    pub texture_unit: u32,
    pub mask: MaskBuffer,
}

/// Host events the compositor consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    PreRender { frame: i32 },
    Render,
    PostRender,
    FrameChanged { frame: i32 },
    PlayStart,
    PlayStop,
    SourceGroupComplete,
    RangeChanged,
}

/// Builds masks and packed parameters for each presented frame.
pub struct FrameCompositor {
    backend: Box<dyn MaskBackend>,
    packer: ParameterPacker,
    masks: Vec<RegionMask>,
    params: Option<Vec<u8>>,
    owns_slot: bool,
}

impl FrameCompositor {
    /// Claims the process-wide compositor slot.
    ///
    /// A second live instance created through `init` fails with
    /// [`CompError::AlreadyInitialized`]; the slot frees on drop.
    pub fn init(backend: Box<dyn MaskBackend>) -> CompResult<Self> {
        if COMPOSITOR_SLOT.swap(true, Ordering::SeqCst) {
            return Err(CompError::AlreadyInitialized);
        }
        debug!(backend = backend.name(), "compositor initialized");
        let mut comp = Self::with_backend(backend);
        comp.owns_slot = true;
        Ok(comp)
    }

    /// Plain constructor without the process-wide slot.
    pub fn with_backend(backend: Box<dyn MaskBackend>) -> Self {
        Self {
            backend,
            packer: ParameterPacker::new(),
            masks: Vec::new(),
            params: None,
            owns_slot: false,
        }
    }

    /// Masks built by the last pre-render, in parameter order.
    pub fn masks(&self) -> &[RegionMask] {
        &self.masks
    }

    /// Packed shader parameters, present between pre- and post-render.
    pub fn params(&self) -> Option<&[u8]> {
        self.params.as_deref()
    }

    /// Gathers frame state and builds masks + parameters.
    ///
    /// On any fault the per-frame state is cleared and the frame
    /// renders ungraded.
    pub fn pre_render<H: HostBackend + ?Sized>(&mut self, host: &mut H, frame: i32) {
        self.clear();
        if let Err(e) = self.build_frame(host, frame) {
            warn!(frame, error = %e, "pre-render fault, frame renders ungraded");
            self.clear();
        }
    }

    fn build_frame<H: HostBackend + ?Sized>(&mut self, host: &mut H, frame: i32) -> CompResult<()> {
        let resolution = NodeGraphBinder::resolve(host, frame, false);
        let Some((source, node)) = resolution.complete() else {
            trace!(frame, "no corrector under frame");
            return Ok(());
        };
        let (source, node) = (source.to_string(), node.to_string());

        let Some(media) = host.source_media_info(&source) else {
            trace!(frame, source = %source, "no media info");
            return Ok(());
        };
        let source_frame = host.source_frame(frame);

        let clip = rcc_store::record::load_correction(&*host, &keys::clip(&node))?;
        let frame_cc =
            rcc_store::record::load_correction(&*host, &keys::frame(&node, source_frame))?;

        let guids = string_list(&*host, &keys::frame_regions(&node, source_frame))?;

        let mut region_ccs = Vec::new();
        for key in &guids {
            let Some(guid) = parse_key_guid(key) else {
                trace!(guid = %key, "unparseable region guid skipped");
                continue;
            };
            let region = load_region(&*host, &keys::region(&node, key), guid)?;

            let shapes = self.load_shapes(host, &node, key)?;
            if shapes.iter().all(|s| s.len() < 3) {
                trace!(guid = %key, "region has no drawable shape, skipped");
                continue;
            }

            let unit = MASK_UNIT_BASE + self.masks.len() as u32;
            let mask =
                self.backend
                    .build_mask(media.width, media.height, &shapes, region.falloff)?;

            self.masks.push(RegionMask {
                guid,
                falloff: region.falloff,
                texture_unit: unit,
                mask,
            });
            region_ccs.push(region.correction);
        }

        self.params = Some(self.packer.pack(&clip, &frame_cc, &region_ccs));
        debug!(
            frame,
            source_frame,
            regions = region_ccs.len(),
            backend = self.backend.name(),
            "pre-render complete"
        );
        Ok(())
    }

    fn load_shapes<H: HostBackend + ?Sized>(
        &self,
        host: &H,
        node: &str,
        region_key: &str,
    ) -> CompResult<Vec<Vec<(f32, f32)>>> {
        let shape_guids = string_list(host, &keys::region_shapes(node, region_key))?;
        let mut shapes = Vec::with_capacity(shape_guids.len());
        for sg in &shape_guids {
            let key = keys::shape_points(node, sg);
            let points = if host.exists(&key) {
                float_tuples(host, &key)?
                    .into_iter()
                    .filter_map(|t| match t.as_slice() {
                        [x, y, ..] => Some((*x, *y)),
                        _ => None,
                    })
                    .collect()
            } else {
                Vec::new()
            };
            shapes.push(points);
        }
        Ok(shapes)
    }

    /// Render phase: draws the diagnostic strip when a target is given.
    pub fn render(&self, overlay: Option<&mut DiagTarget<'_>>) {
        if let Some(target) = overlay {
            let masks: Vec<&MaskBuffer> = self.masks.iter().map(|m| &m.mask).collect();
            draw_strip(target, &masks);
        }
    }

    /// Releases the masks and the packed parameters.
    pub fn post_render(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.masks.clear();
        self.params = None;
    }

    /// Dispatches a host event to the matching phase.
    pub fn handle_event<H: HostBackend + ?Sized>(&mut self, host: &mut H, event: HostEvent) {
        trace!(?event, "host event");
        match event {
            HostEvent::PreRender { frame } => self.pre_render(host, frame),
            HostEvent::Render => self.render(None),
            HostEvent::PostRender => self.post_render(),
            // playback topology changed under us; stale masks must not
            // survive to the next pre-render
            HostEvent::FrameChanged { .. }
            | HostEvent::PlayStart
            | HostEvent::PlayStop
            | HostEvent::SourceGroupComplete
            | HostEvent::RangeChanged => self.clear(),
        }
    }
}

impl Drop for FrameCompositor {
    fn drop(&mut self) {
        if self.owns_slot {
            COMPOSITOR_SLOT.store(false, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuMaskBackend;

    fn comp() -> FrameCompositor {
        FrameCompositor::with_backend(Box::new(CpuMaskBackend::new()))
    }

    #[test]
    fn test_singleton_slot() {
        let first = FrameCompositor::init(Box::new(CpuMaskBackend::new())).unwrap();
        assert!(matches!(
            FrameCompositor::init(Box::new(CpuMaskBackend::new())),
            Err(CompError::AlreadyInitialized)
        ));
        drop(first);
        // slot freed on drop
        let again = FrameCompositor::init(Box::new(CpuMaskBackend::new())).unwrap();
        drop(again);
    }

    #[test]
    fn test_with_backend_bypasses_slot() {
        let a = comp();
        let b = comp();
        drop(a);
        drop(b);
    }
}
