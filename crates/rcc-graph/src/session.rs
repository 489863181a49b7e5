//! Reference single-source host.
//!
//! A minimal [`HostBackend`] for a session with one clip: the in-memory
//! property store, a trivial timeline (one source across all frames)
//! and a screen-fills-the-image coordinate mapping. The player's real
//! host replaces this; tests and the demo path use it directly.

use rcc_store::{MemoryStore, PropData, PropInfo, PropType, PropertyStore, StoreResult};

use crate::host::{CoordinateMap, FrameContext, MediaInfo, NodeId, SourceId};
use crate::keys::CORRECTOR_KIND;

/// One-clip session host backed by [`MemoryStore`].
///
/// # Example
///
/// ```rust
/// use rcc_graph::session::SingleSourceSession;
/// use rcc_graph::{NodeGraphBinder, FrameContext};
///
/// let mut host = SingleSourceSession::new("clip0", 1920, 1080);
/// let r = NodeGraphBinder::resolve(&mut host, 10, true);
/// assert!(r.complete().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct SingleSourceSession {
    store: MemoryStore,
    source: SourceId,
    media: MediaInfo,
    pipeline: Vec<NodeId>,
    /// source_frame = timeline frame - offset
    pub frame_offset: i32,
    /// Mirrors the host's frame-change mouse policy.
    pub frame_change_mouse_events: bool,
}

impl SingleSourceSession {
    /// Creates a session for one clip of the given resolution.
    pub fn new(source: impl Into<SourceId>, width: u32, height: u32) -> Self {
        Self {
            store: MemoryStore::new(),
            source: source.into(),
            media: MediaInfo { width, height },
            pipeline: Vec::new(),
            frame_offset: 0,
            frame_change_mouse_events: true,
        }
    }

    /// Direct access to the underlying store (test inspection).
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

impl PropertyStore for SingleSourceSession {
    fn exists(&self, key: &str) -> bool {
        self.store.exists(key)
    }

    fn info(&self, key: &str) -> StoreResult<PropInfo> {
        self.store.info(key)
    }

    fn get(&self, key: &str) -> StoreResult<PropData> {
        self.store.get(key)
    }

    fn create(&mut self, key: &str, ty: PropType, width: usize) -> StoreResult<()> {
        self.store.create(key, ty, width)
    }

    fn set(
        &mut self,
        key: &str,
        data: PropData,
        width: usize,
        create_if_missing: bool,
    ) -> StoreResult<()> {
        self.store.set(key, data, width, create_if_missing)
    }

    fn delete(&mut self, key: &str, ignore_missing: bool) -> StoreResult<()> {
        self.store.delete(key, ignore_missing)
    }
}

impl FrameContext for SingleSourceSession {
    fn sources_at(&self, _frame: i32) -> Vec<SourceId> {
        vec![self.source.clone()]
    }

    fn source_frame(&self, frame: i32) -> i32 {
        frame - self.frame_offset
    }

    fn nodes_in_eval_path(&self, _frame: i32, kind: &str) -> Vec<NodeId> {
        self.pipeline
            .iter()
            .filter(|n| n.ends_with(kind))
            .cloned()
            .collect()
    }

    fn prepend_pipeline_node(&mut self, source: &str, kind: &str) -> Option<NodeId> {
        let node = format!("{source}.{kind}");
        if !self.pipeline.contains(&node) {
            self.pipeline.insert(0, node.clone());
        }
        Some(node)
    }

    fn source_media_info(&self, source: &str) -> Option<MediaInfo> {
        (source == self.source).then_some(self.media)
    }

    fn set_frame_change_mouse_events(&mut self, enabled: bool) {
        self.frame_change_mouse_events = enabled;
    }
}

impl CoordinateMap for SingleSourceSession {
    fn image_at_pixel(&self, _point: (f32, f32)) -> Option<String> {
        Some(self.source.clone())
    }

    fn event_to_image_space(&self, _image: &str, point: (f32, f32)) -> (f32, f32) {
        // Screen pixels to center-origin, y-up, height-normalized.
        let w = self.media.width as f32;
        let h = self.media.height as f32;
        ((point.0 - 0.5 * w) / h, (0.5 * h - point.1) / h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeGraphBinder;

    #[test]
    fn test_resolve_creates_corrector() {
        let mut host = SingleSourceSession::new("clip0", 1920, 1080);
        assert!(host.nodes_in_eval_path(0, CORRECTOR_KIND).is_empty());

        let r = NodeGraphBinder::resolve(&mut host, 0, true);
        assert_eq!(r.complete(), Some(("clip0", "clip0.ColorCorrector")));
    }

    #[test]
    fn test_event_mapping_center_and_corner() {
        let host = SingleSourceSession::new("clip0", 1920, 1080);

        let center = host.event_to_image_space("clip0", (960.0, 540.0));
        assert!(center.0.abs() < 1e-6 && center.1.abs() < 1e-6);

        // top of frame is +0.5 in y-up image space
        let top = host.event_to_image_space("clip0", (960.0, 0.0));
        assert!((top.1 - 0.5).abs() < 1e-6);
    }
}
