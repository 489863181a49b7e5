//! Host backend seam.
//!
//! The player host implements these traits; the corrector core is
//! host-agnostic and test-substitutable. The original scripting bridge
//! is replaced by typed trait calls.

use rcc_store::PropertyStore;

/// Identifier of a media source in the session.
pub type SourceId = String;

/// Identifier of a node in a source's color pipeline.
pub type NodeId = String;

/// Resolution of a source's media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
}

/// Timeline/frame queries and color-pipeline topology.
pub trait FrameContext {
    /// Sources rendered at a timeline frame. Region correction only
    /// operates when exactly one source is under the frame.
    fn sources_at(&self, frame: i32) -> Vec<SourceId>;

    /// The source-local frame number for a timeline frame.
    fn source_frame(&self, frame: i32) -> i32;

    /// Nodes of the given kind in the evaluation path at a frame.
    fn nodes_in_eval_path(&self, frame: i32, kind: &str) -> Vec<NodeId>;

    /// Prepends a node of the given kind to the source's color
    /// pipeline, returning its id. `None` when the host refuses.
    fn prepend_pipeline_node(&mut self, source: &str, kind: &str) -> Option<NodeId>;

    /// Media resolution of a source.
    fn source_media_info(&self, source: &str) -> Option<MediaInfo>;

    /// Enables or disables frame-change mouse handling while the user
    /// is drawing a shape.
    fn set_frame_change_mouse_events(&mut self, enabled: bool) {
        let _ = enabled;
    }
}

/// Screen-space to image-space mapping.
pub trait CoordinateMap {
    /// Image under a screen pixel, if any.
    fn image_at_pixel(&self, point: (f32, f32)) -> Option<String>;

    /// Converts an event point to image space for the given image.
    ///
    /// Image space is centered at the image origin, y-up, scaled so
    /// the image height spans 1.0.
    fn event_to_image_space(&self, image: &str, point: (f32, f32)) -> (f32, f32);
}

/// Everything the corrector consumes from the host.
pub trait HostBackend: PropertyStore + FrameContext + CoordinateMap {}

impl<T: PropertyStore + FrameContext + CoordinateMap> HostBackend for T {}
