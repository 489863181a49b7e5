//! Public mutation/query surface of the region color corrector.
//!
//! Every operation resolves the ColorCorrector node for the frame,
//! reads or writes properties under its key prefix, and bumps the
//! node's refresh counter on successful mutation so the downstream
//! shader can detect changes.
//!
//! # Example
//!
//! ```rust
//! use rcc_core::Correction;
//! use rcc_graph::{CorrectorApi, session::SingleSourceSession};
//!
//! let mut host = SingleSourceSession::new("clip0", 1920, 1080);
//! let api = CorrectorApi::new();
//!
//! api.set_clip_cc(&mut host, 1, &Correction::new().with_saturation(2.0)).unwrap();
//! let cc = api.get_clip_cc(&mut host, 1).unwrap();
//! assert_eq!(cc.cdl.saturation, 2.0);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;
use uuid::Uuid;

use rcc_core::{Correction, CorrectionPatch, RegionCorrection, parse_key_guid};
use rcc_store::record;
use rcc_store::tuples::{
    float_tuples, int_scalar, set_float_tuples, set_int_scalar, set_string_list, string_list,
};

use crate::binder::NodeGraphBinder;
use crate::host::HostBackend;
use crate::keys;
use crate::{ApiError, ApiResult};

/// Shared "the user is drawing a shape" flag.
///
/// Set by the drawing controller, read by the host event router to
/// suspend frame-change mouse handling mid-stroke.
#[derive(Debug, Clone, Default)]
pub struct DrawingFlag(Arc<AtomicBool>);

impl DrawingFlag {
    /// Creates a cleared flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a shape is being drawn.
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn set(&self, value: bool) {
        self.0.store(value, Ordering::Relaxed);
    }
}

/// Operation surface exposed to the rest of the player.
#[derive(Debug, Default)]
pub struct CorrectorApi {
    drawing: DrawingFlag,
}

impl CorrectorApi {
    /// Creates the API surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the drawing-in-progress flag.
    pub fn drawing_flag(&self) -> DrawingFlag {
        self.drawing.clone()
    }

    // ------------------------------------------------------------------
    // resolution helpers

    fn resolve<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
        create: bool,
    ) -> ApiResult<String> {
        let r = NodeGraphBinder::resolve(host, frame, create);
        if r.source.is_none() {
            return Err(ApiError::NoSource);
        }
        r.node.ok_or(ApiError::NoNode)
    }

    fn bump_refresh<H: HostBackend + ?Sized>(&self, host: &mut H, node: &str) -> ApiResult<()> {
        let key = keys::refresh(node);
        let next = int_scalar(host, &key, 0)? + 1;
        set_int_scalar(host, &key, next)?;
        Ok(())
    }

    /// Current refresh counter for the frame's node, 0 when unset.
    pub fn refresh_count<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
    ) -> ApiResult<i32> {
        let node = self.resolve(host, frame, false)?;
        Ok(int_scalar(host, &keys::refresh(&node), 0)?)
    }

    fn region_list<H: HostBackend + ?Sized>(
        &self,
        host: &H,
        node: &str,
        source_frame: i32,
    ) -> ApiResult<Vec<String>> {
        Ok(string_list(host, &keys::frame_regions(node, source_frame))?)
    }

    fn require_region<H: HostBackend + ?Sized>(
        &self,
        host: &H,
        node: &str,
        source_frame: i32,
        guid: Uuid,
    ) -> ApiResult<String> {
        let key_guid = guid.simple().to_string();
        let list = self.region_list(host, node, source_frame)?;
        if list.contains(&key_guid) {
            Ok(key_guid)
        } else {
            Err(ApiError::UnknownGuid(key_guid))
        }
    }

    // ------------------------------------------------------------------
    // clip and frame corrections

    /// Clip-wide correction; defaults when never written.
    pub fn get_clip_cc<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
    ) -> ApiResult<Correction> {
        let node = self.resolve(host, frame, false)?;
        Ok(record::load_correction(host, &keys::clip(&node))?)
    }

    /// Writes the clip-wide correction.
    pub fn set_clip_cc<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
        cc: &Correction,
    ) -> ApiResult<()> {
        let node = self.resolve(host, frame, true)?;
        record::store_correction(host, &keys::clip(&node), cc)?;
        self.bump_refresh(host, &node)
    }

    /// Partial update of the clip-wide correction.
    pub fn update_clip_cc<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
        patch: &CorrectionPatch,
    ) -> ApiResult<Correction> {
        let node = self.resolve(host, frame, true)?;
        let base = keys::clip(&node);
        let mut cc = record::load_correction(host, &base)?;
        cc.update(patch);
        record::store_correction(host, &base, &cc)?;
        self.bump_refresh(host, &node)?;
        Ok(cc)
    }

    /// Per-source-frame correction; defaults when never written.
    pub fn get_frame_cc<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
    ) -> ApiResult<Correction> {
        let node = self.resolve(host, frame, false)?;
        let sf = host.source_frame(frame);
        Ok(record::load_correction(host, &keys::frame(&node, sf))?)
    }

    /// Writes the per-source-frame correction.
    pub fn set_frame_cc<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
        cc: &Correction,
    ) -> ApiResult<()> {
        let node = self.resolve(host, frame, true)?;
        let sf = host.source_frame(frame);
        record::store_correction(host, &keys::frame(&node, sf), cc)?;
        self.bump_refresh(host, &node)
    }

    /// Partial update of the per-source-frame correction.
    pub fn update_frame_cc<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
        patch: &CorrectionPatch,
    ) -> ApiResult<Correction> {
        let node = self.resolve(host, frame, true)?;
        let sf = host.source_frame(frame);
        let base = keys::frame(&node, sf);
        let mut cc = record::load_correction(host, &base)?;
        cc.update(patch);
        record::store_correction(host, &base, &cc)?;
        self.bump_refresh(host, &node)?;
        Ok(cc)
    }

    // ------------------------------------------------------------------
    // region corrections

    /// Region records at the frame, in stacking order.
    pub fn get_region_ccs<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
    ) -> ApiResult<Vec<RegionCorrection>> {
        let node = self.resolve(host, frame, false)?;
        let sf = host.source_frame(frame);

        let mut out = Vec::new();
        for key_guid in self.region_list(host, &node, sf)? {
            let guid = parse_key_guid(&key_guid)
                .ok_or_else(|| ApiError::UnknownGuid(key_guid.clone()))?;
            out.push(record::load_region(
                host,
                &keys::region(&node, &key_guid),
                guid,
            )?);
        }
        Ok(out)
    }

    /// One region record by GUID. Fails unless the GUID is in the
    /// frame's region list.
    pub fn get_region_cc<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
        guid: Uuid,
    ) -> ApiResult<RegionCorrection> {
        let node = self.resolve(host, frame, false)?;
        let sf = host.source_frame(frame);
        let key_guid = self.require_region(host, &node, sf, guid)?;
        Ok(record::load_region(
            host,
            &keys::region(&node, &key_guid),
            guid,
        )?)
    }

    /// Writes a region record. Fails unless its GUID is in the frame's
    /// region list.
    pub fn set_region_cc<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
        region: &RegionCorrection,
    ) -> ApiResult<()> {
        let node = self.resolve(host, frame, true)?;
        let sf = host.source_frame(frame);
        let key_guid = self.require_region(host, &node, sf, region.guid)?;
        record::store_region(host, &keys::region(&node, &key_guid), region)?;
        self.bump_refresh(host, &node)
    }

    /// Creates a region with a fresh GUID, appended to the frame's
    /// region list, with identity correction and zero falloff.
    pub fn create_region_cc<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
    ) -> ApiResult<Uuid> {
        let node = self.resolve(host, frame, true)?;
        let sf = host.source_frame(frame);

        let region = RegionCorrection::generate();
        let key_guid = region.key_guid();
        record::store_region(host, &keys::region(&node, &key_guid), &region)?;

        let mut list = self.region_list(host, &node, sf)?;
        list.push(key_guid);
        set_string_list(host, &keys::frame_regions(&node, sf), &list)?;

        self.bump_refresh(host, &node)?;
        debug!(frame, guid = %region.guid, "created region");
        Ok(region.guid)
    }

    /// Deletes a region: removes it from the frame list and deletes its
    /// record and every shape under it.
    pub fn delete_region_cc<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
        guid: Uuid,
    ) -> ApiResult<()> {
        let node = self.resolve(host, frame, true)?;
        let sf = host.source_frame(frame);
        let key_guid = self.require_region(host, &node, sf, guid)?;

        // shapes cascade
        let shapes_key = keys::region_shapes(&node, &key_guid);
        for shape_guid in string_list(host, &shapes_key)? {
            host.delete(&keys::shape_points(&node, &shape_guid), true)?;
        }
        host.delete(&shapes_key, true)?;

        record::delete_region(host, &keys::region(&node, &key_guid))?;

        let list: Vec<String> = self
            .region_list(host, &node, sf)?
            .into_iter()
            .filter(|g| *g != key_guid)
            .collect();
        set_string_list(host, &keys::frame_regions(&node, sf), &list)?;

        self.bump_refresh(host, &node)?;
        debug!(frame, guid = %guid, "deleted region");
        Ok(())
    }

    /// Rewrites the frame's region stacking order. The input must be a
    /// permutation of the current set; records and shapes are untouched.
    pub fn reorder_region_ccs<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
        order: &[Uuid],
    ) -> ApiResult<()> {
        let node = self.resolve(host, frame, true)?;
        let sf = host.source_frame(frame);

        let current = self.region_list(host, &node, sf)?;
        let requested: Vec<String> = order.iter().map(|g| g.simple().to_string()).collect();

        let mut a = current.clone();
        let mut b = requested.clone();
        a.sort();
        b.sort();
        if a != b {
            return Err(ApiError::GuidSetMismatch);
        }

        set_string_list(host, &keys::frame_regions(&node, sf), &requested)?;
        self.bump_refresh(host, &node)
    }

    // ------------------------------------------------------------------
    // shapes

    /// Creates an empty shape under a region, returning its GUID.
    pub fn create_shape<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
        region_guid: Uuid,
    ) -> ApiResult<Uuid> {
        let node = self.resolve(host, frame, true)?;
        let sf = host.source_frame(frame);
        let key_region = self.require_region(host, &node, sf, region_guid)?;

        let shape = Uuid::new_v4();
        let key_shape = shape.simple().to_string();

        let shapes_key = keys::region_shapes(&node, &key_region);
        let mut shapes = string_list(host, &shapes_key)?;
        shapes.push(key_shape.clone());
        set_string_list(host, &shapes_key, &shapes)?;

        // points property exists from creation, initially empty
        set_float_tuples(host, &keys::shape_points(&node, &key_shape), &[], 2)?;

        self.bump_refresh(host, &node)?;
        Ok(shape)
    }

    /// Appends one screen-space point to a shape.
    pub fn append_point_to_shape<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
        region_guid: Uuid,
        shape_guid: Uuid,
        screen_point: (f32, f32),
    ) -> ApiResult<()> {
        self.append_points_to_shape(host, frame, region_guid, shape_guid, &[screen_point])
    }

    /// Appends screen-space points to a shape, converting each to image
    /// space through the host coordinate mapping.
    pub fn append_points_to_shape<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
        region_guid: Uuid,
        shape_guid: Uuid,
        screen_points: &[(f32, f32)],
    ) -> ApiResult<()> {
        let node = self.resolve(host, frame, true)?;
        let sf = host.source_frame(frame);
        let key_region = self.require_region(host, &node, sf, region_guid)?;

        let key_shape = shape_guid.simple().to_string();
        let shapes = string_list(host, &keys::region_shapes(&node, &key_region))?;
        if !shapes.contains(&key_shape) {
            return Err(ApiError::UnknownGuid(key_shape));
        }

        let points_key = keys::shape_points(&node, &key_shape);
        let mut points = if host.exists(&points_key) {
            float_tuples(host, &points_key)?
        } else {
            Vec::new()
        };

        for &pt in screen_points {
            let image = host.image_at_pixel(pt).ok_or(ApiError::NoSource)?;
            let (xi, yi) = host.event_to_image_space(&image, pt);
            points.push(vec![xi, yi]);
        }

        set_float_tuples(host, &points_key, &points, 2)?;
        self.bump_refresh(host, &node)
    }

    /// Image-space points of a shape, in draw order.
    pub fn shape_points<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        frame: i32,
        shape_guid: Uuid,
    ) -> ApiResult<Vec<(f32, f32)>> {
        let node = self.resolve(host, frame, false)?;
        let points_key = keys::shape_points(&node, &shape_guid.simple().to_string());
        if !host.exists(&points_key) {
            return Err(ApiError::UnknownGuid(shape_guid.simple().to_string()));
        }
        Ok(float_tuples(host, &points_key)?
            .into_iter()
            .filter(|t| t.len() >= 2)
            .map(|t| (t[0], t[1]))
            .collect())
    }

    // ------------------------------------------------------------------
    // drawing flag

    /// Marks a shape-drawing gesture in progress; while set, the host
    /// suspends frame-change mouse handling.
    pub fn set_drawing_in_progress<H: HostBackend + ?Sized>(
        &self,
        host: &mut H,
        in_progress: bool,
    ) {
        self.drawing.set(in_progress);
        host.set_frame_change_mouse_events(!in_progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SingleSourceSession;
    use rcc_store::PropertyStore;

    fn fixture() -> (SingleSourceSession, CorrectorApi) {
        (SingleSourceSession::new("clip0", 1920, 1080), CorrectorApi::new())
    }

    #[test]
    fn test_clip_cc_set_get_and_refresh() {
        let (mut host, api) = fixture();

        api.set_clip_cc(&mut host, 1, &Correction::new().with_saturation(2.0))
            .unwrap();

        let cc = api.get_clip_cc(&mut host, 1).unwrap();
        assert_eq!(cc.cdl.saturation, 2.0);
        assert_eq!(cc.cdl.slope, [1.0, 1.0, 1.0]);
        assert_eq!(api.refresh_count(&mut host, 1).unwrap(), 1);
    }

    #[test]
    fn test_update_clip_cc_is_partial() {
        let (mut host, api) = fixture();

        api.set_clip_cc(&mut host, 1, &Correction::new().with_gain([1.5, 1.5, 1.5]))
            .unwrap();
        api.update_clip_cc(&mut host, 1, &CorrectionPatch::new().with_saturation(0.5))
            .unwrap();

        let cc = api.get_clip_cc(&mut host, 1).unwrap();
        assert_eq!(cc.grade.gain, [1.5, 1.5, 1.5]);
        assert_eq!(cc.cdl.saturation, 0.5);
    }

    #[test]
    fn test_set_idempotent_apart_from_refresh() {
        let (mut host, api) = fixture();

        api.set_clip_cc(&mut host, 1, &Correction::new().with_saturation(2.0))
            .unwrap();
        let before = api.get_clip_cc(&mut host, 1).unwrap();
        let refresh_before = api.refresh_count(&mut host, 1).unwrap();

        api.set_clip_cc(&mut host, 1, &before).unwrap();

        assert_eq!(api.get_clip_cc(&mut host, 1).unwrap(), before);
        assert_eq!(api.refresh_count(&mut host, 1).unwrap(), refresh_before + 1);
    }

    #[test]
    fn test_frame_cc_keyed_by_source_frame() {
        let (mut host, api) = fixture();
        host.frame_offset = 100;

        api.set_frame_cc(&mut host, 112, &Correction::new().with_saturation(1.5))
            .unwrap();

        // source frame 12 lives under the frame:12 prefix
        assert!(host.store().exists("clip0.ColorCorrector.frame:12.saturation"));
    }

    #[test]
    fn test_region_lifecycle_order_and_defaults() {
        let (mut host, api) = fixture();

        let g1 = api.create_region_cc(&mut host, 1).unwrap();
        let g2 = api.create_region_cc(&mut host, 1).unwrap();

        api.reorder_region_ccs(&mut host, 1, &[g2, g1]).unwrap();

        let regions = api.get_region_ccs(&mut host, 1).unwrap();
        let guids: Vec<Uuid> = regions.iter().map(|r| r.guid).collect();
        assert_eq!(guids, vec![g2, g1]);
        for r in &regions {
            assert!(r.correction.is_identity());
            assert_eq!(r.falloff, 0.0);
        }
    }

    #[test]
    fn test_reorder_preserves_record_bytes() {
        let (mut host, api) = fixture();

        let g1 = api.create_region_cc(&mut host, 1).unwrap();
        let g2 = api.create_region_cc(&mut host, 1).unwrap();

        let mut r1 = api.get_region_cc(&mut host, 1, g1).unwrap();
        r1.correction = Correction::new().with_saturation(0.25);
        api.set_region_cc(&mut host, 1, &r1).unwrap();
        let bytes_before = api
            .get_region_cc(&mut host, 1, g1)
            .unwrap()
            .correction
            .to_bytes();

        api.reorder_region_ccs(&mut host, 1, &[g2, g1]).unwrap();

        let after = api.get_region_cc(&mut host, 1, g1).unwrap();
        assert_eq!(after.correction.to_bytes(), bytes_before);
    }

    #[test]
    fn test_reorder_rejects_non_permutation() {
        let (mut host, api) = fixture();

        let g1 = api.create_region_cc(&mut host, 1).unwrap();
        let stranger = Uuid::new_v4();

        let err = api.reorder_region_ccs(&mut host, 1, &[stranger]);
        assert!(matches!(err, Err(ApiError::GuidSetMismatch)));

        // no mutation happened
        let regions = api.get_region_ccs(&mut host, 1).unwrap();
        assert_eq!(regions[0].guid, g1);
    }

    #[test]
    fn test_get_region_cc_unknown_guid() {
        let (mut host, api) = fixture();
        api.create_region_cc(&mut host, 1).unwrap();

        let err = api.get_region_cc(&mut host, 1, Uuid::new_v4());
        assert!(matches!(err, Err(ApiError::UnknownGuid(_))));
    }

    #[test]
    fn test_delete_region_cascades_to_shapes() {
        let (mut host, api) = fixture();

        let g1 = api.create_region_cc(&mut host, 1).unwrap();
        let s1 = api.create_shape(&mut host, 1, g1).unwrap();
        let s2 = api.create_shape(&mut host, 1, g1).unwrap();
        api.append_point_to_shape(&mut host, 1, g1, s1, (100.0, 100.0))
            .unwrap();

        api.delete_region_cc(&mut host, 1, g1).unwrap();

        assert!(api.get_region_ccs(&mut host, 1).unwrap().is_empty());
        let node = "clip0.ColorCorrector";
        assert!(
            host.store()
                .keys_with_prefix(&format!("{node}.region:{}", g1.simple()))
                .is_empty()
        );
        for s in [s1, s2] {
            assert!(!host.store().exists(&format!("{node}.shape:{}.points", s.simple())));
        }
    }

    #[test]
    fn test_append_points_converts_to_image_space() {
        let (mut host, api) = fixture();

        let g1 = api.create_region_cc(&mut host, 1).unwrap();
        let s1 = api.create_shape(&mut host, 1, g1).unwrap();

        // screen center maps to image origin
        api.append_point_to_shape(&mut host, 1, g1, s1, (960.0, 540.0))
            .unwrap();

        let points = api.shape_points(&mut host, 1, s1).unwrap();
        assert_eq!(points.len(), 1);
        assert!(points[0].0.abs() < 1e-6);
        assert!(points[0].1.abs() < 1e-6);
    }

    #[test]
    fn test_append_to_unknown_shape() {
        let (mut host, api) = fixture();
        let g1 = api.create_region_cc(&mut host, 1).unwrap();

        let err = api.append_point_to_shape(&mut host, 1, g1, Uuid::new_v4(), (0.0, 0.0));
        assert!(matches!(err, Err(ApiError::UnknownGuid(_))));
    }

    #[test]
    fn test_drawing_flag_toggles_mouse_policy() {
        let (mut host, api) = fixture();

        api.set_drawing_in_progress(&mut host, true);
        assert!(api.drawing_flag().get());
        assert!(!host.frame_change_mouse_events);

        api.set_drawing_in_progress(&mut host, false);
        assert!(!api.drawing_flag().get());
        assert!(host.frame_change_mouse_events);
    }

    #[test]
    fn test_no_source_rejects_mutation() {
        struct Empty(SingleSourceSession);

        // a host whose timeline has no sources
        impl rcc_store::PropertyStore for Empty {
            fn exists(&self, key: &str) -> bool {
                self.0.exists(key)
            }
            fn info(&self, key: &str) -> rcc_store::StoreResult<rcc_store::PropInfo> {
                self.0.info(key)
            }
            fn get(&self, key: &str) -> rcc_store::StoreResult<rcc_store::PropData> {
                self.0.get(key)
            }
            fn create(
                &mut self,
                key: &str,
                ty: rcc_store::PropType,
                width: usize,
            ) -> rcc_store::StoreResult<()> {
                self.0.create(key, ty, width)
            }
            fn set(
                &mut self,
                key: &str,
                data: rcc_store::PropData,
                width: usize,
                create: bool,
            ) -> rcc_store::StoreResult<()> {
                self.0.set(key, data, width, create)
            }
            fn delete(&mut self, key: &str, ignore: bool) -> rcc_store::StoreResult<()> {
                self.0.delete(key, ignore)
            }
        }
        impl crate::host::FrameContext for Empty {
            fn sources_at(&self, _frame: i32) -> Vec<String> {
                Vec::new()
            }
            fn source_frame(&self, frame: i32) -> i32 {
                frame
            }
            fn nodes_in_eval_path(&self, _frame: i32, _kind: &str) -> Vec<String> {
                Vec::new()
            }
            fn prepend_pipeline_node(&mut self, _s: &str, _k: &str) -> Option<String> {
                None
            }
            fn source_media_info(&self, _s: &str) -> Option<crate::host::MediaInfo> {
                None
            }
        }
        impl crate::host::CoordinateMap for Empty {
            fn image_at_pixel(&self, _p: (f32, f32)) -> Option<String> {
                None
            }
            fn event_to_image_space(&self, _i: &str, p: (f32, f32)) -> (f32, f32) {
                p
            }
        }

        let mut host = Empty(SingleSourceSession::new("x", 16, 16));
        let api = CorrectorApi::new();

        let err = api.set_clip_cc(&mut host, 1, &Correction::new());
        assert!(matches!(err, Err(ApiError::NoSource)));
        assert!(host.0.store().is_empty());
    }
}
