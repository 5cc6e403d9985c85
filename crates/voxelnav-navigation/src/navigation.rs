//! Pose plus zoom.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use glam::{DMat4, DVec3};
use serde_json::{Map, Value};
use tracing::{debug, trace};
use voxelnav_core::{parse_finite_positive, Signal, Subscription, Trackable};

use crate::pose::Pose;
use crate::uniforms::ViewUniforms;
use crate::voxel_size::VoxelSize;

/// Full navigation state: a [`Pose`] and a zoom factor.
///
/// While unset, the zoom factor defaults to the smallest voxel size component
/// as soon as the voxel size is known.
#[derive(Debug)]
pub struct NavigationState {
    inner: Rc<NavigationInner>,
}

#[derive(Debug)]
struct NavigationInner {
    _pose_subscription: Subscription,
    _voxel_size_subscription: Subscription,
    pose: Pose,
    zoom_factor: Cell<Option<f64>>,
    changed: Signal,
}

impl NavigationState {
    /// Create with an unset zoom factor.
    #[must_use]
    pub fn new(pose: Pose) -> Self {
        Self::build(pose, None)
    }

    /// Create with an explicit zoom factor.
    ///
    /// A zero, negative or non-finite zoom is treated as unset.
    #[must_use]
    pub fn with_zoom_factor(pose: Pose, zoom_factor: f64) -> Self {
        Self::build(pose, usable_zoom(zoom_factor))
    }

    fn build(pose: Pose, zoom_factor: Option<f64>) -> Self {
        let changed = Signal::new();
        let forward = changed.clone();
        let pose_subscription = pose.changed().subscribe(move || forward.dispatch());

        let inner = Rc::new_cyclic(|weak: &Weak<NavigationInner>| {
            let weak = weak.clone();
            let voxel_size_subscription = pose.voxel_size().changed().subscribe(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_voxel_size_changed();
                }
            });
            NavigationInner {
                _pose_subscription: pose_subscription,
                _voxel_size_subscription: voxel_size_subscription,
                pose,
                zoom_factor: Cell::new(zoom_factor),
                changed,
            }
        });
        inner.derive_zoom_factor();
        Self { inner }
    }

    /// The pose component.
    #[must_use]
    pub fn pose(&self) -> &Pose {
        &self.inner.pose
    }

    /// The voxel size shared by the pose's position.
    #[must_use]
    pub fn voxel_size(&self) -> &VoxelSize {
        self.inner.pose.voxel_size()
    }

    /// Current zoom factor, `None` while unset.
    #[must_use]
    pub fn zoom_factor(&self) -> Option<f64> {
        self.inner.zoom_factor.get()
    }

    /// Assign the zoom factor explicitly.
    ///
    /// A zero, negative or non-finite zoom unsets it, falling back to the
    /// voxel-size default when one is known.
    pub fn set_zoom_factor(&self, zoom_factor: f64) {
        self.inner.zoom_factor.set(usable_zoom(zoom_factor));
        self.inner.derive_zoom_factor();
        self.inner.changed.dispatch();
    }

    /// Returns `true` if both the pose and the zoom factor are known.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner.pose.is_valid() && self.zoom_factor().is_some()
    }

    /// Return the zoom factor to its voxel-size default.
    pub fn reset_zoom(&self) {
        self.inner.zoom_factor.set(None);
        self.inner.derive_zoom_factor();
        self.inner.changed.dispatch();
    }

    /// Multiply the zoom factor.
    ///
    /// No-op while unset or when the product is not finite and positive.
    pub fn zoom_by(&self, factor: f64) {
        let Some(zoom_factor) = self.zoom_factor() else {
            return;
        };
        match usable_zoom(zoom_factor * factor) {
            Some(zoom_factor) => {
                self.inner.zoom_factor.set(Some(zoom_factor));
                self.inner.changed.dispatch();
            }
            None => debug!("Ignoring zoom by {factor}"),
        }
    }

    /// Pose transform scaled uniformly by the zoom factor.
    #[must_use]
    pub fn to_mat4(&self) -> DMat4 {
        let zoom = self.zoom_factor().unwrap_or(1.0);
        self.inner.pose.to_mat4() * DMat4::from_scale(DVec3::splat(zoom))
    }

    /// GPU-ready copy of the view transform.
    #[must_use]
    pub fn view_uniforms(&self) -> ViewUniforms {
        ViewUniforms::from(self)
    }
}

fn usable_zoom(zoom_factor: f64) -> Option<f64> {
    (zoom_factor.is_finite() && zoom_factor > 0.0).then_some(zoom_factor)
}

impl NavigationInner {
    fn derive_zoom_factor(&self) {
        if self.zoom_factor.get().is_some() {
            return;
        }
        if let Some(size) = self.pose.voxel_size().get() {
            let zoom_factor = size.min_element();
            trace!("Derived zoom factor {zoom_factor} from voxel size");
            self.zoom_factor.set(Some(zoom_factor));
        }
    }

    fn handle_voxel_size_changed(&self) {
        if self.zoom_factor.get().is_none() {
            self.derive_zoom_factor();
            self.changed.dispatch();
        }
    }
}

impl Trackable for NavigationState {
    fn changed(&self) -> &Signal {
        &self.inner.changed
    }

    fn to_json(&self) -> Option<Value> {
        let mut obj = Map::new();
        if let Some(pose) = self.inner.pose.to_json() {
            obj.insert("pose".to_owned(), pose);
        }
        if let Some(zoom_factor) = self.zoom_factor() {
            obj.insert("zoomFactor".to_owned(), Value::from(zoom_factor));
        }
        (!obj.is_empty()).then_some(Value::Object(obj))
    }

    fn restore_state(&self, value: &Value) {
        let Value::Object(obj) = value else {
            debug!("Ignoring non-object navigation state {value}");
            return;
        };
        match obj.get("pose") {
            Some(pose) => self.inner.pose.restore_state(pose),
            None => self.inner.pose.reset(),
        }
        let zoom_factor = obj.get("zoomFactor").and_then(|zoom| {
            parse_finite_positive(zoom)
                .map_err(|err| debug!("Ignoring invalid zoom factor: {err}"))
                .ok()
        });
        self.inner.zoom_factor.set(zoom_factor);
        self.inner.derive_zoom_factor();
        self.inner.changed.dispatch();
    }

    fn reset(&self) {
        self.inner.pose.reset();
        self.reset_zoom();
    }
}

/// Serializes only the zoom factor of a [`NavigationState`].
#[derive(Debug, Clone, Copy)]
pub struct TrackableZoomState<'a> {
    navigation: &'a NavigationState,
}

impl<'a> TrackableZoomState<'a> {
    /// Create a zoom view over `navigation`.
    #[must_use]
    pub const fn new(navigation: &'a NavigationState) -> Self {
        Self { navigation }
    }
}

impl Trackable for TrackableZoomState<'_> {
    fn changed(&self) -> &Signal {
        self.navigation.changed()
    }

    fn to_json(&self) -> Option<Value> {
        self.navigation.zoom_factor().map(Value::from)
    }

    fn restore_state(&self, value: &Value) {
        match parse_finite_positive(value) {
            Ok(zoom_factor) => self.navigation.set_zoom_factor(zoom_factor),
            Err(err) => debug!("Ignoring invalid zoom factor {value}: {err}"),
        }
    }

    fn reset(&self) {
        self.navigation.reset_zoom();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use serde_json::json;
    use std::f64::consts::FRAC_PI_2;

    fn unset_navigation() -> NavigationState {
        NavigationState::new(Pose::with_voxel_size(VoxelSize::new()))
    }

    #[test]
    fn zoom_derived_when_voxel_size_arrives() {
        let navigation = unset_navigation();
        assert_eq!(navigation.zoom_factor(), None);
        navigation.voxel_size().restore_state(&json!([2, 4, 3]));
        assert_eq!(navigation.zoom_factor(), Some(2.0));
    }

    #[test]
    fn zoom_derived_at_construction() {
        let navigation =
            NavigationState::new(Pose::with_voxel_size(VoxelSize::with_size(DVec3::new(8.0, 6.0, 40.0))));
        assert_eq!(navigation.zoom_factor(), Some(6.0));
    }

    #[test]
    fn explicit_zoom_is_not_overridden() {
        let navigation = NavigationState::with_zoom_factor(
            Pose::with_voxel_size(VoxelSize::new()),
            10.0,
        );
        navigation.voxel_size().set_size(DVec3::ONE);
        assert_eq!(navigation.zoom_factor(), Some(10.0));
    }

    #[test]
    fn zoom_by_requires_zoom() {
        let navigation = unset_navigation();
        navigation.zoom_by(2.0);
        assert_eq!(navigation.zoom_factor(), None);

        navigation.set_zoom_factor(3.0);
        navigation.zoom_by(2.0);
        assert_eq!(navigation.zoom_factor(), Some(6.0));
    }

    #[test]
    fn unusable_zoom_is_unset() {
        let navigation =
            NavigationState::with_zoom_factor(Pose::with_voxel_size(VoxelSize::new()), f64::NAN);
        assert_eq!(navigation.zoom_factor(), None);
        navigation.voxel_size().set_size(DVec3::new(2.0, 4.0, 3.0));
        assert_eq!(navigation.zoom_factor(), Some(2.0));
        assert_eq!(
            navigation.to_json(),
            Some(json!({
                "pose": {"position": {"voxelSize": [2.0, 4.0, 3.0]}},
                "zoomFactor": 2.0,
            }))
        );

        navigation.set_zoom_factor(8.0);
        navigation.set_zoom_factor(-1.0);
        assert_eq!(navigation.zoom_factor(), Some(2.0));

        let unset = unset_navigation();
        unset.set_zoom_factor(f64::INFINITY);
        assert_eq!(unset.zoom_factor(), None);
    }

    #[test]
    fn zoom_by_keeps_zoom_restorable() {
        let navigation = NavigationState::with_zoom_factor(
            Pose::with_voxel_size(VoxelSize::with_size(DVec3::splat(4.0))),
            3.0,
        );
        for factor in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            navigation.zoom_by(factor);
            assert_eq!(navigation.zoom_factor(), Some(3.0));
        }

        let saved = navigation.to_json().unwrap();
        let restored = unset_navigation();
        restored.restore_state(&saved);
        assert_eq!(restored.zoom_factor(), Some(3.0));
    }

    #[test]
    fn reset_zoom_returns_to_voxel_default() {
        let navigation =
            NavigationState::new(Pose::with_voxel_size(VoxelSize::with_size(DVec3::splat(4.0))));
        navigation.zoom_by(3.0);
        assert_eq!(navigation.zoom_factor(), Some(12.0));
        navigation.reset_zoom();
        assert_eq!(navigation.zoom_factor(), Some(4.0));

        let unset = unset_navigation();
        unset.set_zoom_factor(5.0);
        unset.reset_zoom();
        assert_eq!(unset.zoom_factor(), None);
    }

    #[test]
    fn to_mat4_scales_pose() {
        let navigation = NavigationState::with_zoom_factor(
            Pose::with_voxel_size(VoxelSize::with_size(DVec3::ONE)),
            2.0,
        );
        navigation.pose().position().set_spatial_coordinates(DVec3::new(1.0, 2.0, 3.0));
        navigation.pose().rotate_absolute(DVec3::Z, FRAC_PI_2);
        let point = navigation.to_mat4().transform_point3(DVec3::X);
        assert_abs_diff_eq!(point, DVec3::new(1.0, 4.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn restore_roundtrip() {
        let source = NavigationState::with_zoom_factor(
            Pose::with_voxel_size(VoxelSize::with_size(DVec3::new(4.0, 4.0, 40.0))),
            7.5,
        );
        source.pose().position().set_voxel_coordinates(DVec3::new(10.0, 20.0, 30.0));
        let saved = source.to_json().unwrap();
        assert_eq!(
            saved,
            json!({
                "pose": {"position": {
                    "voxelSize": [4.0, 4.0, 40.0],
                    "voxelCoordinates": [10.0, 20.0, 30.0],
                }},
                "zoomFactor": 7.5,
            })
        );

        let target = unset_navigation();
        target.restore_state(&saved);
        assert_eq!(target.to_json(), Some(saved));
    }

    #[test]
    fn restore_invalid_zoom_falls_back_to_default() {
        let navigation = unset_navigation();
        navigation.restore_state(&json!({
            "pose": {"position": {"voxelSize": [2, 4, 3]}},
            "zoomFactor": -1,
        }));
        assert_eq!(navigation.zoom_factor(), Some(2.0));
    }

    #[test]
    fn restore_non_object_is_noop() {
        let navigation = NavigationState::with_zoom_factor(
            Pose::with_voxel_size(VoxelSize::new()),
            3.0,
        );
        navigation.restore_state(&json!([1, 2, 3]));
        assert_eq!(navigation.zoom_factor(), Some(3.0));
    }

    #[test]
    fn propagates_pose_changes() {
        let navigation = unset_navigation();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let _sub = navigation
            .changed()
            .subscribe(move || counter.set(counter.get() + 1));
        navigation.pose().orientation().snap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn trackable_zoom_ignores_non_numbers() {
        let navigation = NavigationState::with_zoom_factor(
            Pose::with_voxel_size(VoxelSize::new()),
            3.0,
        );
        let zoom = TrackableZoomState::new(&navigation);
        zoom.restore_state(&json!("not a number"));
        assert_eq!(navigation.zoom_factor(), Some(3.0));
        zoom.restore_state(&json!(0.5));
        assert_eq!(navigation.zoom_factor(), Some(0.5));
        assert_eq!(zoom.to_json(), Some(json!(0.5)));
    }

    #[test]
    fn drop_releases_voxel_size_listener() {
        let navigation = unset_navigation();
        // One listener from the position, one from the navigation state.
        assert_eq!(navigation.voxel_size().changed().listener_count(), 2);
        let inner = Rc::downgrade(&navigation.inner);
        drop(navigation);
        assert!(inner.upgrade().is_none());
    }
}
