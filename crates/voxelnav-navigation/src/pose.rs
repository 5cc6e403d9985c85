//! Combined position and orientation.

use glam::{DMat4, DQuat, DVec3};
use serde_json::{Map, Value};
use tracing::debug;
use voxelnav_core::{Signal, Subscription, Trackable};

use crate::orientation::OrientationState;
use crate::position::SpatialPosition;
use crate::voxel_size::VoxelSize;

/// Rigid placement of the camera: a [`SpatialPosition`] and an
/// [`OrientationState`].
///
/// Changes to either child are re-broadcast on the pose's own signal.
#[derive(Debug)]
pub struct Pose {
    // Subscriptions come first so they are dropped before the children.
    _position_subscription: Subscription,
    _orientation_subscription: Subscription,
    position: SpatialPosition,
    orientation: OrientationState,
    changed: Signal,
}

impl Pose {
    /// Create a pose from its parts.
    #[must_use]
    pub fn new(position: SpatialPosition, orientation: OrientationState) -> Self {
        let changed = Signal::new();
        let forward = changed.clone();
        let position_subscription = position.changed().subscribe(move || forward.dispatch());
        let forward = changed.clone();
        let orientation_subscription = orientation.changed().subscribe(move || forward.dispatch());
        Self {
            _position_subscription: position_subscription,
            _orientation_subscription: orientation_subscription,
            position,
            orientation,
            changed,
        }
    }

    /// Create an unset pose with identity orientation.
    #[must_use]
    pub fn with_voxel_size(voxel_size: VoxelSize) -> Self {
        Self::new(SpatialPosition::new(voxel_size), OrientationState::new())
    }

    /// The position component.
    #[must_use]
    pub fn position(&self) -> &SpatialPosition {
        &self.position
    }

    /// The orientation component.
    #[must_use]
    pub fn orientation(&self) -> &OrientationState {
        &self.orientation
    }

    /// The voxel size the position is measured against.
    #[must_use]
    pub fn voxel_size(&self) -> &VoxelSize {
        self.position.voxel_size()
    }

    /// Returns `true` if the position is known.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.position.is_valid()
    }

    /// Rotation followed by translation. An unknown position translates by zero.
    #[must_use]
    pub fn to_mat4(&self) -> DMat4 {
        let translation = self.position.spatial_coordinates().unwrap_or(DVec3::ZERO);
        DMat4::from_rotation_translation(self.orientation.orientation(), translation)
    }

    /// Snap orientation to the nearest axis-aligned rotation, then the
    /// position to the voxel grid.
    pub fn snap(&self) {
        self.orientation.snap();
        self.position.snap_to_voxel();
        self.changed.dispatch();
    }

    /// Move by `delta` in world axes.
    pub fn translate_absolute(&self, delta: DVec3) {
        self.position.translate(delta);
    }

    /// Move by `delta` in camera-local axes.
    pub fn translate_relative(&self, delta: DVec3) {
        if !self.is_valid() {
            return;
        }
        self.position.translate(self.orientation.orientation() * delta);
    }

    /// Move by `delta` voxels in camera-local axes.
    pub fn translate_voxels_relative(&self, delta: DVec3) {
        let Some(voxel_size) = self.voxel_size().get() else {
            return;
        };
        if !self.is_valid() {
            return;
        }
        self.position
            .translate((self.orientation.orientation() * delta) * voxel_size);
    }

    /// Rotate by `angle` radians about `axis` in the camera's local frame.
    pub fn rotate_relative(&self, axis: DVec3, angle: f64) {
        if let Some(rotation) = axis_rotation(axis, angle) {
            let orientation = self.orientation.orientation();
            self.orientation.set_orientation(orientation * rotation);
        }
    }

    /// Rotate by `angle` radians about `axis` in world axes.
    pub fn rotate_absolute(&self, axis: DVec3, angle: f64) {
        if let Some(rotation) = axis_rotation(axis, angle) {
            let orientation = self.orientation.orientation();
            self.orientation.set_orientation(rotation * orientation);
        }
    }
}

fn axis_rotation(axis: DVec3, angle: f64) -> Option<DQuat> {
    let axis = axis.try_normalize()?;
    Some(DQuat::from_axis_angle(axis, angle))
}

impl Trackable for Pose {
    fn changed(&self) -> &Signal {
        &self.changed
    }

    fn to_json(&self) -> Option<Value> {
        let mut obj = Map::new();
        if let Some(position) = self.position.to_json() {
            obj.insert("position".to_owned(), position);
        }
        if let Some(orientation) = self.orientation.to_json() {
            obj.insert("orientation".to_owned(), orientation);
        }
        (!obj.is_empty()).then_some(Value::Object(obj))
    }

    fn restore_state(&self, value: &Value) {
        let Value::Object(obj) = value else {
            debug!("Ignoring non-object pose {value}");
            self.reset();
            return;
        };
        match obj.get("position") {
            Some(position) => self.position.restore_state(position),
            None => self.position.reset(),
        }
        match obj.get("orientation") {
            Some(orientation) => self.orientation.restore_state(orientation),
            None => self.orientation.reset(),
        }
    }

    fn reset(&self) {
        self.position.reset();
        self.orientation.reset();
    }
}
