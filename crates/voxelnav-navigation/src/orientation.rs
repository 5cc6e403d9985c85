//! Camera orientation.

use std::cell::Cell;

use glam::DQuat;
use serde_json::Value;
use tracing::debug;
use voxelnav_core::math::snap_orientation;
use voxelnav_core::{parse_finite_vec, Signal, Trackable};

/// Camera orientation as a unit quaternion, stored `[x, y, z, w]`.
#[derive(Debug, Default)]
pub struct OrientationState {
    orientation: Cell<DQuat>,
    changed: Signal,
}

impl OrientationState {
    /// Create an identity orientation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from an existing quaternion, normalizing it.
    #[must_use]
    pub fn with_orientation(orientation: DQuat) -> Self {
        Self {
            orientation: Cell::new(normalize_or_identity(orientation)),
            changed: Signal::new(),
        }
    }

    /// Current orientation.
    #[inline]
    #[must_use]
    pub fn orientation(&self) -> DQuat {
        self.orientation.get()
    }

    /// Assign a new orientation, normalizing it.
    pub fn set_orientation(&self, orientation: DQuat) {
        self.orientation.set(normalize_or_identity(orientation));
        self.changed.dispatch();
    }

    /// Round to the nearest axis-aligned orientation.
    pub fn snap(&self) {
        self.orientation.set(snap_orientation(self.orientation()));
        self.changed.dispatch();
    }
}

/// Already-unit quaternions are returned unchanged so repeated restores of
/// the same JSON are stable.
fn normalize_or_identity(q: DQuat) -> DQuat {
    let length_squared = q.length_squared();
    if (length_squared - 1.0).abs() <= 1e-14 {
        return q;
    }
    let length = length_squared.sqrt();
    if length > 0.0 && length.is_finite() {
        q / length
    } else {
        DQuat::IDENTITY
    }
}

impl Trackable for OrientationState {
    fn changed(&self) -> &Signal {
        &self.changed
    }

    fn to_json(&self) -> Option<Value> {
        let orientation = self.orientation();
        if orientation == DQuat::IDENTITY {
            return None;
        }
        Some(Value::from(orientation.to_array().to_vec()))
    }

    fn restore_state(&self, value: &Value) {
        let orientation = match parse_finite_vec::<4>(value) {
            Ok(q) => normalize_or_identity(DQuat::from_array(q)),
            Err(err) => {
                debug!("Ignoring invalid orientation {value}: {err}");
                DQuat::IDENTITY
            }
        };
        self.orientation.set(orientation);
        self.changed.dispatch();
    }

    fn reset(&self) {
        self.orientation.set(DQuat::IDENTITY);
        self.changed.dispatch();
    }
}
