//! Physical size of one voxel.

use std::cell::Cell;
use std::fmt;

use glam::DVec3;
use serde_json::Value;
use tracing::debug;
use voxelnav_core::{parse_positive_vec, Signal, Trackable};

/// Size of one voxel along each axis, in nanometers.
///
/// Starts out unset until the dataset is loaded. Once valid it is not meant
/// to change, although nothing prevents a later restore from overwriting it.
#[derive(Debug, Default)]
pub struct VoxelSize {
    size: Cell<DVec3>,
    valid: Cell<bool>,
    changed: Signal,
}

impl VoxelSize {
    /// Create an unset voxel size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a voxel size that is already valid.
    ///
    /// A size with a zero, negative or non-finite component starts out unset.
    #[must_use]
    pub fn with_size(size: DVec3) -> Self {
        Self {
            size: Cell::new(size),
            valid: Cell::new(is_positive(size)),
            changed: Signal::new(),
        }
    }

    /// Returns `true` once a size has been assigned.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }

    /// The backing size vector. Meaningless while unset.
    #[inline]
    #[must_use]
    pub fn size(&self) -> DVec3 {
        self.size.get()
    }

    /// Returns the size if valid.
    #[must_use]
    pub fn get(&self) -> Option<DVec3> {
        self.is_valid().then(|| self.size())
    }

    /// Mark valid, notifying only on the transition from unset.
    pub fn set_valid(&self) {
        if !self.valid.replace(true) {
            self.changed.dispatch();
        }
    }

    /// Assign the size and mark it valid.
    ///
    /// Every component must be finite and positive, otherwise the size
    /// becomes unset.
    pub fn set_size(&self, size: DVec3) {
        if is_positive(size) {
            self.size.set(size);
            self.set_valid();
        } else {
            debug!("Ignoring non-positive voxel size {size}");
            self.invalidate();
        }
    }

    fn invalidate(&self) {
        if self.valid.replace(false) {
            self.changed.dispatch();
        }
    }

    /// Convert spatial coordinates to voxel coordinates.
    #[inline]
    #[must_use]
    pub fn voxel_from_spatial(&self, spatial: DVec3) -> DVec3 {
        spatial / self.size()
    }

    /// Convert voxel coordinates to spatial coordinates.
    #[inline]
    #[must_use]
    pub fn spatial_from_voxel(&self, voxel: DVec3) -> DVec3 {
        voxel * self.size()
    }
}

impl Trackable for VoxelSize {
    fn changed(&self) -> &Signal {
        &self.changed
    }

    fn to_json(&self) -> Option<Value> {
        self.get().map(|size| Value::from(size.to_array().to_vec()))
    }

    fn restore_state(&self, value: &Value) {
        match parse_positive_vec::<3>(value) {
            Ok(size) => self.set_size(DVec3::from_array(size)),
            Err(err) => {
                debug!("Ignoring invalid voxel size {value}: {err}");
                self.invalidate();
            }
        }
    }

    fn reset(&self) {
        self.valid.set(false);
        self.changed.dispatch();
    }
}

fn is_positive(size: DVec3) -> bool {
    size.is_finite() && size.cmpgt(DVec3::ZERO).all()
}

impl fmt::Display for VoxelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(size) => write!(f, "{}nm × {}nm × {}nm", size.x, size.y, size.z),
            None => f.write_str("unset"),
        }
    }
}
