//! Position in spatial or voxel units.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use glam::DVec3;
use serde_json::{Map, Value};
use tracing::debug;
use voxelnav_core::math::round_to_multiple;
use voxelnav_core::{parse_finite_vec, Signal, Subscription, Trackable};

use crate::voxel_size::VoxelSize;

/// Coordinate state of a [`SpatialPosition`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Coordinates {
    /// No position.
    #[default]
    Unset,
    /// Voxel coordinates waiting for the voxel size to become valid.
    Unresolved(DVec3),
    /// Spatial coordinates, plus any voxel coordinates assigned while the
    /// voxel size was unset. The spatial value wins once the size is valid.
    Resolved {
        spatial: DVec3,
        pending: Option<DVec3>,
    },
}

impl Coordinates {
    const fn spatial(spatial: DVec3) -> Self {
        Self::Resolved {
            spatial,
            pending: None,
        }
    }
}

/// Current 3-D location.
///
/// Voxel coordinates assigned before the voxel size is known are held as
/// [`Coordinates::Unresolved`] and converted as soon as it becomes valid.
#[derive(Debug)]
pub struct SpatialPosition {
    inner: Rc<PositionInner>,
}

#[derive(Debug)]
struct PositionInner {
    // Declared before `voxel_size` so it is dropped first.
    _voxel_size_subscription: Subscription,
    voxel_size: VoxelSize,
    coordinates: Cell<Coordinates>,
    changed: Signal,
}

impl SpatialPosition {
    /// Create an unset position measured against `voxel_size`.
    #[must_use]
    pub fn new(voxel_size: VoxelSize) -> Self {
        Self::with_coordinates(voxel_size, Coordinates::Unset)
    }

    /// Create a position seeded with spatial coordinates.
    #[must_use]
    pub fn with_spatial_coordinates(voxel_size: VoxelSize, spatial: DVec3) -> Self {
        Self::with_coordinates(voxel_size, Coordinates::spatial(spatial))
    }

    fn with_coordinates(voxel_size: VoxelSize, coordinates: Coordinates) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<PositionInner>| {
            let weak = weak.clone();
            let subscription = voxel_size.changed().subscribe(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_voxel_size_changed();
                }
            });
            PositionInner {
                _voxel_size_subscription: subscription,
                voxel_size,
                coordinates: Cell::new(coordinates),
                changed: Signal::new(),
            }
        });
        inner.resolve_pending();
        Self { inner }
    }

    /// The voxel size used for unit conversion.
    #[must_use]
    pub fn voxel_size(&self) -> &VoxelSize {
        &self.inner.voxel_size
    }

    /// Raw coordinate state.
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        self.inner.coordinates.get()
    }

    /// Returns `true` if spatial coordinates are known.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self.coordinates(), Coordinates::Resolved { .. })
    }

    /// Spatial coordinates, if known.
    #[must_use]
    pub fn spatial_coordinates(&self) -> Option<DVec3> {
        match self.coordinates() {
            Coordinates::Resolved { spatial, .. } => Some(spatial),
            Coordinates::Unset | Coordinates::Unresolved(_) => None,
        }
    }

    /// Assign spatial coordinates, discarding any pending voxel coordinates.
    pub fn set_spatial_coordinates(&self, spatial: DVec3) {
        self.inner.coordinates.set(Coordinates::spatial(spatial));
        self.inner.changed.dispatch();
    }

    /// Position in voxel units.
    ///
    /// Pending voxel coordinates are returned verbatim. Resolved coordinates
    /// are converted, which requires a valid voxel size.
    #[must_use]
    pub fn voxel_coordinates(&self) -> Option<DVec3> {
        match self.coordinates() {
            Coordinates::Unresolved(voxel)
            | Coordinates::Resolved {
                pending: Some(voxel),
                ..
            } => Some(voxel),
            Coordinates::Resolved { spatial, .. } => self
                .inner
                .voxel_size
                .is_valid()
                .then(|| self.inner.voxel_size.voxel_from_spatial(spatial)),
            Coordinates::Unset => None,
        }
    }

    /// Assign the position in voxel units.
    ///
    /// Converted immediately when the voxel size is valid, otherwise kept
    /// pending until it is. Known spatial coordinates are kept alongside a
    /// pending value and take precedence when it resolves.
    pub fn set_voxel_coordinates(&self, voxel: DVec3) {
        let voxel_size = &self.inner.voxel_size;
        let coordinates = if voxel_size.is_valid() {
            Coordinates::spatial(voxel_size.spatial_from_voxel(voxel))
        } else if let Some(spatial) = self.spatial_coordinates() {
            Coordinates::Resolved {
                spatial,
                pending: Some(voxel),
            }
        } else {
            Coordinates::Unresolved(voxel)
        };
        self.inner.coordinates.set(coordinates);
        self.inner.changed.dispatch();
    }

    /// Add `delta` to the spatial coordinates. No-op unless resolved.
    pub fn translate(&self, delta: DVec3) {
        if let Coordinates::Resolved { spatial, pending } = self.coordinates() {
            self.inner.coordinates.set(Coordinates::Resolved {
                spatial: spatial + delta,
                pending,
            });
            self.inner.changed.dispatch();
        }
    }

    /// Round the position to the voxel grid.
    ///
    /// Spatial coordinates are rounded to the nearest multiple of the voxel
    /// size, pending voxel coordinates to the nearest integer.
    pub fn snap_to_voxel(&self) {
        let voxel_size = &self.inner.voxel_size;
        let snapped = match self.coordinates() {
            Coordinates::Resolved { spatial, .. } if voxel_size.is_valid() => {
                Coordinates::spatial(round_to_multiple(spatial, voxel_size.size()))
            }
            Coordinates::Resolved {
                spatial,
                pending: Some(voxel),
            } => Coordinates::Resolved {
                spatial,
                pending: Some(voxel.round()),
            },
            Coordinates::Unresolved(voxel) => Coordinates::Unresolved(voxel.round()),
            Coordinates::Resolved { pending: None, .. } | Coordinates::Unset => return,
        };
        self.inner.coordinates.set(snapped);
        self.inner.changed.dispatch();
    }
}

impl PositionInner {
    /// Resolve pending voxel coordinates once the voxel size is valid.
    ///
    /// Known spatial coordinates win and the pending value is dropped.
    fn resolve_pending(&self) {
        if !self.voxel_size.is_valid() {
            return;
        }
        match self.coordinates.get() {
            Coordinates::Unresolved(voxel) => self
                .coordinates
                .set(Coordinates::spatial(self.voxel_size.spatial_from_voxel(voxel))),
            Coordinates::Resolved {
                spatial,
                pending: Some(_),
            } => self.coordinates.set(Coordinates::spatial(spatial)),
            Coordinates::Resolved { pending: None, .. } | Coordinates::Unset => {}
        }
    }

    fn handle_voxel_size_changed(&self) {
        self.resolve_pending();
        self.changed.dispatch();
    }
}

impl Trackable for SpatialPosition {
    fn changed(&self) -> &Signal {
        &self.inner.changed
    }

    fn to_json(&self) -> Option<Value> {
        let mut obj = Map::new();
        if let Some(voxel_size) = self.inner.voxel_size.to_json() {
            obj.insert("voxelSize".to_owned(), voxel_size);
        }
        match self.coordinates() {
            Coordinates::Unresolved(voxel) => {
                obj.insert("voxelCoordinates".to_owned(), vec3_json(voxel));
            }
            Coordinates::Resolved { spatial, .. } if self.inner.voxel_size.is_valid() => {
                let voxel = self.inner.voxel_size.voxel_from_spatial(spatial);
                obj.insert("voxelCoordinates".to_owned(), vec3_json(voxel));
            }
            Coordinates::Resolved { spatial, .. } => {
                obj.insert("spatialCoordinates".to_owned(), vec3_json(spatial));
            }
            Coordinates::Unset => {}
        }
        (!obj.is_empty()).then_some(Value::Object(obj))
    }

    fn restore_state(&self, value: &Value) {
        let Value::Object(obj) = value else {
            debug!("Ignoring non-object position {value}");
            self.reset();
            return;
        };

        if let Some(voxel_size) = obj.get("voxelSize") {
            self.inner.voxel_size.restore_state(voxel_size);
        }

        self.inner.coordinates.set(Coordinates::Unset);
        let voxel = obj.get("voxelCoordinates").map(parse_finite_vec::<3>);
        match voxel {
            Some(Ok(voxel)) => self.set_voxel_coordinates(DVec3::from_array(voxel)),
            other => {
                if let Some(Err(err)) = other {
                    debug!("Ignoring invalid voxel coordinates: {err}");
                }
                match obj.get("spatialCoordinates").map(parse_finite_vec::<3>) {
                    Some(Ok(spatial)) => {
                        self.set_spatial_coordinates(DVec3::from_array(spatial));
                    }
                    Some(Err(err)) => debug!("Ignoring invalid spatial coordinates: {err}"),
                    None => {}
                }
            }
        }
        self.inner.changed.dispatch();
    }

    fn reset(&self) {
        self.inner.coordinates.set(Coordinates::Unset);
        self.inner.changed.dispatch();
    }
}

fn vec3_json(v: DVec3) -> Value {
    Value::from(v.to_array().to_vec())
}
