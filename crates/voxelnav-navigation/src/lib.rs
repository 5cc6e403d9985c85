//! Camera navigation state for volumetric data viewers.
//!
//! The state forms a small ownership tree, each node broadcasting a
//! [`Signal`](voxelnav_core::Signal) when it changes:
//!
//! ```text
//! NavigationState ── zoom factor
//!   └─ Pose
//!        ├─ SpatialPosition ── VoxelSize
//!        └─ OrientationState
//! ```
//!
//! Voxel size changes flow up into the position (resolving pending voxel
//! coordinates) and into the navigation state (deriving the default zoom).
//! Every node implements [`Trackable`](voxelnav_core::Trackable) for
//! best-effort JSON persistence.
//!
//! # Usage
//!
//! ```
//! use glam::DVec3;
//! use serde_json::json;
//! use voxelnav_core::Trackable;
//! use voxelnav_navigation::{NavigationState, Pose, VoxelSize};
//!
//! let navigation = NavigationState::new(Pose::with_voxel_size(VoxelSize::new()));
//!
//! // Position can be set before the dataset's voxel size is known.
//! navigation
//!     .pose()
//!     .position()
//!     .set_voxel_coordinates(DVec3::new(10.0, 20.0, 30.0));
//! assert_eq!(navigation.zoom_factor(), None);
//!
//! navigation.voxel_size().restore_state(&json!([4, 4, 40]));
//! assert_eq!(navigation.zoom_factor(), Some(4.0));
//! assert_eq!(
//!     navigation.pose().position().spatial_coordinates(),
//!     Some(DVec3::new(40.0, 80.0, 1200.0))
//! );
//! ```

mod fragment;
mod navigation;
mod orientation;
mod pose;
mod position;
mod uniforms;
mod voxel_size;

pub use fragment::{restore_from_fragment, to_fragment};
pub use navigation::{NavigationState, TrackableZoomState};
pub use orientation::OrientationState;
pub use pose::Pose;
pub use position::{Coordinates, SpatialPosition};
pub use uniforms::ViewUniforms;
pub use voxel_size::VoxelSize;

// Re-export core types commonly used with navigation state
pub use voxelnav_core::{Signal, Subscription, Trackable};
