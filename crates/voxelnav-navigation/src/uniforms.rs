//! GPU upload layout for the navigation transform.

use crate::navigation::NavigationState;

/// View uniform buffer data for GPU.
///
/// Single precision copy of [`NavigationState::to_mat4`] and its inverse.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewUniforms {
    pub view: [[f32; 4]; 4],
    pub inverse_view: [[f32; 4]; 4],
    /// `[zoom_factor, valid, 0, 0]`; zoom is 1 while unset.
    pub zoom: [f32; 4],
}

impl From<&NavigationState> for ViewUniforms {
    fn from(navigation: &NavigationState) -> Self {
        let view = navigation.to_mat4();
        Self {
            view: view.as_mat4().to_cols_array_2d(),
            inverse_view: view.inverse().as_mat4().to_cols_array_2d(),
            zoom: [
                navigation.zoom_factor().unwrap_or(1.0) as f32,
                if navigation.is_valid() { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Pose;
    use crate::voxel_size::VoxelSize;
    use glam::{DVec3, Mat4};

    #[test]
    fn uniforms_match_view_matrix() {
        let navigation = NavigationState::new(Pose::with_voxel_size(VoxelSize::with_size(
            DVec3::new(2.0, 2.0, 2.0),
        )));
        navigation
            .pose()
            .position()
            .set_spatial_coordinates(DVec3::new(1.0, 2.0, 3.0));

        let uniforms = navigation.view_uniforms();
        let view = Mat4::from_cols_array_2d(&uniforms.view);
        assert!(view.abs_diff_eq(navigation.to_mat4().as_mat4(), 1e-6));
        assert_eq!(uniforms.zoom, [2.0, 1.0, 0.0, 0.0]);
        assert_eq!(bytemuck::bytes_of(&uniforms).len(), 2 * 64 + 16);
    }

    #[test]
    fn unset_state_uses_unit_zoom() {
        let navigation = NavigationState::new(Pose::with_voxel_size(VoxelSize::new()));
        let uniforms = ViewUniforms::from(&navigation);
        assert_eq!(uniforms.zoom, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(uniforms.view, Mat4::IDENTITY.to_cols_array_2d());
    }
}
