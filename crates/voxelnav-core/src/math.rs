//! Math utilities and helpers.

use glam::{DMat3, DQuat, DVec3};

/// Sign of `x` as -1, 0 or 1. Unlike [`f64::signum`], zero maps to zero.
#[inline]
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Round a rotation matrix to the nearest signed permutation matrix.
///
/// Columns are processed in order. Each column keeps only its largest
/// magnitude entry among the axes not yet claimed by an earlier column, set
/// to ±1. Ties go to the lowest axis.
pub fn snap_rotation(matrix: DMat3) -> DMat3 {
    let mut m = matrix.to_cols_array();
    let mut used_axes = [false; 3];
    for i in 0..3 {
        let mut max_component = 0.0_f64;
        let mut argmax_component = 0;
        for (j, used) in used_axes.iter().enumerate() {
            let value = m[i * 3 + j];
            m[i * 3 + j] = 0.0;
            if *used {
                continue;
            }
            if value.abs() > max_component.abs() {
                max_component = value;
                argmax_component = j;
            }
        }
        m[i * 3 + argmax_component] = sign(max_component);
        used_axes[argmax_component] = true;
    }
    DMat3::from_cols_array(&m)
}

/// Round an orientation to the nearest rotation by multiples of 90 degrees.
pub fn snap_orientation(orientation: DQuat) -> DQuat {
    let snapped = snap_rotation(DMat3::from_quat(orientation));
    DQuat::from_mat3(&snapped).normalize()
}

/// Round each component to the nearest integer multiple of `step`.
#[inline]
pub fn round_to_multiple(value: DVec3, step: DVec3) -> DVec3 {
    (value / step).round() * step
}
