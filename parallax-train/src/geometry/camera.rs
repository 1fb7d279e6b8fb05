//! Canonical camera construction for both raw encodings.
//!
//! Both paths emit the same convention: the canonical extrinsics map world
//! coordinates to camera coordinates (world-to-camera), obtained by
//! inverting the matrix each format stores.

use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::geometry::basis::camera_basis;

/// World-unit factor applied to the camera center read from the direction
/// array.
pub const CENTER_SCALE: f32 = 0.8;

/// Build the stored (pre-inversion) camera matrix for a direction-encoded
/// frame.
///
/// `direction` is the outgoing direction sampled at the principal pixel;
/// its negation is the viewing axis. `center` is the raw camera center from
/// the same array, scaled by [`CENTER_SCALE`]. The columns are
/// `[right, up, forward, -center]`: the translation column holds the
/// negated, un-rotated center directly. Invert the result to obtain the
/// canonical world-to-camera extrinsics.
pub fn camera_from_direction(direction: Vec3, center: Vec3) -> Mat4 {
    let (forward, up, right) = camera_basis(-direction);
    let center = center * CENTER_SCALE;
    Mat4::from_cols(
        right.extend(0.0),
        up.extend(0.0),
        forward.extend(0.0),
        (-center).extend(1.0),
    )
}

/// Normalized intrinsics of the direction shard format: principal point at
/// (0.5, 0.5) and focal length 0.5 on both axes. This source has no
/// per-frame intrinsic variation.
pub fn fixed_intrinsics() -> Mat3 {
    Mat3::from_cols(
        Vec3::new(0.5, 0.0, 0.0),
        Vec3::new(0.0, 0.5, 0.0),
        Vec3::new(0.5, 0.5, 1.0),
    )
}

/// Split an 18-value pose vector into canonical extrinsics and normalized
/// intrinsics.
///
/// Values 0..4 are `(fx, fy, cx, cy)` filling a normalized 3x3 K matrix;
/// values 6..18 are a row-major 3x4 block over the top rows of a 4x4 matrix
/// with identity bottom row. The stored matrix is inverted to produce the
/// canonical world-to-camera extrinsics.
pub fn convert_pose(pose: &[f32; 18]) -> (Mat4, Mat3) {
    let [fx, fy, cx, cy] = [pose[0], pose[1], pose[2], pose[3]];
    let intrinsics = Mat3::from_cols(
        Vec3::new(fx, 0.0, 0.0),
        Vec3::new(0.0, fy, 0.0),
        Vec3::new(cx, cy, 1.0),
    );

    let mut cols = [[0.0f32; 4]; 4];
    for r in 0..3 {
        for c in 0..4 {
            cols[c][r] = pose[6 + r * 4 + c];
        }
    }
    cols[3][3] = 1.0;
    let stored = Mat4::from_cols_array_2d(&cols);

    (stored.inverse(), intrinsics)
}

/// Field of view in degrees implied by a normalized intrinsic matrix, per
/// axis.
pub fn fov_degrees(intrinsics: &Mat3) -> Vec2 {
    let (fx, fy) = (intrinsics.x_axis.x, intrinsics.y_axis.y);
    let (cx, cy) = (intrinsics.z_axis.x, intrinsics.z_axis.y);
    let fov_x = (cx / fx).atan() + ((1.0 - cx) / fx).atan();
    let fov_y = (cy / fy).atan() + ((1.0 - cy) / fy).atan();
    Vec2::new(fov_x.to_degrees(), fov_y.to_degrees())
}
