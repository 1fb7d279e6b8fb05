//! Camera geometry reconstruction
//!
//! Converts the two raw shard encodings into one canonical camera model:
//! 4x4 world-to-camera extrinsics and a 3x3 normalized intrinsic matrix.
//!
//! - [`basis`]: orthonormal viewing basis from a direction sample
//! - [`camera`]: full camera construction for both encodings, plus
//!   field-of-view computation

pub mod basis;
pub mod camera;

pub use basis::camera_basis;
pub use camera::{CENTER_SCALE, camera_from_direction, convert_pose, fixed_intrinsics, fov_degrees};
