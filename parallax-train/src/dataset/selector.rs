//! View selection adapter
//!
//! Wraps the externally supplied view-selection policy: validates its
//! output, applies the optional fixed context override, and enforces the
//! field-of-view cap. All failures here are per-scene recoverable.

use glam::{Mat3, Mat4};

use crate::error::SelectionError;
use crate::geometry::fov_degrees;

/// The context/target split chosen for one scene. Both lists index into the
/// scene's frame sequence; overlap is policy-defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSplit {
    pub context: Vec<usize>,
    pub target: Vec<usize>,
}

/// External view-selection policy. May be deterministic or randomized per
/// call.
pub trait ViewSelector {
    /// Choose context and target frames for a scene, or fail with
    /// [`SelectionError::InsufficientFrames`] when the scene is too short.
    fn select(
        &self,
        scene: &str,
        extrinsics: &[Mat4],
        intrinsics: &[Mat3],
    ) -> Result<ViewSplit, SelectionError>;
}

/// Run the policy for one scene and validate the result.
///
/// `override_context`, when set, replaces the policy's context indices
/// verbatim. Every retained index must be in range, and every retained
/// frame's field of view must stay under `max_fov_degrees`.
pub fn select_views(
    policy: &dyn ViewSelector,
    scene: &str,
    extrinsics: &[Mat4],
    intrinsics: &[Mat3],
    max_fov_degrees: f32,
    override_context: Option<&[usize]>,
) -> Result<ViewSplit, SelectionError> {
    let mut split = policy.select(scene, extrinsics, intrinsics)?;
    if let Some(context) = override_context {
        split.context = context.to_vec();
    }

    let frames = extrinsics.len();
    for &index in split.context.iter().chain(&split.target) {
        if index >= frames {
            return Err(SelectionError::IndexOutOfRange { index, frames });
        }
    }

    for &index in split.context.iter().chain(&split.target) {
        let fov = fov_degrees(&intrinsics[index]);
        let widest = fov.x.max(fov.y);
        if widest > max_fov_degrees {
            return Err(SelectionError::FovTooWide {
                fov: widest,
                max: max_fov_degrees,
            });
        }
    }

    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::fixed_intrinsics;
    use glam::Vec3;

    /// Policy returning fixed index lists once enough frames exist.
    struct FixedSelector {
        pub context: Vec<usize>,
        pub target: Vec<usize>,
        pub min_frames: usize,
    }

    impl ViewSelector for FixedSelector {
        fn select(
            &self,
            _scene: &str,
            extrinsics: &[Mat4],
            _intrinsics: &[Mat3],
        ) -> Result<ViewSplit, SelectionError> {
            if extrinsics.len() < self.min_frames {
                return Err(SelectionError::InsufficientFrames {
                    available: extrinsics.len(),
                    required: self.min_frames,
                });
            }
            Ok(ViewSplit {
                context: self.context.clone(),
                target: self.target.clone(),
            })
        }
    }

    fn cameras(n: usize) -> (Vec<Mat4>, Vec<Mat3>) {
        (vec![Mat4::IDENTITY; n], vec![fixed_intrinsics(); n])
    }

    #[test]
    fn test_policy_output_respected() {
        let policy = FixedSelector {
            context: vec![0, 1],
            target: vec![2],
            min_frames: 3,
        };
        let (extr, intr) = cameras(4);
        let split = select_views(&policy, "s", &extr, &intr, 100.0, None).unwrap();
        assert_eq!(split.context, vec![0, 1]);
        assert_eq!(split.target, vec![2]);
    }

    #[test]
    fn test_context_override() {
        let policy = FixedSelector {
            context: vec![0, 1],
            target: vec![2],
            min_frames: 3,
        };
        let (extr, intr) = cameras(4);
        let split = select_views(&policy, "s", &extr, &intr, 100.0, Some(&[3, 2])).unwrap();
        assert_eq!(split.context, vec![3, 2]);
    }

    #[test]
    fn test_out_of_range_override_rejected() {
        let policy = FixedSelector {
            context: vec![0, 1],
            target: vec![2],
            min_frames: 3,
        };
        let (extr, intr) = cameras(4);
        assert!(matches!(
            select_views(&policy, "s", &extr, &intr, 100.0, Some(&[9])),
            Err(SelectionError::IndexOutOfRange { index: 9, frames: 4 })
        ));
    }

    #[test]
    fn test_insufficient_frames_propagates() {
        let policy = FixedSelector {
            context: vec![],
            target: vec![],
            min_frames: 5,
        };
        let (extr, intr) = cameras(2);
        assert!(matches!(
            select_views(&policy, "s", &extr, &intr, 100.0, None),
            Err(SelectionError::InsufficientFrames { available: 2, required: 5 })
        ));
    }

    #[test]
    fn test_fov_cap_rejects_wide_frame() {
        let policy = FixedSelector {
            context: vec![0, 1],
            target: vec![2],
            min_frames: 3,
        };
        let (extr, mut intr) = cameras(4);
        // Frame 2 gets a lens implying roughly 170 degrees horizontally.
        intr[2] = Mat3::from_cols(
            Vec3::new(0.0437, 0.0, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(0.5, 0.5, 1.0),
        );
        assert!(matches!(
            select_views(&policy, "s", &extr, &intr, 150.0, None),
            Err(SelectionError::FovTooWide { .. })
        ));
    }

    #[test]
    fn test_fov_under_cap_accepted() {
        let policy = FixedSelector {
            context: vec![0],
            target: vec![1],
            min_frames: 2,
        };
        let (extr, intr) = cameras(2);
        // Fixed intrinsics imply 90 degrees, under a 150 degree cap.
        assert!(select_views(&policy, "s", &extr, &intr, 150.0, None).is_ok());
    }
}
