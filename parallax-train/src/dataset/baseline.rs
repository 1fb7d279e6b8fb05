//! Baseline normalization
//!
//! Rescales the world so the two context cameras sit exactly unit distance
//! apart, keeping near/far bounds consistent with the rescaled geometry.

use glam::Mat4;

use crate::error::SelectionError;

/// Rescale every view's translation by the context baseline distance.
///
/// Applies only when exactly two context views are selected and
/// normalization is enabled; otherwise the scale is 1 and nothing changes.
/// A baseline below `epsilon` means the scene has too little parallax to be
/// a useful training signal and is rejected.
///
/// Returns the scale that was divided out.
pub fn normalize_baseline(
    extrinsics: &mut [Mat4],
    context: &[usize],
    enabled: bool,
    epsilon: f32,
) -> Result<f32, SelectionError> {
    if !enabled || context.len() != 2 {
        return Ok(1.0);
    }

    let a = extrinsics[context[0]].w_axis.truncate();
    let b = extrinsics[context[1]].w_axis.truncate();
    let scale = (a - b).length();
    if scale < epsilon {
        return Err(SelectionError::InsufficientBaseline { baseline: scale });
    }

    for e in extrinsics.iter_mut() {
        let t = e.w_axis.truncate() / scale;
        e.w_axis = t.extend(1.0);
    }
    Ok(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec3;

    fn camera_at(t: Vec3) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        m.w_axis = t.extend(1.0);
        m
    }

    #[test]
    fn test_unit_baseline_after_normalization() {
        let mut extrinsics = vec![
            camera_at(Vec3::new(0.0, 0.0, 0.0)),
            camera_at(Vec3::new(2.0, 0.0, 0.0)),
            camera_at(Vec3::new(4.0, 2.0, 0.0)),
        ];
        let scale = normalize_baseline(&mut extrinsics, &[0, 1], true, 0.01).unwrap();

        assert_relative_eq!(scale, 2.0);
        let a = extrinsics[0].w_axis.truncate();
        let b = extrinsics[1].w_axis.truncate();
        assert_relative_eq!(a.x, 0.0);
        assert_relative_eq!(b.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!((a - b).length(), 1.0, epsilon = 1e-6);
        // Target translations divide by the same scale.
        let c = extrinsics[2].w_axis.truncate();
        assert_relative_eq!(c.x, 2.0, epsilon = 1e-6);
        assert_relative_eq!(c.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_insufficient_baseline_rejected() {
        let mut extrinsics = vec![
            camera_at(Vec3::ZERO),
            camera_at(Vec3::new(0.001, 0.0, 0.0)),
        ];
        match normalize_baseline(&mut extrinsics, &[0, 1], true, 0.01) {
            Err(SelectionError::InsufficientBaseline { baseline }) => {
                assert_relative_eq!(baseline, 0.001, epsilon = 1e-6);
            }
            other => panic!("expected InsufficientBaseline, got {other:?}"),
        }
    }

    #[test]
    fn test_disabled_is_noop() {
        let mut extrinsics = vec![camera_at(Vec3::ZERO), camera_at(Vec3::new(2.0, 0.0, 0.0))];
        let scale = normalize_baseline(&mut extrinsics, &[0, 1], false, 0.01).unwrap();
        assert_eq!(scale, 1.0);
        assert_relative_eq!(extrinsics[1].w_axis.x, 2.0);
    }

    #[test]
    fn test_non_pair_context_is_noop() {
        let mut extrinsics = vec![
            camera_at(Vec3::ZERO),
            camera_at(Vec3::new(2.0, 0.0, 0.0)),
            camera_at(Vec3::new(5.0, 0.0, 0.0)),
        ];
        let scale = normalize_baseline(&mut extrinsics, &[0, 1, 2], true, 0.01).unwrap();
        assert_eq!(scale, 1.0);
        assert_relative_eq!(extrinsics[2].w_axis.x, 5.0);
    }
}
