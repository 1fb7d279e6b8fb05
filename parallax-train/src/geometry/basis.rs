//! Orthonormal viewing basis from a forward direction

use glam::Vec3;

/// Tolerance for detecting a forward axis parallel to the up reference.
const POLE_EPS: f32 = 1e-6;

/// Derive a right-handed orthonormal `(forward, up, right)` basis from a
/// viewing direction.
///
/// The world up reference is `+Z`; `right = normalize(forward x up_ref)` and
/// `up = normalize(forward x right)`. When `forward` is within [`POLE_EPS`]
/// of being parallel to `+Z` the cross product degenerates, so the reference
/// falls back to `+Y` and the basis stays orthonormal instead of collapsing
/// to NaN.
pub fn camera_basis(forward: Vec3) -> (Vec3, Vec3, Vec3) {
    let forward = forward.normalize();
    let up_ref = if forward.z.abs() > 1.0 - POLE_EPS {
        Vec3::Y
    } else {
        Vec3::Z
    };
    let right = forward.cross(up_ref).normalize();
    let up = forward.cross(right).normalize();
    (forward, up, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_orthonormal(forward: Vec3, up: Vec3, right: Vec3) {
        assert_relative_eq!(forward.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(up.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(right.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(forward.dot(up), 0.0, epsilon = 1e-5);
        assert_relative_eq!(forward.dot(right), 0.0, epsilon = 1e-5);
        assert_relative_eq!(up.dot(right), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_basis_orthonormal_generic() {
        for dir in [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.3, -0.7, 0.2),
            Vec3::new(-2.0, 5.0, 1.0),
            Vec3::new(0.0, 1.0, -1.0),
        ] {
            let (forward, up, right) = camera_basis(dir);
            assert_orthonormal(forward, up, right);
            assert_relative_eq!(forward.dot(dir.normalize()), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_basis_right_handed() {
        let (forward, up, right) = camera_basis(Vec3::new(0.2, 0.9, 0.1));
        // Columns [right, up, forward] must form a rotation, not a reflection.
        let det = right.cross(up).dot(forward);
        assert_relative_eq!(det, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_basis_pole_aligned_guarded() {
        // Forward exactly parallel to the +Z reference: the fallback
        // reference keeps the basis finite and orthonormal.
        for dir in [Vec3::Z, -Vec3::Z] {
            let (forward, up, right) = camera_basis(dir);
            assert!(forward.is_finite() && up.is_finite() && right.is_finite());
            assert_orthonormal(forward, up, right);
        }
    }

    #[test]
    fn test_basis_near_pole_guarded() {
        let (forward, up, right) = camera_basis(Vec3::new(1e-8, 0.0, 1.0));
        assert!(up.is_finite() && right.is_finite());
        assert_orthonormal(forward, up, right);
    }
}
