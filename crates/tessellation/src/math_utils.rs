//! Vector helpers for the stroke tessellator.

use crate::math::*;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// The normal on the left of a direction, in a y-up coordinate system.
#[inline]
pub(crate) fn left_normal(v: Vector) -> Vector {
    vector(-v.y, v.x)
}

/// Computes the miter normal at a point P such that `x ---v1---> P ---v2---> x`.
///
/// v1 and v2 are expected to be normalized. The result points towards the positive
/// side of v1 and is scaled so that its projection on the normal of either segment is
/// 1: offsetting P by `w * n` lands on the intersection of both segments offset by `w`.
///
/// Returns `None` when the path turns back on itself, where no such point exists.
pub(crate) fn compute_normal(v1: Vector, v2: Vector) -> Option<Vector> {
    let sum = left_normal(v1) + left_normal(v2);
    let square_length = sum.square_length();

    // |n1 + n2|^2 = 2 + 2 cos(angle between the segments)
    if square_length < 1e-6 {
        return None;
    }

    Some(sum * (2.0 / square_length))
}

/// Rotates a vector counter-clockwise (in a y-up coordinate system) by an angle in
/// radians.
#[inline]
pub(crate) fn rotate(v: Vector, angle: f32) -> Vector {
    let (sin, cos) = angle.sin_cos();
    vector(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Signed angle from `a` to `b`, in `[-PI, PI]`.
#[inline]
pub(crate) fn angle_between(a: Vector, b: Vector) -> f32 {
    a.cross(b).atan2(a.dot(b))
}

#[cfg(test)]
fn assert_almost_eq(a: Vector, b: Vector) {
    if (a - b).square_length() > 0.00001 {
        panic!("assert almost equal: {:?} != {:?}", a, b);
    }
}

#[test]
fn miter_normals() {
    let normal = |a, b| compute_normal(a, b).unwrap();

    assert_almost_eq(normal(vector(1.0, 0.0), vector(0.0, 1.0)), vector(-1.0, 1.0));
    assert_almost_eq(normal(vector(1.0, 0.0), vector(0.0, -1.0)), vector(1.0, 1.0));
    assert_almost_eq(normal(vector(1.0, 0.0), vector(1.0, 0.0)), vector(0.0, 1.0));

    let v1 = vector(1.0, 0.0);
    let v2 = vector(-1.0, 1.0).normalize();
    let m = normal(v1, v2);
    assert!((m.dot(left_normal(v1)) - 1.0).abs() < 1e-5);
    assert!((m.dot(left_normal(v2)) - 1.0).abs() < 1e-5);

    assert_eq!(compute_normal(vector(1.0, 0.0), vector(-1.0, 0.0)), None);
}

#[test]
fn rotations() {
    use core::f32::consts::{FRAC_PI_2, PI};

    assert_almost_eq(rotate(vector(1.0, 0.0), FRAC_PI_2), vector(0.0, 1.0));
    assert_almost_eq(rotate(vector(0.0, 2.0), PI), vector(0.0, -2.0));
    assert!((angle_between(vector(1.0, 0.0), vector(0.0, 1.0)) - FRAC_PI_2).abs() < 1e-6);
    assert!((angle_between(vector(0.0, 1.0), vector(1.0, 0.0)) + FRAC_PI_2).abs() < 1e-6);
}
