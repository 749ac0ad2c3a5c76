//! Helpers for approximating circular arcs.

use crate::scalar::Scalar;

/// Returns the largest angle (in radians) an arc of the given radius can span while
/// staying within `tolerance` of its chord.
pub fn arc_flattening_step<S: Scalar>(radius: S, tolerance: S) -> S {
    // Clamp the tolerance to avoid a NaN when it is large compared to the radius.
    let tolerance = S::min(tolerance, radius);
    if radius <= S::ZERO {
        return S::PI();
    }

    S::TWO * S::acos(S::ONE - tolerance / radius)
}

/// Number of line segments used to approximate an arc of `sweep` radians.
///
/// Always at least one.
pub fn arc_segment_count<S: Scalar>(radius: S, sweep: S, tolerance: S) -> u32 {
    let step = arc_flattening_step(radius, tolerance);
    let count = (S::abs(sweep) / step).ceil();

    num_traits::cast::<S, u32>(count).unwrap_or(1).max(1)
}

#[test]
fn arc_step_respects_tolerance() {
    let radius = 50.0f32;
    let tolerance = 0.1;
    let step = arc_flattening_step(radius, tolerance);
    // Sagitta of the chord spanning `step`.
    let sagitta = radius * (1.0 - (step * 0.5).cos());
    assert!(sagitta <= tolerance * 1.001);

    assert_eq!(arc_segment_count(10.0f32, 0.0, 0.1), 1);
    assert!(arc_segment_count(10.0f32, core::f32::consts::PI, 0.01) > arc_segment_count(10.0f32, core::f32::consts::PI, 1.0));
}

#[test]
fn huge_tolerance_does_not_produce_nan() {
    let step = arc_flattening_step(1.0f32, 10.0);
    assert!(step.is_finite());
    assert_eq!(arc_segment_count(1.0f32, core::f32::consts::PI * 2.0, 10.0), 2);
}
