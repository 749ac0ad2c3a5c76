use crate::scalar::Scalar;
use crate::segment::Segment;
use crate::{LineSegment, Point, Vector};

/// A 2d curve segment defined by four points: the beginning of the segment, two control
/// points and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)³ * from + 3 * (1 - t)² * t * ctrl1 + 3 * t² * (1 - t) * ctrl2 + t³ * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CubicBezierSegment<S> {
    pub from: Point<S>,
    pub ctrl1: Point<S>,
    pub ctrl2: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> CubicBezierSegment<S> {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: S) -> Point<S> {
        let t2 = t * t;
        let t3 = t2 * t;
        let one_t = S::ONE - t;
        let one_t2 = one_t * one_t;
        let one_t3 = one_t2 * one_t;

        self.from * one_t3
            + self.ctrl1.to_vector() * S::THREE * one_t2 * t
            + self.ctrl2.to_vector() * S::THREE * one_t * t2
            + self.to.to_vector() * t3
    }

    /// Sample the curve's derivative at t (expecting t between 0 and 1).
    pub fn derivative(&self, t: S) -> Vector<S> {
        let one_t = S::ONE - t;

        (self.ctrl1 - self.from) * (S::THREE * one_t * one_t)
            + (self.ctrl2 - self.ctrl1) * (S::TWO * S::THREE * one_t * t)
            + (self.to - self.ctrl2) * (S::THREE * t * t)
    }

    /// Split this curve into two sub-curves.
    pub fn split(&self, t: S) -> (CubicBezierSegment<S>, CubicBezierSegment<S>) {
        let ctrl1a = self.from.lerp(self.ctrl1, t);
        let ctrl2a = self.ctrl1.lerp(self.ctrl2, t);
        let ctrl3a = self.ctrl2.lerp(self.to, t);
        let ctrl1aa = ctrl1a.lerp(ctrl2a, t);
        let ctrl2aa = ctrl2a.lerp(ctrl3a, t);
        let split_point = ctrl1aa.lerp(ctrl2aa, t);

        (
            CubicBezierSegment {
                from: self.from,
                ctrl1: ctrl1a,
                ctrl2: ctrl1aa,
                to: split_point,
            },
            CubicBezierSegment {
                from: split_point,
                ctrl1: ctrl2aa,
                ctrl2: ctrl3a,
                to: self.to,
            },
        )
    }

    #[inline]
    pub fn baseline(&self) -> LineSegment<S> {
        LineSegment {
            from: self.from,
            to: self.to,
        }
    }

    /// Returns true if the curve can be approximated with a single line segment
    /// given a tolerance threshold.
    pub fn is_linear(&self, tolerance: S) -> bool {
        let baseline = self.to - self.from;
        let v1 = self.ctrl1 - self.from;
        let v2 = self.ctrl2 - self.from;
        let threshold = tolerance * tolerance;

        let len2 = baseline.square_length();
        if len2 <= S::EPSILON * S::EPSILON {
            // Closed loop: measure against the endpoint instead of a degenerate baseline.
            let f = S::THREE / S::FOUR;
            return v1.square_length() * f * f <= threshold
                && v2.square_length() * f * f <= threshold;
        }

        // Keep the signs of the cross products to get a tighter bound when both
        // control points are on the same side of the baseline.
        let c1 = baseline.cross(v1);
        let c2 = baseline.cross(v2);
        let d1 = c1 * c1 / len2;
        let d2 = c2 * c2 / len2;

        let factor = if c1 * c2 > S::ZERO {
            S::THREE / S::FOUR
        } else {
            S::FOUR / S::NINE
        };
        let f2 = factor * factor;

        d1 * f2 <= threshold && d2 * f2 <= threshold
    }

    /// Approximates the curve with sequence of line segments, invoking a callback at
    /// each step.
    ///
    /// The `tolerance` parameter defines the maximum distance between the curve and
    /// its approximation.
    pub fn for_each_flattened<F>(&self, tolerance: S, callback: &mut F)
    where
        F: FnMut(&LineSegment<S>),
    {
        <Self as Segment>::for_each_flattened(self, tolerance, callback);
    }
}

impl<S: Scalar> Segment for CubicBezierSegment<S> {
    type Scalar = S;

    fn from(&self) -> Point<S> {
        self.from
    }

    fn to(&self) -> Point<S> {
        self.to
    }

    fn sample(&self, t: S) -> Point<S> {
        self.sample(t)
    }

    fn split(&self, t: S) -> (Self, Self) {
        self.split(t)
    }

    fn is_linear(&self, tolerance: S) -> bool {
        self.is_linear(tolerance)
    }
}

#[cfg(test)]
use crate::point;

#[test]
fn split_halves_meet_on_the_curve() {
    let curve = CubicBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl1: point(0.0, 10.0),
        ctrl2: point(10.0, 10.0),
        to: point(10.0, 0.0),
    };

    for &t in &[0.25f32, 0.5, 0.8] {
        let (a, b) = curve.split(t);
        assert!((a.to - curve.sample(t)).length() < 1e-5);
        assert_eq!(a.to, b.from);
        assert_eq!(a.from, curve.from);
        assert_eq!(b.to, curve.to);
    }
}

#[test]
fn flattening_stays_within_tolerance() {
    let curve = CubicBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl1: point(0.0, 100.0),
        ctrl2: point(100.0, -100.0),
        to: point(100.0, 0.0),
    };

    for &tolerance in &[0.05f32, 0.25, 2.0] {
        let mut segments = std::vec::Vec::new();
        curve.for_each_flattened(tolerance, &mut |s| segments.push(*s));

        assert_eq!(segments.first().unwrap().from, curve.from);
        assert_eq!(segments.last().unwrap().to, curve.to);

        for i in 0..=200 {
            let p = curve.sample(i as f32 / 200.0);
            let d = segments
                .iter()
                .map(|s| s.distance_to_point(p))
                .fold(f32::MAX, f32::min);
            assert!(d <= tolerance * 1.01, "{} > {}", d, tolerance);
        }
    }
}

#[test]
fn degenerate_curves_do_not_explode() {
    let a_point = CubicBezierSegment {
        from: point(1.0f32, 1.0),
        ctrl1: point(1.0, 1.0),
        ctrl2: point(1.0, 1.0),
        to: point(1.0, 1.0),
    };

    let mut count = 0;
    a_point.for_each_flattened(0.1, &mut |_| count += 1);
    assert_eq!(count, 1);

    let loop_back = CubicBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl1: point(10.0, 10.0),
        ctrl2: point(-10.0, 10.0),
        to: point(0.0, 0.0),
    };

    let mut count = 0;
    loop_back.for_each_flattened(0.1, &mut |_| count += 1);
    assert!(count > 2);
    assert!(count < 1 << 10);
}

#[test]
fn derivative_at_endpoints() {
    let curve = CubicBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl1: point(1.0, 0.0),
        ctrl2: point(2.0, 1.0),
        to: point(2.0, 2.0),
    };

    assert_eq!(curve.derivative(0.0), Vector::new(3.0, 0.0));
    assert_eq!(curve.derivative(1.0), Vector::new(0.0, 3.0));
}
