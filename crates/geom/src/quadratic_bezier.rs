use crate::scalar::Scalar;
use crate::segment::Segment;
use crate::{LineSegment, Point, Vector};

/// A 2d curve segment defined by three points: the beginning of the segment, a control
/// point and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)² * from + 2 * (1 - t) * t * ctrl + t² * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct QuadraticBezierSegment<S> {
    pub from: Point<S>,
    pub ctrl: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> QuadraticBezierSegment<S> {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: S) -> Point<S> {
        let t2 = t * t;
        let one_t = S::ONE - t;
        let one_t2 = one_t * one_t;

        self.from * one_t2 + self.ctrl.to_vector() * S::TWO * one_t * t + self.to.to_vector() * t2
    }

    /// Sample the curve's derivative at t (expecting t between 0 and 1).
    pub fn derivative(&self, t: S) -> Vector<S> {
        let v0 = self.ctrl - self.from;
        let v1 = self.to - self.ctrl;

        v0.lerp(v1, t) * S::TWO
    }

    /// Split this curve into two sub-curves.
    pub fn split(&self, t: S) -> (QuadraticBezierSegment<S>, QuadraticBezierSegment<S>) {
        let split_point = self.sample(t);

        (
            QuadraticBezierSegment {
                from: self.from,
                ctrl: self.from.lerp(self.ctrl, t),
                to: split_point,
            },
            QuadraticBezierSegment {
                from: split_point,
                ctrl: self.ctrl.lerp(self.to, t),
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
    ///
    /// The curve never strays further from its baseline than half of the control
    /// point's distance to it.
    pub fn is_linear(&self, tolerance: S) -> bool {
        let baseline = self.to - self.from;
        let len2 = baseline.square_length();
        let threshold = tolerance * tolerance * S::FOUR;

        if len2 <= S::EPSILON * S::EPSILON {
            return (self.ctrl - self.from).square_length() <= threshold;
        }

        let c = baseline.cross(self.ctrl - self.from);

        c * c / len2 <= threshold
    }

    /// Approximates the curve with sequence of line segments, invoking a callback at
    /// each step.
    pub fn for_each_flattened<F>(&self, tolerance: S, callback: &mut F)
    where
        F: FnMut(&LineSegment<S>),
    {
        <Self as Segment>::for_each_flattened(self, tolerance, callback);
    }
}

impl<S: Scalar> Segment for QuadraticBezierSegment<S> {
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
fn split_matches_sample() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(5.0, 10.0),
        to: point(10.0, 0.0),
    };

    let (a, b) = curve.split(0.5);
    assert_eq!(a.from, curve.from);
    assert_eq!(b.to, curve.to);
    assert_eq!(a.to, curve.sample(0.5));
    assert_eq!(b.from, curve.sample(0.5));
    assert!((a.sample(0.5) - curve.sample(0.25)).length() < 1e-5);
}

#[test]
fn flattening_stays_within_tolerance() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(50.0, 100.0),
        to: point(100.0, 0.0),
    };

    for &tolerance in &[0.01f32, 0.1, 1.0] {
        let mut segments = std::vec::Vec::new();
        curve.for_each_flattened(tolerance, &mut |s| segments.push(*s));

        assert!(segments.len() > 1);
        assert_eq!(segments.first().unwrap().from, curve.from);
        assert_eq!(segments.last().unwrap().to, curve.to);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }

        // Every sampled point of the curve is close to the polyline.
        for i in 0..=100 {
            let p = curve.sample(i as f32 / 100.0);
            let d = segments
                .iter()
                .map(|s| s.distance_to_point(p))
                .fold(f32::MAX, f32::min);
            assert!(d <= tolerance * 1.01, "{} > {}", d, tolerance);
        }
    }
}

#[test]
fn flat_curve_is_a_single_segment() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(5.0, 0.01),
        to: point(10.0, 0.0),
    };

    let mut count = 0;
    curve.for_each_flattened(0.1, &mut |_| count += 1);
    assert_eq!(count, 1);
}

#[test]
fn smaller_tolerance_means_more_segments() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(0.0, 100.0),
        to: point(100.0, 100.0),
    };

    let mut coarse = 0;
    let mut fine = 0;
    curve.for_each_flattened(1.0, &mut |_| coarse += 1);
    curve.for_each_flattened(0.01, &mut |_| fine += 1);
    assert!(fine > coarse);
}
