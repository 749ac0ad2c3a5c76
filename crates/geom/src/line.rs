use crate::scalar::Scalar;
use crate::segment::Segment;
use crate::{Box2D, Point, Vector};

/// A linear segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LineSegment<S> {
    pub from: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> LineSegment<S> {
    /// Sample the segment at t (expecting t between 0 and 1).
    #[inline]
    pub fn sample(&self, t: S) -> Point<S> {
        self.from.lerp(self.to, t)
    }

    #[inline]
    pub fn to_vector(&self) -> Vector<S> {
        self.to - self.from
    }

    #[inline]
    pub fn length(&self) -> S {
        self.to_vector().length()
    }

    #[inline]
    pub fn square_length(&self) -> S {
        self.to_vector().square_length()
    }

    /// Returns an inverted version of this segment where the beginning and the end
    /// points are swapped.
    #[inline]
    pub fn flip(&self) -> Self {
        LineSegment {
            from: self.to,
            to: self.from,
        }
    }

    pub fn solve_t_for_y(&self, y: S) -> S {
        let dy = self.to.y - self.from.y;
        if dy == S::ZERO {
            return S::ZERO;
        }

        (y - self.from.y) / dy
    }

    /// Returns the x coordinate of the segment's supporting line at a given y.
    ///
    /// Horizontal segments return the x coordinate of their start.
    pub fn solve_x_for_y(&self, y: S) -> S {
        let t = self.solve_t_for_y(y);
        self.from.x * (S::ONE - t) + self.to.x * t
    }

    #[inline]
    pub fn bounding_box(&self) -> Box2D<S> {
        Box2D {
            min: self.from.min(self.to),
            max: self.from.max(self.to),
        }
    }

    /// Computes the intersection (if any) between this segment and another one.
    ///
    /// The result is provided in the form of the `t` parameter of each
    /// segment. Parallel and collinear segments never intersect in this sense.
    pub fn intersection_t(&self, other: &Self) -> Option<(S, S)> {
        let v1 = self.to_vector();
        let v2 = other.to_vector();

        let v1_cross_v2 = v1.cross(v2);
        if v1_cross_v2 == S::ZERO {
            return None;
        }

        let sign = S::signum(v1_cross_v2);
        let denom = S::abs(v1_cross_v2);

        let v3 = other.from - self.from;

        // Defer the division to keep precision, carrying the sign in the numerators.
        let t = v3.cross(v2) * sign;
        let u = v3.cross(v1) * sign;

        if t < S::ZERO || t > denom || u < S::ZERO || u > denom {
            return None;
        }

        Some((t / denom, u / denom))
    }

    #[inline]
    pub fn intersection(&self, other: &Self) -> Option<Point<S>> {
        self.intersection_t(other).map(|(t, _)| self.sample(t))
    }

    /// Computes the closest point on this segment to `p`.
    pub fn closest_point(&self, p: Point<S>) -> Point<S> {
        let v1 = self.to - self.from;
        let len2 = v1.square_length();
        if len2 == S::ZERO {
            return self.from;
        }

        let v2 = p - self.from;
        let t = S::min(S::max(v2.dot(v1) / len2, S::ZERO), S::ONE);

        self.from + v1 * t
    }

    /// Computes the squared distance between this segment and a point.
    #[inline]
    pub fn square_distance_to_point(&self, p: Point<S>) -> S {
        (self.closest_point(p) - p).square_length()
    }

    #[inline]
    pub fn distance_to_point(&self, p: Point<S>) -> S {
        self.square_distance_to_point(p).sqrt()
    }

    #[inline]
    pub fn to_f32(&self) -> LineSegment<f32> {
        LineSegment {
            from: self.from.to_f32(),
            to: self.to.to_f32(),
        }
    }

    #[inline]
    pub fn to_f64(&self) -> LineSegment<f64> {
        LineSegment {
            from: self.from.to_f64(),
            to: self.to.to_f64(),
        }
    }
}

impl<S: Scalar> Segment for LineSegment<S> {
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
        let split_point = self.sample(t);
        (
            LineSegment {
                from: self.from,
                to: split_point,
            },
            LineSegment {
                from: split_point,
                to: self.to,
            },
        )
    }

    fn is_linear(&self, _tolerance: S) -> bool {
        true
    }
}

#[test]
fn intersection_rotated() {
    use crate::point;

    let l1 = LineSegment {
        from: point(-10.0f64, 0.0),
        to: point(10.0, 0.0),
    };
    let l2 = LineSegment {
        from: point(0.0f64, -5.0),
        to: point(0.0, 5.0),
    };

    let (t1, t2) = l1.intersection_t(&l2).unwrap();
    assert!((t1 - 0.5).abs() < 1e-9);
    assert!((t2 - 0.5).abs() < 1e-9);
    assert_eq!(l1.intersection(&l2), Some(point(0.0, 0.0)));
}

#[test]
fn parallel_segments_do_not_intersect() {
    use crate::point;

    let l1 = LineSegment {
        from: point(0.0f32, 0.0),
        to: point(10.0, 0.0),
    };
    let l2 = LineSegment {
        from: point(0.0f32, 1.0),
        to: point(10.0, 1.0),
    };
    let l3 = LineSegment {
        from: point(5.0f32, 0.0),
        to: point(15.0, 0.0),
    };

    assert!(l1.intersection_t(&l2).is_none());
    assert!(l1.intersection_t(&l3).is_none());
}

#[test]
fn disjoint_segments() {
    use crate::point;

    let l1 = LineSegment {
        from: point(0.0f32, 0.0),
        to: point(1.0, 1.0),
    };
    let l2 = LineSegment {
        from: point(3.0f32, 0.0),
        to: point(2.0, 1.0),
    };

    assert!(l1.intersection_t(&l2).is_none());
}

#[test]
fn solve_x_for_y_on_slanted_segment() {
    use crate::point;

    let l = LineSegment {
        from: point(0.0f32, 0.0),
        to: point(4.0, 8.0),
    };

    assert_eq!(l.solve_x_for_y(4.0), 2.0);
    assert_eq!(l.solve_x_for_y(0.0), 0.0);
    assert_eq!(l.solve_x_for_y(8.0), 4.0);
}

#[test]
fn line_is_never_subdivided() {
    use crate::point;

    let l = LineSegment {
        from: point(0.0f32, 0.0),
        to: point(1000.0, 3.0),
    };

    for tolerance in [0.0001, 0.1, 10.0] {
        let mut segments = std::vec::Vec::new();
        l.for_each_flattened(tolerance, &mut |s| segments.push(*s));
        assert_eq!(segments, std::vec![l]);
    }
}
