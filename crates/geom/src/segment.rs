use crate::scalar::Scalar;
use crate::{LineSegment, Point};

use arrayvec::ArrayVec;

/// Maximum number of times a curve is halved while flattening it.
///
/// Bounds the output of a single curve to `2^MAX_SUBDIVISION_DEPTH` line segments
/// even for pathological inputs.
pub const MAX_SUBDIVISION_DEPTH: u32 = 16;

const STACK_CAPACITY: usize = MAX_SUBDIVISION_DEPTH as usize + 2;

/// Common APIs to segment types.
pub trait Segment: Copy + Sized {
    type Scalar: Scalar;

    /// Start of the curve.
    fn from(&self) -> Point<Self::Scalar>;

    /// End of the curve.
    fn to(&self) -> Point<Self::Scalar>;

    /// Sample the curve at t (expecting t between 0 and 1).
    fn sample(&self, t: Self::Scalar) -> Point<Self::Scalar>;

    /// Split this curve into two sub-curves.
    fn split(&self, t: Self::Scalar) -> (Self, Self);

    /// Returns true if the whole curve is within `tolerance` of the line segment
    /// joining its endpoints.
    fn is_linear(&self, tolerance: Self::Scalar) -> bool;

    /// Approximates the curve with a sequence of line segments, invoking a callback
    /// for each of them in order.
    ///
    /// The curve is recursively split in half until each piece passes `is_linear`.
    /// The first segment starts at `self.from()` and the last one ends exactly at
    /// `self.to()`.
    fn for_each_flattened<F>(&self, tolerance: Self::Scalar, callback: &mut F)
    where
        F: FnMut(&LineSegment<Self::Scalar>),
    {
        let mut stack: ArrayVec<(Self, u32), STACK_CAPACITY> = ArrayVec::new();
        stack.push((*self, 0));

        let mut from = self.from();
        while let Some((segment, depth)) = stack.pop() {
            if depth >= MAX_SUBDIVISION_DEPTH || segment.is_linear(tolerance) {
                let to = segment.to();
                callback(&LineSegment { from, to });
                from = to;
                continue;
            }

            let (first, second) = segment.split(Self::Scalar::HALF);
            // Last in, first out: the first half must be on top.
            stack.push((second, depth + 1));
            stack.push((first, depth + 1));
        }
    }
}
