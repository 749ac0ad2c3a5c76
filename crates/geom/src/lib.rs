#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::excessive_precision)]
#![allow(clippy::many_single_char_names)]
#![no_std]

//! 2D line segment and bézier curve primitives on top of euclid.
//!
//! This crate is reexported in [pathmesh](https://docs.rs/pathmesh/).
//!
//! # Flattening
//!
//! Flattening is the action of approximating a curve with a succession of line segments.
//!
//! The tolerance threshold taken as input by the flattening algorithms corresponds
//! to the maximum distance between the curve and its linear approximation.
//! The smaller the tolerance is, the more precise the approximation and the more segments
//! are generated.
//!
//! Curves are flattened by adaptive subdivision: a curve is split in half until each
//! piece is within the tolerance of its chord. Line segments are never subdivided.

#[cfg(any(test, feature = "std"))]
extern crate std;

// Reexport dependencies.
pub use arrayvec;
pub use euclid;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod cubic_bezier;
mod line;
pub mod quadratic_bezier;
mod segment;
pub mod utils;

#[doc(inline)]
pub use crate::cubic_bezier::CubicBezierSegment;
#[doc(inline)]
pub use crate::line::LineSegment;
#[doc(inline)]
pub use crate::quadratic_bezier::QuadraticBezierSegment;
#[doc(inline)]
pub use crate::segment::Segment;

pub use crate::scalar::Scalar;

mod scalar {
    pub(crate) use num_traits::{Float, FloatConst, NumCast};

    use core::fmt::{Debug, Display};
    use core::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

    /// Floating point types the segments can be expressed in.
    pub trait Scalar:
        Float + NumCast + FloatConst + Display + Debug + AddAssign + SubAssign + MulAssign + DivAssign
    {
        const ZERO: Self;
        const HALF: Self;
        const ONE: Self;
        const TWO: Self;
        const THREE: Self;
        const FOUR: Self;
        const NINE: Self;

        /// Threshold under which lengths and parameters are treated as zero.
        const EPSILON: Self;
    }

    macro_rules! impl_scalar {
        ($ty:ty, $epsilon:expr) => {
            impl Scalar for $ty {
                const ZERO: Self = 0.0;
                const HALF: Self = 0.5;
                const ONE: Self = 1.0;
                const TWO: Self = 2.0;
                const THREE: Self = 3.0;
                const FOUR: Self = 4.0;
                const NINE: Self = 9.0;
                const EPSILON: Self = $epsilon;
            }
        };
    }

    impl_scalar!(f32, 1e-4);
    impl_scalar!(f64, 1e-8);
}

/// Alias for `euclid::default::Point2D`.
pub use euclid::default::Point2D as Point;

/// Alias for `euclid::default::Vector2D`.
pub use euclid::default::Vector2D as Vector;

/// Alias for `euclid::default::Size2D`.
pub use euclid::default::Size2D as Size;

/// Alias for `euclid::default::Box2D`
pub use euclid::default::Box2D;

/// An angle in radians.
pub use euclid::Angle;

/// Shorthand for `Vector::new(x, y)`.
#[inline]
pub fn vector<S>(x: S, y: S) -> Vector<S> {
    Vector::new(x, y)
}

/// Shorthand for `Point::new(x, y)`.
#[inline]
pub fn point<S>(x: S, y: S) -> Point<S> {
    Point::new(x, y)
}

/// Shorthand for `Size::new(x, y)`.
#[inline]
pub fn size<S>(w: S, h: S) -> Size<S> {
    Size::new(w, h)
}
