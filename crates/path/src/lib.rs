#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::match_like_matches_macro)]
#![no_std]

//! Data structures to build, validate and iterate over paths (vector graphics).
//!
//! A [`Path`] is an immutable sequence of [`PathVerb`]s and the points they consume.
//! It is built with a [`PathBuilder`](builder::PathBuilder) that enforces the
//! begin/end discipline of sub-paths, and read back as a stream of normalized
//! [`PathEvent`]s.
//!
//! This crate is reexported in [pathmesh](https://docs.rs/pathmesh/).
//!
//! # Examples
//!
//! ```
//! use pathmesh_path::Path;
//! use pathmesh_path::math::point;
//!
//! # fn main() -> Result<(), pathmesh_path::BuilderError> {
//! let mut builder = Path::builder();
//! builder
//!     .begin(point(0.0, 0.0))?
//!     .line_to(point(1.0, 2.0))?
//!     .line_to(point(2.0, 0.0))?
//!     .close()?;
//!
//! let path = builder.build()?;
//!
//! for event in &path {
//!     println!("{:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub use pathmesh_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod builder;
mod events;
pub mod path;

#[doc(inline)]
pub use crate::builder::{BuilderError, BuilderOp, BuilderState, PathBuilder};
pub use crate::events::*;
#[doc(inline)]
pub use crate::path::{Iter, Path, PathVerb};

pub mod math {
    //! f32 version of the pathmesh_geom types used everywhere. The other pathmesh
    //! crates reexport them.

    use crate::geom::euclid;

    /// Alias for ```euclid::default::Point2D<f32>```.
    pub type Point = euclid::default::Point2D<f32>;

    /// Alias for ```euclid::default::Vector2D<f32>```.
    pub type Vector = euclid::default::Vector2D<f32>;

    /// Alias for ```euclid::default::Size2D<f32>```.
    pub type Size = euclid::default::Size2D<f32>;

    /// Alias for ```euclid::default::Box2D<f32>```
    pub type Box2D = euclid::default::Box2D<f32>;

    /// An angle in radians (f32).
    pub type Angle = euclid::Angle<f32>;

    /// Shorthand for `Vector::new(x, y)`.
    #[inline]
    pub fn vector(x: f32, y: f32) -> Vector {
        Vector::new(x, y)
    }

    /// Shorthand for `Point::new(x, y)`.
    #[inline]
    pub fn point(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    /// Shorthand for `Size::new(x, y)`.
    #[inline]
    pub fn size(w: f32, h: f32) -> Size {
        Size::new(w, h)
    }

    /// Shorthand for `Box2D::new(point(min_x, min_y), point(max_x, max_y))`.
    #[inline]
    pub fn box2d(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Box2D {
        Box2D::new(point(min_x, min_y), point(max_x, max_y))
    }
}

/// The fill rule defines how to determine what is inside and what is outside of the shape.
///
/// See the SVG specification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FillRule {
    EvenOdd,
    NonZero,
}

impl FillRule {
    #[inline]
    pub fn is_in(&self, winding_number: i16) -> bool {
        match *self {
            FillRule::EvenOdd => winding_number % 2 != 0,
            FillRule::NonZero => winding_number != 0,
        }
    }

    #[inline]
    pub fn is_out(&self, winding_number: i16) -> bool {
        !self.is_in(winding_number)
    }

    /// Decodes the integer representation used by host bindings.
    ///
    /// `1` is `NonZero`, anything else is `EvenOdd`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => FillRule::NonZero,
            _ => FillRule::EvenOdd,
        }
    }
}

impl Default for FillRule {
    fn default() -> Self {
        FillRule::EvenOdd
    }
}

#[test]
fn fill_rule_winding_numbers() {
    assert!(FillRule::EvenOdd.is_in(1));
    assert!(FillRule::EvenOdd.is_in(-1));
    assert!(FillRule::EvenOdd.is_out(2));
    assert!(FillRule::EvenOdd.is_out(0));
    assert!(FillRule::NonZero.is_in(2));
    assert!(FillRule::NonZero.is_in(-2));
    assert!(FillRule::NonZero.is_out(0));

    assert_eq!(FillRule::from_code(0), FillRule::EvenOdd);
    assert_eq!(FillRule::from_code(1), FillRule::NonZero);
    assert_eq!(FillRule::from_code(42), FillRule::EvenOdd);
}
