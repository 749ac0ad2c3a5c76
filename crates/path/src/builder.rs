//! Path building with a strict sub-path state machine.
//!
//! A [`PathBuilder`] is either `Idle` (no open sub-path) or `PathOpen`.
//!
//! - `begin` moves from `Idle` to `PathOpen`.
//! - `line_to`, `quadratic_bezier_to` and `cubic_bezier_to` require `PathOpen` and keep it.
//! - `close` and `end` move from `PathOpen` back to `Idle`.
//! - The `add_*` shape helpers require `Idle` and leave the builder `Idle`.
//!
//! Any other transition fails with [`BuilderError::InvalidState`] and leaves the
//! builder untouched. No sub-path is ever opened or terminated implicitly.
//!
//! # Examples
//!
//! ```
//! use pathmesh_path::{BuilderError, BuilderOp, BuilderState, Path};
//! use pathmesh_path::math::point;
//!
//! let mut builder = Path::builder();
//!
//! // Drawing before `begin` is a usage error.
//! assert_eq!(
//!     builder.line_to(point(1.0, 0.0)).err(),
//!     Some(BuilderError::InvalidState { op: BuilderOp::LineTo, state: BuilderState::Idle }),
//! );
//!
//! builder.begin(point(0.0, 0.0)).unwrap();
//! builder.line_to(point(1.0, 0.0)).unwrap();
//! builder.end().unwrap();
//!
//! let path = builder.build().unwrap();
//! assert_eq!(path.verbs().len(), 3);
//! ```

use crate::math::{point, Box2D, Point, Size};
use crate::path::{Path, PathVerb};

use alloc::vec::Vec;
use core::fmt;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// Control point factor used to approximate a quarter of a circle with a cubic bézier
/// curve when building ellipses.
pub const ELLIPSE_KAPPA: f32 = 0.5522848;

/// Control point factor used for the corners of rounded rectangles.
pub const ROUNDED_CORNER_FACTOR: f32 = 0.551785;

/// Whether a sub-path is currently open.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum BuilderState {
    Idle,
    PathOpen,
}

impl fmt::Display for BuilderState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BuilderState::Idle => write!(f, "idle"),
            BuilderState::PathOpen => write!(f, "inside an open sub-path"),
        }
    }
}

/// The builder operation that was rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum BuilderOp {
    Begin,
    LineTo,
    QuadraticBezierTo,
    CubicBezierTo,
    Close,
    End,
    AddShape,
    Build,
}

impl From<PathVerb> for BuilderOp {
    fn from(verb: PathVerb) -> Self {
        match verb {
            PathVerb::Begin => BuilderOp::Begin,
            PathVerb::LineTo => BuilderOp::LineTo,
            PathVerb::QuadraticBezierTo => BuilderOp::QuadraticBezierTo,
            PathVerb::CubicBezierTo => BuilderOp::CubicBezierTo,
            PathVerb::Close => BuilderOp::Close,
            PathVerb::End => BuilderOp::End,
        }
    }
}

impl fmt::Display for BuilderOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            BuilderOp::Begin => "begin",
            BuilderOp::LineTo => "line_to",
            BuilderOp::QuadraticBezierTo => "quadratic_bezier_to",
            BuilderOp::CubicBezierTo => "cubic_bezier_to",
            BuilderOp::Close => "close",
            BuilderOp::End => "end",
            BuilderOp::AddShape => "add a shape",
            BuilderOp::Build => "build",
        };
        f.write_str(name)
    }
}

/// Errors reported while building or validating a path.
#[non_exhaustive]
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// A verb was issued outside of the begin/end discipline.
    #[error("cannot {op} while the path builder is {state}")]
    InvalidState { op: BuilderOp, state: BuilderState },
    /// A raw verb stream does not consume exactly the provided points.
    #[error("the verbs consume {expected} points but {actual} were provided")]
    PointCountMismatch { expected: usize, actual: usize },
}

/// Builds a [`Path`], enforcing the sub-path state machine.
#[derive(Clone, Debug, Default)]
pub struct PathBuilder {
    points: Vec<Point>,
    verbs: Vec<PathVerb>,
    open: bool,
}

impl PathBuilder {
    pub fn new() -> Self {
        PathBuilder {
            points: Vec::new(),
            verbs: Vec::new(),
            open: false,
        }
    }

    pub fn with_capacity(points: usize, verbs: usize) -> Self {
        PathBuilder {
            points: Vec::with_capacity(points),
            verbs: Vec::with_capacity(verbs),
            open: false,
        }
    }

    #[inline]
    pub fn state(&self) -> BuilderState {
        if self.open {
            BuilderState::PathOpen
        } else {
            BuilderState::Idle
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    /// The verbs recorded so far.
    pub fn verbs(&self) -> &[PathVerb] {
        &self.verbs
    }

    /// The points recorded so far, in the order the verbs consume them.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    fn expect_state(&self, expected: BuilderState, op: BuilderOp) -> Result<(), BuilderError> {
        let state = self.state();
        if state != expected {
            return Err(BuilderError::InvalidState { op, state });
        }

        Ok(())
    }

    /// Starts a new sub-path at a given position.
    pub fn begin(&mut self, at: Point) -> Result<&mut Self, BuilderError> {
        self.expect_state(BuilderState::Idle, BuilderOp::Begin)?;
        self.verbs.push(PathVerb::Begin);
        self.points.push(at);
        self.open = true;

        Ok(self)
    }

    pub fn line_to(&mut self, to: Point) -> Result<&mut Self, BuilderError> {
        self.expect_state(BuilderState::PathOpen, BuilderOp::LineTo)?;
        self.verbs.push(PathVerb::LineTo);
        self.points.push(to);

        Ok(self)
    }

    pub fn quadratic_bezier_to(&mut self, ctrl: Point, to: Point) -> Result<&mut Self, BuilderError> {
        self.expect_state(BuilderState::PathOpen, BuilderOp::QuadraticBezierTo)?;
        self.verbs.push(PathVerb::QuadraticBezierTo);
        self.points.push(ctrl);
        self.points.push(to);

        Ok(self)
    }

    pub fn cubic_bezier_to(
        &mut self,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    ) -> Result<&mut Self, BuilderError> {
        self.expect_state(BuilderState::PathOpen, BuilderOp::CubicBezierTo)?;
        self.verbs.push(PathVerb::CubicBezierTo);
        self.points.push(ctrl1);
        self.points.push(ctrl2);
        self.points.push(to);

        Ok(self)
    }

    /// Terminates the current sub-path, connecting its last point back to its first.
    pub fn close(&mut self) -> Result<&mut Self, BuilderError> {
        self.expect_state(BuilderState::PathOpen, BuilderOp::Close)?;
        self.verbs.push(PathVerb::Close);
        self.open = false;

        Ok(self)
    }

    /// Terminates the current sub-path, leaving it open.
    pub fn end(&mut self) -> Result<&mut Self, BuilderError> {
        self.expect_state(BuilderState::PathOpen, BuilderOp::End)?;
        self.verbs.push(PathVerb::End);
        self.open = false;

        Ok(self)
    }

    /// Removes all verbs and points and returns to the `Idle` state.
    pub fn clear(&mut self) {
        self.verbs.clear();
        self.points.clear();
        self.open = false;
    }

    /// Appends a verb with its points, as consumed positionally from a raw stream.
    pub(crate) fn push_verb(&mut self, verb: PathVerb, points: &[Point]) -> Result<&mut Self, BuilderError> {
        debug_assert_eq!(points.len(), verb.num_points());
        match verb {
            PathVerb::Begin => self.begin(points[0]),
            PathVerb::LineTo => self.line_to(points[0]),
            PathVerb::QuadraticBezierTo => self.quadratic_bezier_to(points[0], points[1]),
            PathVerb::CubicBezierTo => self.cubic_bezier_to(points[0], points[1], points[2]),
            PathVerb::Close => self.close(),
            PathVerb::End => self.end(),
        }
    }

    /// Adds an open sub-path made of a single line segment.
    pub fn add_line(&mut self, from: Point, to: Point) -> Result<&mut Self, BuilderError> {
        self.expect_state(BuilderState::Idle, BuilderOp::AddShape)?;
        self.begin(from)?.line_to(to)?.end()
    }

    /// Adds an open sub-path made of a single quadratic bézier segment.
    pub fn add_quadratic_bezier(
        &mut self,
        from: Point,
        ctrl: Point,
        to: Point,
    ) -> Result<&mut Self, BuilderError> {
        self.expect_state(BuilderState::Idle, BuilderOp::AddShape)?;
        self.begin(from)?.quadratic_bezier_to(ctrl, to)?.end()
    }

    /// Adds an open sub-path made of a single cubic bézier segment.
    pub fn add_cubic_bezier(
        &mut self,
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    ) -> Result<&mut Self, BuilderError> {
        self.expect_state(BuilderState::Idle, BuilderOp::AddShape)?;
        self.begin(from)?.cubic_bezier_to(ctrl1, ctrl2, to)?.end()
    }

    /// Adds a closed axis-aligned rectangle.
    ///
    /// The contour starts at the minimum corner and visits the minimum x edge first.
    pub fn add_rect(&mut self, rect: &Box2D) -> Result<&mut Self, BuilderError> {
        self.expect_state(BuilderState::Idle, BuilderOp::AddShape)?;
        let (min, max) = (rect.min, rect.max);
        self.begin(min)?
            .line_to(point(min.x, max.y))?
            .line_to(max)?
            .line_to(point(max.x, min.y))?
            .close()
    }

    /// Adds a closed rectangle with rounded corners.
    ///
    /// The radius is clamped to half of the rectangle's smallest side. A radius that
    /// is not strictly positive adds a plain rectangle.
    pub fn add_rounded_rect(&mut self, rect: &Box2D, radius: f32) -> Result<&mut Self, BuilderError> {
        self.expect_state(BuilderState::Idle, BuilderOp::AddShape)?;
        let half_extent = f32::min(rect.width().abs(), rect.height().abs()) * 0.5;
        let r = f32::min(radius, half_extent);
        if !(r > 0.0) {
            return self.add_rect(rect);
        }

        let (min, max) = (rect.min, rect.max);
        let c = r * ROUNDED_CORNER_FACTOR;

        self.begin(point(min.x, min.y + r))?
            .cubic_bezier_to(
                point(min.x, min.y + r - c),
                point(min.x + r - c, min.y),
                point(min.x + r, min.y),
            )?
            .line_to(point(max.x - r, min.y))?
            .cubic_bezier_to(
                point(max.x - r + c, min.y),
                point(max.x, min.y + r - c),
                point(max.x, min.y + r),
            )?
            .line_to(point(max.x, max.y - r))?
            .cubic_bezier_to(
                point(max.x, max.y - r + c),
                point(max.x - r + c, max.y),
                point(max.x - r, max.y),
            )?
            .line_to(point(min.x + r, max.y))?
            .cubic_bezier_to(
                point(min.x + r - c, max.y),
                point(min.x, max.y - r + c),
                point(min.x, max.y - r),
            )?
            .close()
    }

    /// Adds a closed axis-aligned ellipse made of four cubic bézier arcs.
    ///
    /// `size` is the full width and height of the ellipse. The contour starts at the
    /// middle of the minimum x side.
    pub fn add_ellipse(&mut self, center: Point, size: Size) -> Result<&mut Self, BuilderError> {
        self.expect_state(BuilderState::Idle, BuilderOp::AddShape)?;
        let (w, h) = (size.width, size.height);
        let x = center.x - w * 0.5;
        let y = center.y - h * 0.5;
        let ox = w * 0.5 * ELLIPSE_KAPPA;
        let oy = h * 0.5 * ELLIPSE_KAPPA;
        let xe = x + w;
        let ye = y + h;
        let (xm, ym) = (center.x, center.y);

        self.begin(point(x, ym))?
            .cubic_bezier_to(point(x, ym - oy), point(xm - ox, y), point(xm, y))?
            .cubic_bezier_to(point(xm + ox, y), point(xe, ym - oy), point(xe, ym))?
            .cubic_bezier_to(point(xe, ym + oy), point(xm + ox, ye), point(xm, ye))?
            .cubic_bezier_to(point(xm - ox, ye), point(x, ym + oy), point(x, ym))?
            .close()
    }

    /// Adds a closed circle of the given radius.
    pub fn add_circle(&mut self, center: Point, radius: f32) -> Result<&mut Self, BuilderError> {
        let d = radius * 2.0;
        self.add_ellipse(center, Size::new(d, d))
    }

    /// Builds the path.
    ///
    /// Fails if a sub-path is still open.
    pub fn build(self) -> Result<Path, BuilderError> {
        self.expect_state(BuilderState::Idle, BuilderOp::Build)?;

        Ok(Path::from_parts(self.verbs, self.points))
    }
}

#[cfg(test)]
use crate::math::{box2d, size};

#[cfg(test)]
fn invalid(op: BuilderOp, state: BuilderState) -> Option<BuilderError> {
    Some(BuilderError::InvalidState { op, state })
}

#[test]
fn drawing_requires_an_open_sub_path() {
    let mut builder = PathBuilder::new();
    let p = point(1.0, 1.0);

    assert_eq!(builder.line_to(p).err(), invalid(BuilderOp::LineTo, BuilderState::Idle));
    assert_eq!(
        builder.quadratic_bezier_to(p, p).err(),
        invalid(BuilderOp::QuadraticBezierTo, BuilderState::Idle)
    );
    assert_eq!(
        builder.cubic_bezier_to(p, p, p).err(),
        invalid(BuilderOp::CubicBezierTo, BuilderState::Idle)
    );
    assert_eq!(builder.close().err(), invalid(BuilderOp::Close, BuilderState::Idle));
    assert_eq!(builder.end().err(), invalid(BuilderOp::End, BuilderState::Idle));

    // Nothing was recorded and no sub-path was opened implicitly.
    assert!(builder.is_empty());
    assert!(builder.points().is_empty());
    assert_eq!(builder.state(), BuilderState::Idle);
}

#[test]
fn begin_twice_is_rejected() {
    let mut builder = PathBuilder::new();
    builder.begin(point(0.0, 0.0)).unwrap();
    assert_eq!(
        builder.begin(point(1.0, 0.0)).err(),
        invalid(BuilderOp::Begin, BuilderState::PathOpen)
    );
    assert_eq!(builder.verbs(), &[PathVerb::Begin]);
    assert_eq!(builder.points(), &[point(0.0, 0.0)]);

    builder.line_to(point(1.0, 0.0)).unwrap();
    builder.close().unwrap();
    assert_eq!(builder.state(), BuilderState::Idle);
    builder.begin(point(5.0, 5.0)).unwrap();
    assert_eq!(builder.state(), BuilderState::PathOpen);
}

#[test]
fn shapes_require_idle() {
    let mut builder = PathBuilder::new();
    builder.begin(point(0.0, 0.0)).unwrap();

    let err = invalid(BuilderOp::AddShape, BuilderState::PathOpen);
    assert_eq!(builder.add_line(point(0.0, 0.0), point(1.0, 1.0)).err(), err);
    assert_eq!(builder.add_rect(&box2d(0.0, 0.0, 1.0, 1.0)).err(), err);
    assert_eq!(builder.add_rounded_rect(&box2d(0.0, 0.0, 1.0, 1.0), 0.2).err(), err);
    assert_eq!(builder.add_ellipse(point(0.0, 0.0), size(1.0, 1.0)).err(), err);
    assert_eq!(builder.add_circle(point(0.0, 0.0), 1.0).err(), err);
    assert_eq!(builder.verbs().len(), 1);
}

#[test]
fn build_with_open_sub_path_fails() {
    let mut builder = PathBuilder::new();
    builder.begin(point(0.0, 0.0)).unwrap();
    builder.line_to(point(1.0, 0.0)).unwrap();

    assert_eq!(
        builder.build().err(),
        invalid(BuilderOp::Build, BuilderState::PathOpen)
    );
}

#[test]
fn clear_resets_the_state() {
    let mut builder = PathBuilder::new();
    builder.begin(point(0.0, 0.0)).unwrap();
    builder.line_to(point(1.0, 0.0)).unwrap();
    builder.clear();

    assert!(builder.is_empty());
    assert_eq!(builder.state(), BuilderState::Idle);
    builder.begin(point(3.0, 3.0)).unwrap();
}

#[test]
fn rect_layout() {
    let mut builder = PathBuilder::new();
    builder.add_rect(&box2d(1.0, 2.0, 3.0, 4.0)).unwrap();

    assert_eq!(
        builder.verbs(),
        &[
            PathVerb::Begin,
            PathVerb::LineTo,
            PathVerb::LineTo,
            PathVerb::LineTo,
            PathVerb::Close
        ]
    );
    assert_eq!(
        builder.points(),
        &[point(1.0, 2.0), point(1.0, 4.0), point(3.0, 4.0), point(3.0, 2.0)]
    );
}

#[test]
fn rounded_rect_layout() {
    let mut builder = PathBuilder::new();
    builder.add_rounded_rect(&box2d(0.0, 0.0, 10.0, 20.0), 2.0).unwrap();

    let cubics = builder
        .verbs()
        .iter()
        .filter(|v| **v == PathVerb::CubicBezierTo)
        .count();
    let lines = builder
        .verbs()
        .iter()
        .filter(|v| **v == PathVerb::LineTo)
        .count();
    assert_eq!(cubics, 4);
    assert_eq!(lines, 3);
    assert_eq!(builder.verbs().last(), Some(&PathVerb::Close));
    assert_eq!(builder.points()[0], point(0.0, 2.0));
    // Control point of the first corner.
    assert_eq!(builder.points()[1], point(0.0, 2.0 - 2.0 * ROUNDED_CORNER_FACTOR));

    // Without a radius this is a plain rectangle.
    let mut plain = PathBuilder::new();
    plain.add_rounded_rect(&box2d(0.0, 0.0, 10.0, 20.0), 0.0).unwrap();
    let mut rect = PathBuilder::new();
    rect.add_rect(&box2d(0.0, 0.0, 10.0, 20.0)).unwrap();
    assert_eq!(plain.verbs(), rect.verbs());
    assert_eq!(plain.points(), rect.points());
}

#[test]
fn circle_has_the_requested_radius() {
    let mut builder = PathBuilder::new();
    builder.add_circle(point(10.0, 20.0), 5.0).unwrap();

    assert_eq!(builder.verbs().len(), 6);
    let endpoints = [0, 3, 6, 9, 12];
    let expected = [
        point(5.0, 20.0),
        point(10.0, 15.0),
        point(15.0, 20.0),
        point(10.0, 25.0),
        point(5.0, 20.0),
    ];
    for (idx, p) in endpoints.iter().zip(expected.iter()) {
        assert_eq!(builder.points()[*idx], *p);
    }
}
