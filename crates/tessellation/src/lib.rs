#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]
#![no_std]

//! Tessellation of 2D path fills and strokes into triangle meshes.
//!
//! This crate is reexported in [pathmesh](https://docs.rs/pathmesh/).
//!
//! ## Overview
//!
//! * [`FillTessellator`] triangulates the interior of a path according to a [`FillRule`],
//!   including self-intersecting and multi-contour paths.
//! * [`StrokeTessellator`] triangulates the outline of a path at a given line width, with
//!   caps at the ends of open contours and joins between segments.
//! * The [`geometry_builder`] module defines the traits the tessellators write their output
//!   through, and helpers to fill vertex and index buffers.
//!
//! Both tessellators consume [`PathEvent`](path::PathEvent) iterators, typically from a
//! [`Path`](path::Path). Curves are flattened into line segments first, within the
//! `tolerance` of the options: the maximum distance between a curve and its approximation.
//!
//! The output is a list of triangles, with counter-clockwise winding in the coordinate space
//! of the input path.
//!
//! ## Errors
//!
//! Options are validated before anything is written to the output and rejected with
//! [`TessellationError::InvalidOptions`]. Positions that aren't finite are reported as
//! [`GeometryBuilderError::InvalidVertex`] and outputs that run out of indices as
//! [`GeometryBuilderError::TooManyVertices`]. On these errors the tessellation stops and
//! calls [`GeometryBuilder::abort_geometry`]. Triangles emitted before the error stay in the
//! output and never reference the vertex that failed.
//!
//! ## Examples
//!
//! ```
//! use pathmesh_tessellation::*;
//! use pathmesh_tessellation::math::{point, Point};
//! use pathmesh_tessellation::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = Path::builder();
//! builder
//!     .begin(point(0.0, 0.0))?
//!     .line_to(point(10.0, 0.0))?
//!     .quadratic_bezier_to(point(10.0, 10.0), point(0.0, 10.0))?
//!     .close()?;
//! let path = builder.build()?;
//!
//! let mut fill: VertexBuffers<Point, u16> = VertexBuffers::new();
//! tessellate_fill(&path, &FillOptions::tolerance(0.05), &mut simple_builder(&mut fill))?;
//!
//! let mut stroke: VertexBuffers<Point, u16> = VertexBuffers::new();
//! let options = StrokeOptions::default()
//!     .with_line_width(2.0)
//!     .with_line_join(LineJoin::Round);
//! tessellate_stroke(&path, &options, &mut simple_builder(&mut stroke))?;
//!
//! assert_eq!(fill.indices.len() % 3, 0);
//! assert_eq!(stroke.indices.len() % 3, 0);
//! # Ok(())
//! # }
//! ```

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub use pathmesh_path as path;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod error;
mod event_queue;
mod fill;
pub mod geometry_builder;
mod math_utils;
mod monotone;
mod stroke;

#[cfg(test)]
mod fill_tests;

pub use crate::path::math;

pub use crate::path::geom;

#[doc(inline)]
pub use crate::fill::{FillTessellator, FillVertex};

#[doc(inline)]
pub use crate::stroke::{StrokeTessellator, StrokeVertex};

#[doc(inline)]
pub use crate::geometry_builder::{
    simple_builder, BuffersBuilder, CallbackBuilder, FillGeometryBuilder, FillVertexConstructor,
    GeometryBuilder, GeometryBuilderError, NoOutput, StrokeGeometryBuilder,
    StrokeVertexConstructor, VertexBuffers,
};

#[doc(inline)]
pub use crate::error::*;

pub use crate::path::FillRule;

use crate::path::{Path, PathEvent};

use core::ops::{Add, Sub};

/// Tessellates the fill of a path into `output`.
///
/// A shorthand for [`FillTessellator::tessellate`] with a fresh tessellator. Reuse a
/// `FillTessellator` to keep its allocations across calls.
pub fn tessellate_fill(
    path: &Path,
    options: &FillOptions,
    output: &mut dyn FillGeometryBuilder,
) -> TessellationResult {
    FillTessellator::new().tessellate_path(path, options, output)
}

/// Tessellates the stroke of a path into `output`.
///
/// A shorthand for [`StrokeTessellator::tessellate`] with a fresh tessellator.
pub fn tessellate_stroke(
    path: &Path,
    options: &StrokeOptions,
    output: &mut dyn StrokeGeometryBuilder,
) -> TessellationResult {
    StrokeTessellator::new().tessellate_path(path, options, output)
}

/// Tessellates the fill of arbitrary path events.
pub fn tessellate_fill_events(
    events: impl IntoIterator<Item = PathEvent>,
    options: &FillOptions,
    output: &mut dyn FillGeometryBuilder,
) -> TessellationResult {
    FillTessellator::new().tessellate(events, options, output)
}

/// Line cap as defined by the SVG specification.
///
/// See: <https://svgwg.org/specs/strokes/#StrokeLinecapProperty>
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineCap {
    /// The stroke ends flat at the endpoint.
    Butt,
    /// Like `Butt`, extended by half of the line width.
    Square,
    /// A half circle centered on the endpoint.
    Round,
}

impl LineCap {
    /// Decodes the integer representation used by host bindings.
    ///
    /// `0` is `Butt`, `1` is `Square` and `2` is `Round`. Other values map to `Butt`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => LineCap::Square,
            2 => LineCap::Round,
            _ => LineCap::Butt,
        }
    }
}

/// Line join as defined by the SVG specification.
///
/// See: <https://svgwg.org/specs/strokes/#StrokeLinejoinProperty>
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineJoin {
    /// The outer edges are extended until they meet. Joins sharper than the miter limit
    /// are drawn as `Bevel`.
    Miter,
    /// Like `Miter`, but sharp joins are cut at the miter limit instead of falling back
    /// to `Bevel`.
    MiterClip,
    /// A circular arc centered on the join point.
    Round,
    /// The outer corners are connected with a straight line.
    Bevel,
}

impl LineJoin {
    /// Decodes the integer representation used by host bindings.
    ///
    /// `0` is `Miter`, `1` is `MiterClip`, `2` is `Round` and `3` is `Bevel`. Other values
    /// map to `Miter`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => LineJoin::MiterClip,
            2 => LineJoin::Round,
            3 => LineJoin::Bevel,
            _ => LineJoin::Miter,
        }
    }
}

/// Which side of the path a stroke vertex is on.
///
/// The positive side is on the left when walking along the path in a y-up coordinate
/// system.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Side {
    Positive,
    Negative,
    /// On the path itself, at the center of a round cap or join.
    Center,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Positive => Side::Negative,
            Side::Negative => Side::Positive,
            Side::Center => Side::Center,
        }
    }

    pub fn is_positive(self) -> bool {
        self == Side::Positive
    }

    pub fn is_negative(self) -> bool {
        self == Side::Negative
    }
}

/// Vertical or Horizontal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Decodes the integer representation used by host bindings.
    ///
    /// `0` is `Horizontal`, any other value is `Vertical`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Orientation::Horizontal,
            _ => Orientation::Vertical,
        }
    }
}

/// Parameters for the stroke tessellator.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct StrokeOptions {
    /// What cap to use at the start of each open contour.
    ///
    /// Default value: `LineCap::Butt`.
    pub start_cap: LineCap,

    /// What cap to use at the end of each open contour.
    ///
    /// Default value: `LineCap::Butt`.
    pub end_cap: LineCap,

    /// Default value: `LineJoin::Miter`.
    pub line_join: LineJoin,

    /// Default value: `StrokeOptions::DEFAULT_LINE_WIDTH`.
    pub line_width: f32,

    /// Ratio between the miter length and half of the line width above which miter
    /// joins are not drawn as miters.
    ///
    /// Must be greater than or equal to 1.0.
    /// Default value: `StrokeOptions::DEFAULT_MITER_LIMIT`.
    pub miter_limit: f32,

    /// Maximum allowed distance to the path when building an approximation.
    ///
    /// Default value: `StrokeOptions::DEFAULT_TOLERANCE`.
    pub tolerance: f32,
}

impl StrokeOptions {
    /// Minimum miter limit as defined by the SVG specification.
    pub const MINIMUM_MITER_LIMIT: f32 = 1.0;
    /// Default miter limit as defined by the SVG specification.
    pub const DEFAULT_MITER_LIMIT: f32 = 4.0;
    pub const DEFAULT_LINE_CAP: LineCap = LineCap::Butt;
    pub const DEFAULT_LINE_JOIN: LineJoin = LineJoin::Miter;
    pub const DEFAULT_LINE_WIDTH: f32 = 1.0;
    pub const DEFAULT_TOLERANCE: f32 = 0.1;

    pub const DEFAULT: Self = StrokeOptions {
        start_cap: Self::DEFAULT_LINE_CAP,
        end_cap: Self::DEFAULT_LINE_CAP,
        line_join: Self::DEFAULT_LINE_JOIN,
        line_width: Self::DEFAULT_LINE_WIDTH,
        miter_limit: Self::DEFAULT_MITER_LIMIT,
        tolerance: Self::DEFAULT_TOLERANCE,
    };

    #[inline]
    pub fn tolerance(tolerance: f32) -> Self {
        Self::DEFAULT.with_tolerance(tolerance)
    }

    #[inline]
    pub const fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub const fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.start_cap = cap;
        self.end_cap = cap;
        self
    }

    #[inline]
    pub const fn with_start_cap(mut self, cap: LineCap) -> Self {
        self.start_cap = cap;
        self
    }

    #[inline]
    pub const fn with_end_cap(mut self, cap: LineCap) -> Self {
        self.end_cap = cap;
        self
    }

    #[inline]
    pub const fn with_line_join(mut self, join: LineJoin) -> Self {
        self.line_join = join;
        self
    }

    #[inline]
    pub const fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    /// Out of range values are reported by [`validate`](Self::validate) when tessellating.
    #[inline]
    pub const fn with_miter_limit(mut self, limit: f32) -> Self {
        self.miter_limit = limit;
        self
    }

    /// Checks that the tolerance and the line width are positive and that the miter
    /// limit is at least [`MINIMUM_MITER_LIMIT`](Self::MINIMUM_MITER_LIMIT).
    pub fn validate(&self) -> Result<(), InvalidOptions> {
        // Written so that NaN fails too.
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(InvalidOptions::Tolerance);
        }
        if !(self.line_width > 0.0 && self.line_width.is_finite()) {
            return Err(InvalidOptions::LineWidth);
        }
        if !(self.miter_limit >= Self::MINIMUM_MITER_LIMIT) {
            return Err(InvalidOptions::MiterLimit);
        }

        Ok(())
    }
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parameters for the fill tessellator.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct FillOptions {
    /// Maximum allowed distance to the path when building an approximation.
    ///
    /// Default value: `FillOptions::DEFAULT_TOLERANCE`.
    pub tolerance: f32,

    /// See the [SVG specification](https://www.w3.org/TR/SVG/painting.html#FillRuleProperty).
    ///
    /// Default value: `EvenOdd`.
    pub fill_rule: FillRule,

    /// Whether the sweep line moves along the y axis (`Vertical`) or the x axis.
    ///
    /// Only affects how ties are broken, and the performance on some shapes.
    ///
    /// Default value: `Vertical`.
    pub sweep_orientation: Orientation,

    /// Skips the intersection tests when the path is known to be free of
    /// self-intersections.
    ///
    /// With intersecting edges and this set to `false`, the result is unspecified and
    /// the tessellator may return an internal error.
    ///
    /// Default value: `true`.
    pub handle_intersections: bool,
}

impl FillOptions {
    /// Default flattening tolerance.
    pub const DEFAULT_TOLERANCE: f32 = 0.1;
    /// Default Fill rule.
    pub const DEFAULT_FILL_RULE: FillRule = FillRule::EvenOdd;
    /// Default orientation.
    pub const DEFAULT_SWEEP_ORIENTATION: Orientation = Orientation::Vertical;

    pub const DEFAULT: Self = FillOptions {
        tolerance: Self::DEFAULT_TOLERANCE,
        fill_rule: Self::DEFAULT_FILL_RULE,
        sweep_orientation: Self::DEFAULT_SWEEP_ORIENTATION,
        handle_intersections: true,
    };

    #[inline]
    pub fn even_odd() -> Self {
        Self::DEFAULT
    }

    #[inline]
    pub fn non_zero() -> Self {
        Self::DEFAULT.with_fill_rule(FillRule::NonZero)
    }

    #[inline]
    pub fn tolerance(tolerance: f32) -> Self {
        Self::DEFAULT.with_tolerance(tolerance)
    }

    #[inline]
    pub const fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub const fn with_fill_rule(mut self, rule: FillRule) -> Self {
        self.fill_rule = rule;
        self
    }

    #[inline]
    pub const fn with_sweep_orientation(mut self, orientation: Orientation) -> Self {
        self.sweep_orientation = orientation;
        self
    }

    #[inline]
    pub const fn with_intersections(mut self, intersections: bool) -> Self {
        self.handle_intersections = intersections;
        self
    }

    /// Checks that the tolerance is a positive number.
    pub fn validate(&self) -> Result<(), InvalidOptions> {
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(InvalidOptions::Tolerance);
        }

        Ok(())
    }
}

impl Default for FillOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

type Index = u32;

/// Identifies a vertex added to a geometry builder.
///
/// Ids are handed out by the geometry builder and only mean something to it, between
/// `begin_geometry` and `end_geometry`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VertexId(pub Index);

impl VertexId {
    pub const INVALID: VertexId = VertexId(u32::MAX);

    pub fn offset(self) -> Index {
        self.0
    }

    pub fn to_usize(self) -> usize {
        self.0 as usize
    }

    pub fn from_usize(v: usize) -> Self {
        VertexId(v as Index)
    }
}

impl Add<u32> for VertexId {
    type Output = Self;
    fn add(self, rhs: u32) -> Self {
        VertexId(self.0 + rhs)
    }
}

impl Sub<u32> for VertexId {
    type Output = Self;
    fn sub(self, rhs: u32) -> Self {
        VertexId(self.0 - rhs)
    }
}

impl From<u16> for VertexId {
    fn from(v: u16) -> Self {
        VertexId(v as Index)
    }
}
impl From<u32> for VertexId {
    fn from(v: u32) -> Self {
        VertexId(v)
    }
}

// Narrowing conversions truncate, `MaxIndex` keeps ids in range of the index type.
impl From<VertexId> for u8 {
    fn from(v: VertexId) -> Self {
        v.0 as u8
    }
}
impl From<VertexId> for u16 {
    fn from(v: VertexId) -> Self {
        v.0 as u16
    }
}
impl From<VertexId> for u32 {
    fn from(v: VertexId) -> Self {
        v.0
    }
}
impl From<VertexId> for i32 {
    fn from(v: VertexId) -> Self {
        v.0 as i32
    }
}
impl From<VertexId> for usize {
    fn from(v: VertexId) -> Self {
        v.0 as usize
    }
}

#[test]
fn default_options() {
    let fill = FillOptions::default();
    assert_eq!(fill.tolerance, 0.1);
    assert_eq!(fill.fill_rule, FillRule::EvenOdd);
    assert_eq!(fill.sweep_orientation, Orientation::Vertical);
    assert!(fill.handle_intersections);

    let stroke = StrokeOptions::default();
    assert_eq!(stroke.start_cap, LineCap::Butt);
    assert_eq!(stroke.end_cap, LineCap::Butt);
    assert_eq!(stroke.line_join, LineJoin::Miter);
    assert_eq!(stroke.line_width, 1.0);
    assert_eq!(stroke.miter_limit, 4.0);
    assert_eq!(stroke.tolerance, 0.1);
}

#[test]
fn options_validation() {
    assert_eq!(FillOptions::tolerance(0.0).validate(), Err(InvalidOptions::Tolerance));
    assert_eq!(FillOptions::tolerance(f32::NAN).validate(), Err(InvalidOptions::Tolerance));
    assert_eq!(FillOptions::non_zero().validate(), Ok(()));

    assert_eq!(
        StrokeOptions::default().with_line_width(0.0).validate(),
        Err(InvalidOptions::LineWidth)
    );
    assert_eq!(
        StrokeOptions::default().with_miter_limit(0.5).validate(),
        Err(InvalidOptions::MiterLimit)
    );
    assert_eq!(
        StrokeOptions::tolerance(-1.0).validate(),
        Err(InvalidOptions::Tolerance)
    );
    assert_eq!(StrokeOptions::default().with_miter_limit(1.0).validate(), Ok(()));
}

#[test]
fn host_codes() {
    assert_eq!(FillRule::from_code(1), FillRule::NonZero);
    assert_eq!(Orientation::from_code(0), Orientation::Horizontal);
    assert_eq!(Orientation::from_code(1), Orientation::Vertical);
    assert_eq!(LineCap::from_code(2), LineCap::Round);
    assert_eq!(LineCap::from_code(7), LineCap::Butt);
    assert_eq!(LineJoin::from_code(1), LineJoin::MiterClip);
    assert_eq!(LineJoin::from_code(3), LineJoin::Bevel);
    assert_eq!(LineJoin::from_code(-1), LineJoin::Miter);
}

#[test]
fn begin_end_only_produces_nothing() {
    use crate::math::{point, Point};

    let mut builder = Path::builder();
    builder.begin(point(1.0, 1.0)).unwrap();
    builder.end().unwrap();
    let path = builder.build().unwrap();

    let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
    tessellate_fill(&path, &FillOptions::default(), &mut simple_builder(&mut buffers)).unwrap();
    assert!(buffers.vertices.is_empty());
    assert!(buffers.indices.is_empty());

    tessellate_stroke(&path, &StrokeOptions::default(), &mut simple_builder(&mut buffers)).unwrap();
    assert!(buffers.vertices.is_empty());
    assert!(buffers.indices.is_empty());
}
