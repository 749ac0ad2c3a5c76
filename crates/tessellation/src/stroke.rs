use crate::geom::utils::arc_segment_count;
use crate::geom::{CubicBezierSegment, QuadraticBezierSegment};
use crate::math::*;
use crate::math_utils::{angle_between, compute_normal, left_normal, rotate};
use crate::path::{Path, PathEvent};
use crate::{GeometryBuilderError, StrokeGeometryBuilder, VertexId};
use crate::{LineCap, LineJoin, Side, StrokeOptions, TessellationResult};

use alloc::vec::Vec;
use core::f32::consts::{FRAC_PI_2, PI};
use core::ops::Range;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// Points closer than this (squared) are merged while flattening.
const MIN_SQUARE_DISTANCE: f32 = 1e-12;

/// A context object that tessellates path strokes.
///
/// ## Overview
///
/// Each contour is flattened into a polyline which is then extruded by half of the line
/// width on each side. Every segment becomes a quad (two triangles). Joins fill the gap
/// on the outer side of each corner, and open contours get a cap at each end. Closed
/// contours get a join where they wrap around instead.
///
/// The stroke is a strip of triangles along the path: where the path overlaps itself,
/// triangles overlap too. This needs to be kept in mind when rendering semi-transparent
/// strokes.
///
/// Contours that collapse to a single point produce no geometry, whatever the caps.
///
/// # Examples
///
/// ```
/// use pathmesh_tessellation::{StrokeOptions, StrokeTessellator, LineCap, VertexBuffers, simple_builder};
/// use pathmesh_tessellation::math::{point, Point};
/// use pathmesh_tessellation::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = Path::builder();
/// builder
///     .begin(point(0.0, 0.0))?
///     .line_to(point(1.0, 2.0))?
///     .line_to(point(2.0, 0.0))?
///     .line_to(point(1.0, 1.0))?
///     .end()?;
/// let path = builder.build()?;
///
/// let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
/// let mut tessellator = StrokeTessellator::new();
/// tessellator.tessellate_path(
///     &path,
///     &StrokeOptions::tolerance(0.01).with_line_cap(LineCap::Round),
///     &mut simple_builder(&mut buffers),
/// )?;
///
/// println!("The generated vertices are: {:?}.", &buffers.vertices[..]);
/// println!("The generated indices are: {:?}.", &buffers.indices[..]);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct StrokeTessellator {
    points: Vec<Point>,
    contours: Vec<Contour>,
}

#[derive(Clone, Debug)]
struct Contour {
    range: Range<usize>,
    closed: bool,
}

impl StrokeTessellator {
    pub fn new() -> Self {
        StrokeTessellator {
            points: Vec::new(),
            contours: Vec::new(),
        }
    }

    /// Compute the tessellation from a path iterator.
    ///
    /// The options and the input are checked before anything is written to the output.
    pub fn tessellate(
        &mut self,
        input: impl IntoIterator<Item = PathEvent>,
        options: &StrokeOptions,
        output: &mut dyn StrokeGeometryBuilder,
    ) -> TessellationResult {
        options.validate()?;
        self.flatten(input, options.tolerance)?;

        log::debug!(
            "stroke: {} contours, {} points, width {}, {:?} join, {:?}/{:?} caps",
            self.contours.len(),
            self.points.len(),
            options.line_width,
            options.line_join,
            options.start_cap,
            options.end_cap,
        );

        output.begin_geometry();

        let result = {
            let mut builder = StrokeBuilder {
                options,
                half_width: options.line_width * 0.5,
                output: &mut *output,
            };

            self.contours.iter().try_for_each(|contour| {
                builder.contour(&self.points[contour.range.clone()], contour.closed)
            })
        };

        if let Err(e) = result {
            log::debug!("stroke tessellation aborted: {}", e);
            output.abort_geometry();
            return Err(e.into());
        }

        output.end_geometry();

        Ok(())
    }

    /// Tessellate a `Path`.
    pub fn tessellate_path(
        &mut self,
        path: &Path,
        options: &StrokeOptions,
        output: &mut dyn StrokeGeometryBuilder,
    ) -> TessellationResult {
        self.tessellate(path.iter(), options, output)
    }

    fn flatten(
        &mut self,
        input: impl IntoIterator<Item = PathEvent>,
        tolerance: f32,
    ) -> Result<(), GeometryBuilderError> {
        self.points.clear();
        self.contours.clear();

        let mut start = 0;
        for event in input {
            if event.has_non_finite_points() {
                self.points.clear();
                self.contours.clear();
                return Err(GeometryBuilderError::InvalidVertex);
            }

            match event {
                PathEvent::Begin { at } => {
                    start = self.points.len();
                    self.points.push(at);
                }
                PathEvent::Line { to, .. } => {
                    self.push_point(start, to);
                }
                PathEvent::Quadratic { from, ctrl, to } => {
                    QuadraticBezierSegment { from, ctrl, to }
                        .for_each_flattened(tolerance, &mut |line| {
                            self.push_point(start, line.to)
                        });
                }
                PathEvent::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                } => {
                    CubicBezierSegment {
                        from,
                        ctrl1,
                        ctrl2,
                        to,
                    }
                    .for_each_flattened(tolerance, &mut |line| self.push_point(start, line.to));
                }
                PathEvent::End { close, .. } => {
                    let mut end = self.points.len();
                    // The closing edge is implied by the join.
                    if close
                        && end - start > 1
                        && (self.points[end - 1] - self.points[start]).square_length()
                            <= MIN_SQUARE_DISTANCE
                    {
                        self.points.pop();
                        end -= 1;
                    }

                    if end > start {
                        self.contours.push(Contour {
                            range: start..end,
                            closed: close,
                        });
                    }
                    start = end;
                }
            }
        }

        Ok(())
    }

    fn push_point(&mut self, contour_start: usize, p: Point) {
        if self.points.len() > contour_start {
            if let Some(last) = self.points.last() {
                if (p - *last).square_length() <= MIN_SQUARE_DISTANCE {
                    return;
                }
            }
        }

        self.points.push(p);
    }
}

/// A vertex produced by the stroke tessellator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StrokeVertex {
    pub(crate) position_on_path: Point,
    pub(crate) normal: Vector,
    pub(crate) half_width: f32,
    pub(crate) side: Side,
    pub(crate) advancement: f32,
}

impl StrokeVertex {
    /// The vertex position.
    #[inline]
    pub fn position(&self) -> Point {
        self.position_on_path + self.normal * self.half_width
    }

    /// Normal at this vertex.
    ///
    /// Scaled so that displacing the vertex along it by the half line width gives its
    /// position. Miter vertices have normals longer than 1, and vertices at the center
    /// of round caps and joins have a zero normal.
    #[inline]
    pub fn normal(&self) -> Vector {
        self.normal
    }

    /// Position of this vertex on the path, unaffected by the line width.
    #[inline]
    pub fn position_on_path(&self) -> Point {
        self.position_on_path
    }

    #[inline]
    pub fn line_width(&self) -> f32 {
        self.half_width * 2.0
    }

    /// Distance along the contour from its first point.
    #[inline]
    pub fn advancement(&self) -> f32 {
        self.advancement
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }
}

#[derive(Copy, Clone, Debug)]
struct Emitted {
    id: VertexId,
    position: Point,
}

/// The two vertices across the stroke at the end of a segment.
#[derive(Copy, Clone, Debug)]
struct EdgePair {
    positive: Emitted,
    negative: Emitted,
}

impl EdgePair {
    fn from_outer_inner(outer: Emitted, inner: Emitted, outer_sign: f32) -> Self {
        if outer_sign > 0.0 {
            EdgePair {
                positive: outer,
                negative: inner,
            }
        } else {
            EdgePair {
                positive: inner,
                negative: outer,
            }
        }
    }

    fn flipped(self) -> Self {
        EdgePair {
            positive: self.negative,
            negative: self.positive,
        }
    }
}

fn side_of_normal(reference: Vector) -> impl Fn(Vector) -> Side {
    move |normal| {
        if normal.dot(reference) >= 0.0 {
            Side::Positive
        } else {
            Side::Negative
        }
    }
}

struct StrokeBuilder<'l> {
    options: &'l StrokeOptions,
    half_width: f32,
    output: &'l mut dyn StrokeGeometryBuilder,
}

impl<'l> StrokeBuilder<'l> {
    fn contour(&mut self, points: &[Point], closed: bool) -> Result<(), GeometryBuilderError> {
        match points.len() {
            0 | 1 => Ok(()),
            _ if closed => self.closed_contour(points),
            _ => self.open_contour(points),
        }
    }

    fn open_contour(&mut self, points: &[Point]) -> Result<(), GeometryBuilderError> {
        let n = points.len();
        let last_segment = n - 2;

        let (d0, _) = segment(points, 0);
        let mut previous = self.start_cap(points[0], d0)?;
        let mut advancement = 0.0;

        for i in 1..n - 1 {
            let (d_in, len_in) = segment(points, i - 1);
            let (d_out, len_out) = segment(points, i);
            advancement += len_in;

            // Segments between two joins are shared by both of them.
            let max_in = if i == 1 { len_in } else { len_in * 0.5 };
            let max_out = if i == last_segment { len_out } else { len_out * 0.5 };

            let (end, start) = self.join(points[i], d_in, d_out, max_in, max_out, advancement)?;
            self.quad(&previous, &end);
            previous = start;
        }

        let (d_last, len_last) = segment(points, last_segment);
        advancement += len_last;
        let end = self.end_cap(points[n - 1], d_last, advancement)?;
        self.quad(&previous, &end);

        Ok(())
    }

    fn closed_contour(&mut self, points: &[Point]) -> Result<(), GeometryBuilderError> {
        let n = points.len();

        let (d_wrap, len_wrap) = segment(points, n - 1);
        let (d0, len0) = segment(points, 0);
        let (wrap_end, first_start) =
            self.join(points[0], d_wrap, d0, len_wrap * 0.5, len0 * 0.5, 0.0)?;

        let mut previous = first_start;
        let mut advancement = 0.0;
        for i in 1..n {
            let (d_in, len_in) = segment(points, i - 1);
            let (d_out, len_out) = segment(points, i);
            advancement += len_in;

            let (end, start) =
                self.join(points[i], d_in, d_out, len_in * 0.5, len_out * 0.5, advancement)?;
            self.quad(&previous, &end);
            previous = start;
        }

        self.quad(&previous, &wrap_end);

        Ok(())
    }

    fn start_cap(&mut self, p: Point, d: Vector) -> Result<EdgePair, GeometryBuilderError> {
        let n = left_normal(d);
        match self.options.start_cap {
            LineCap::Butt => self.pair(p, n, 0.0),
            LineCap::Square => Ok(EdgePair {
                positive: self.vertex(p, n - d, Side::Positive, 0.0)?,
                negative: self.vertex(p, -n - d, Side::Negative, 0.0)?,
            }),
            LineCap::Round => {
                let pair = self.pair(p, n, 0.0)?;
                let center = self.center(p, 0.0)?;
                // Around the back of the contour, from the negative side to the positive one.
                self.arc(
                    center,
                    pair.negative,
                    pair.positive,
                    p,
                    -n,
                    -PI,
                    0.0,
                    side_of_normal(n),
                )?;

                Ok(pair)
            }
        }
    }

    fn end_cap(
        &mut self,
        p: Point,
        d: Vector,
        advancement: f32,
    ) -> Result<EdgePair, GeometryBuilderError> {
        let n = left_normal(d);
        match self.options.end_cap {
            LineCap::Butt => self.pair(p, n, advancement),
            LineCap::Square => Ok(EdgePair {
                positive: self.vertex(p, n + d, Side::Positive, advancement)?,
                negative: self.vertex(p, -n + d, Side::Negative, advancement)?,
            }),
            LineCap::Round => {
                let pair = self.pair(p, n, advancement)?;
                let center = self.center(p, advancement)?;
                self.arc(
                    center,
                    pair.positive,
                    pair.negative,
                    p,
                    n,
                    -PI,
                    advancement,
                    side_of_normal(n),
                )?;

                Ok(pair)
            }
        }
    }

    /// Emits the join at `p` and returns the vertices ending the incoming segment and
    /// the ones starting the outgoing segment.
    ///
    /// `max_in` and `max_out` are how far along each segment the inner corner may reach.
    fn join(
        &mut self,
        p: Point,
        d_in: Vector,
        d_out: Vector,
        max_in: f32,
        max_out: f32,
        advancement: f32,
    ) -> Result<(EdgePair, EdgePair), GeometryBuilderError> {
        let n_in = left_normal(d_in);
        let n_out = left_normal(d_out);
        let cross = d_in.cross(d_out);

        let m = match compute_normal(d_in, d_out) {
            Some(m) => m,
            None => return self.u_turn(p, d_in, advancement),
        };

        if cross.abs() < 1e-4 && d_in.dot(d_out) > 0.0 {
            let pair = self.pair(p, m, advancement)?;
            return Ok((pair, pair));
        }

        // Turning left, the outer side of the corner is the negative one.
        let s = if cross > 0.0 { -1.0 } else { 1.0 };
        let (outer_side, inner_side) = if s > 0.0 {
            (Side::Positive, Side::Negative)
        } else {
            (Side::Negative, Side::Positive)
        };

        let miter_length = m.length();
        let miter = match self.options.line_join {
            LineJoin::Miter | LineJoin::MiterClip => miter_length <= self.options.miter_limit,
            LineJoin::Round | LineJoin::Bevel => false,
        };

        let inner_extent = self.half_width * m.dot(d_in).abs();
        if inner_extent <= max_in && inner_extent <= max_out {
            // Both sides of the stroke share the intersection of the inner edges.
            let inner = self.vertex(p, m * -s, inner_side, advancement)?;

            if miter {
                let outer = self.vertex(p, m * s, outer_side, advancement)?;
                let pair = EdgePair::from_outer_inner(outer, inner, s);
                return Ok((pair, pair));
            }

            let outer_in = self.vertex(p, n_in * s, outer_side, advancement)?;
            let outer_out = self.vertex(p, n_out * s, outer_side, advancement)?;
            self.outer_join(inner, outer_in, outer_out, p, m * s, outer_side, advancement)?;

            return Ok((
                EdgePair::from_outer_inner(outer_in, inner, s),
                EdgePair::from_outer_inner(outer_out, inner, s),
            ));
        }

        // The inner edges intersect too far away: let both segments overlap around the
        // corner and pivot the join around the path itself.
        let center = self.center(p, advancement)?;
        let inner_in = self.vertex(p, n_in * -s, inner_side, advancement)?;
        let inner_out = self.vertex(p, n_out * -s, inner_side, advancement)?;
        let outer_in = self.vertex(p, n_in * s, outer_side, advancement)?;
        let outer_out = self.vertex(p, n_out * s, outer_side, advancement)?;

        if miter {
            let tip = self.vertex(p, m * s, outer_side, advancement)?;
            self.triangle(center, outer_in, tip);
            self.triangle(center, tip, outer_out);
        } else {
            self.outer_join(center, outer_in, outer_out, p, m * s, outer_side, advancement)?;
        }

        Ok((
            EdgePair::from_outer_inner(outer_in, inner_in, s),
            EdgePair::from_outer_inner(outer_out, inner_out, s),
        ))
    }

    /// Fills the outer side of a corner that isn't drawn as a miter.
    #[allow(clippy::too_many_arguments)]
    fn outer_join(
        &mut self,
        pivot: Emitted,
        outer_in: Emitted,
        outer_out: Emitted,
        p: Point,
        miter: Vector,
        side: Side,
        advancement: f32,
    ) -> Result<(), GeometryBuilderError> {
        let normal_in = (outer_in.position - p) / self.half_width;
        let normal_out = (outer_out.position - p) / self.half_width;

        match self.options.line_join {
            LineJoin::Miter | LineJoin::Bevel => {
                self.triangle(pivot, outer_in, outer_out);
            }
            LineJoin::MiterClip => {
                // The outer corners are at 1 / |m| from p along the bisector, the tip of
                // the miter at |m|. Cut both edges at the miter limit.
                let length = miter.length();
                let t = (self.options.miter_limit - 1.0 / length) / (length - 1.0 / length);
                let clip_in = normal_in + (miter - normal_in) * t;
                let clip_out = normal_out + (miter - normal_out) * t;

                let a = self.vertex(p, clip_in, side, advancement)?;
                let b = self.vertex(p, clip_out, side, advancement)?;
                self.triangle(pivot, outer_in, a);
                self.triangle(pivot, a, b);
                self.triangle(pivot, b, outer_out);
            }
            LineJoin::Round => {
                let sweep = angle_between(normal_in, normal_out);
                self.arc(
                    pivot,
                    outer_in,
                    outer_out,
                    p,
                    normal_in,
                    sweep,
                    advancement,
                    move |_| side,
                )?;
            }
        }

        Ok(())
    }

    /// The path goes back the way it came.
    fn u_turn(
        &mut self,
        p: Point,
        d_in: Vector,
        advancement: f32,
    ) -> Result<(EdgePair, EdgePair), GeometryBuilderError> {
        let n_in = left_normal(d_in);
        let end = self.pair(p, n_in, advancement)?;

        match self.options.line_join {
            LineJoin::Round => {
                let center = self.center(p, advancement)?;
                self.arc(
                    center,
                    end.positive,
                    end.negative,
                    p,
                    n_in,
                    -PI,
                    advancement,
                    side_of_normal(n_in),
                )?;
            }
            LineJoin::MiterClip => {
                let limit = self.options.miter_limit;
                let a = self.vertex(p, n_in + d_in * limit, Side::Positive, advancement)?;
                let b = self.vertex(p, -n_in + d_in * limit, Side::Negative, advancement)?;
                self.triangle(end.positive, a, b);
                self.triangle(end.positive, b, end.negative);
            }
            LineJoin::Miter | LineJoin::Bevel => {}
        }

        // The outgoing segment has its positive side where the incoming one had the negative.
        Ok((end, end.flipped()))
    }

    /// Emits the points of a circular arc around `p` and fans them from `pivot`.
    ///
    /// `first` and `last` are the existing vertices at both ends of the arc, `from` the
    /// direction of `first` from `p`.
    #[allow(clippy::too_many_arguments)]
    fn arc(
        &mut self,
        pivot: Emitted,
        first: Emitted,
        last: Emitted,
        p: Point,
        from: Vector,
        sweep: f32,
        advancement: f32,
        side_of: impl Fn(Vector) -> Side,
    ) -> Result<(), GeometryBuilderError> {
        let count = arc_segment_count(self.half_width, sweep.abs(), self.options.tolerance)
            .max((sweep.abs() / FRAC_PI_2) as u32);

        let step = sweep / count as f32;
        let mut previous = first;
        for i in 1..count {
            let normal = rotate(from, step * i as f32);
            let next = self.vertex(p, normal, side_of(normal), advancement)?;
            self.triangle(pivot, previous, next);
            previous = next;
        }
        self.triangle(pivot, previous, last);

        Ok(())
    }

    fn vertex(
        &mut self,
        position_on_path: Point,
        normal: Vector,
        side: Side,
        advancement: f32,
    ) -> Result<Emitted, GeometryBuilderError> {
        let vertex = StrokeVertex {
            position_on_path,
            normal,
            half_width: self.half_width,
            side,
            advancement,
        };
        let id = self.output.add_stroke_vertex(vertex)?;

        Ok(Emitted {
            id,
            position: vertex.position(),
        })
    }

    fn center(&mut self, p: Point, advancement: f32) -> Result<Emitted, GeometryBuilderError> {
        self.vertex(p, Vector::zero(), Side::Center, advancement)
    }

    fn pair(
        &mut self,
        p: Point,
        normal: Vector,
        advancement: f32,
    ) -> Result<EdgePair, GeometryBuilderError> {
        Ok(EdgePair {
            positive: self.vertex(p, normal, Side::Positive, advancement)?,
            negative: self.vertex(p, -normal, Side::Negative, advancement)?,
        })
    }

    /// Emits a counter-clockwise triangle, skipping degenerate ones.
    fn triangle(&mut self, a: Emitted, b: Emitted, c: Emitted) {
        if a.id == b.id || b.id == c.id || a.id == c.id {
            return;
        }

        let area = (b.position - a.position).cross(c.position - a.position);
        if area > 0.0 {
            self.output.add_triangle(a.id, b.id, c.id);
        } else if area < 0.0 {
            self.output.add_triangle(a.id, c.id, b.id);
        }
    }

    fn quad(&mut self, from: &EdgePair, to: &EdgePair) {
        self.triangle(from.positive, from.negative, to.negative);
        self.triangle(from.positive, to.negative, to.positive);
    }
}

/// Direction and length of the segment starting at `points[i]`, wrapping around.
fn segment(points: &[Point], i: usize) -> (Vector, f32) {
    let v = points[(i + 1) % points.len()] - points[i];
    let length = v.length();

    (v / length, length)
}

#[cfg(test)]
use crate::geometry_builder::{simple_builder, BuffersBuilder, Positions, VertexBuffers};
#[cfg(test)]
use crate::{TessellationError, GeometryBuilder};

#[cfg(test)]
fn stroke(path: &Path, options: &StrokeOptions) -> VertexBuffers<Point, u16> {
    let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
    StrokeTessellator::new()
        .tessellate_path(path, options, &mut simple_builder(&mut buffers))
        .unwrap();

    assert_eq!(buffers.indices.len() % 3, 0);
    for tri in buffers.indices.chunks(3) {
        let a = buffers.vertices[tri[0] as usize];
        let b = buffers.vertices[tri[1] as usize];
        let c = buffers.vertices[tri[2] as usize];
        assert!((b - a).cross(c - a) > 0.0, "clockwise triangle {:?}", tri);
    }

    buffers
}

#[cfg(test)]
fn polyline(points: &[Point], closed: bool) -> Path {
    let mut builder = Path::builder();
    builder.begin(points[0]).unwrap();
    for p in &points[1..] {
        builder.line_to(*p).unwrap();
    }
    if closed {
        builder.close().unwrap();
    } else {
        builder.end().unwrap();
    }

    builder.build().unwrap()
}

#[cfg(test)]
fn triangle_count(buffers: &VertexBuffers<Point, u16>) -> usize {
    buffers.indices.len() / 3
}

#[test]
fn single_segment_butt() {
    let path = polyline(&[point(0.0, 0.0), point(10.0, 0.0)], false);
    let buffers = stroke(&path, &StrokeOptions::default().with_line_width(4.0));

    assert_eq!(buffers.vertices.len(), 4);
    assert_eq!(triangle_count(&buffers), 2);
    for v in &buffers.vertices {
        assert_eq!(v.y.abs(), 2.0);
        assert!(v.x == 0.0 || v.x == 10.0);
    }
}

#[test]
fn square_caps_extend_the_segment() {
    let path = polyline(&[point(0.0, 0.0), point(10.0, 0.0)], false);
    let options = StrokeOptions::default()
        .with_line_width(4.0)
        .with_line_cap(LineCap::Square);
    let buffers = stroke(&path, &options);

    assert_eq!(buffers.vertices.len(), 4);
    assert_eq!(triangle_count(&buffers), 2);
    for v in &buffers.vertices {
        assert_eq!(v.y.abs(), 2.0);
        assert!(v.x == -2.0 || v.x == 12.0);
    }
}

#[test]
fn round_caps_stay_within_the_half_width() {
    let path = polyline(&[point(0.0, 0.0), point(10.0, 0.0)], false);
    let options = StrokeOptions::tolerance(0.01)
        .with_line_width(4.0)
        .with_start_cap(LineCap::Round)
        .with_end_cap(LineCap::Round);
    let buffers = stroke(&path, &options);

    assert!(buffers.vertices.len() > 6);
    let segment = crate::geom::LineSegment {
        from: point(0.0, 0.0),
        to: point(10.0, 0.0),
    };
    for v in &buffers.vertices {
        assert!(segment.distance_to_point(*v) <= 2.0 + 1e-4);
    }
    assert!(buffers.vertices.iter().any(|v| v.x < -1.9));
    assert!(buffers.vertices.iter().any(|v| v.x > 11.9));
}

#[test]
fn miter_join_within_limit() {
    let path = polyline(&[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)], false);
    let buffers = stroke(&path, &StrokeOptions::default());

    assert_eq!(buffers.vertices.len(), 6);
    assert_eq!(triangle_count(&buffers), 4);
    assert!(buffers.vertices.contains(&point(10.5, -0.5)));
    assert!(buffers.vertices.contains(&point(9.5, 0.5)));
}

#[test]
fn bevel_join() {
    let path = polyline(&[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)], false);
    let buffers = stroke(&path, &StrokeOptions::default().with_line_join(LineJoin::Bevel));

    assert_eq!(buffers.vertices.len(), 7);
    assert_eq!(triangle_count(&buffers), 5);
}

#[test]
fn miter_over_the_limit_is_a_bevel() {
    for points in [
        [point(0.0, 0.0), point(10.0, 0.0), point(0.0, 1.0)],
        [point(0.0, 0.0), point(10.0, 0.0), point(5.0, 1.0)],
    ] {
        let path = polyline(&points, false);
        let miter = stroke(&path, &StrokeOptions::default().with_line_join(LineJoin::Miter));
        let bevel = stroke(&path, &StrokeOptions::default().with_line_join(LineJoin::Bevel));

        assert_eq!(miter.vertices, bevel.vertices);
        assert_eq!(miter.indices, bevel.indices);

        // Clipping adds the two corners of the cut.
        let clip = stroke(&path, &StrokeOptions::default().with_line_join(LineJoin::MiterClip));
        assert_eq!(clip.vertices.len(), bevel.vertices.len() + 2);
        assert_eq!(triangle_count(&clip), triangle_count(&bevel) + 2);
    }
}

#[test]
fn miter_clip_within_limit_is_a_miter() {
    let path = polyline(&[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)], false);
    let miter = stroke(&path, &StrokeOptions::default().with_line_join(LineJoin::Miter));
    let clip = stroke(&path, &StrokeOptions::default().with_line_join(LineJoin::MiterClip));

    assert_eq!(miter.vertices, clip.vertices);
    assert_eq!(miter.indices, clip.indices);
}

#[test]
fn miter_clip_respects_the_limit() {
    let path = polyline(&[point(0.0, 0.0), point(10.0, 0.0), point(0.0, 2.0)], false);
    let options = StrokeOptions::default()
        .with_line_width(2.0)
        .with_line_join(LineJoin::MiterClip)
        .with_miter_limit(2.0);
    let buffers = stroke(&path, &options);
    let corner = point(10.0, 0.0);

    // The cut is at twice the half width from the corner, along the bisector.
    let tip = buffers
        .vertices
        .iter()
        .filter(|v| v.x > 5.0)
        .map(|v| (*v - corner).length())
        .fold(0.0, f32::max);
    assert!(tip > 2.0);
    assert!(tip <= 3.0);
    assert!(buffers.vertices.iter().any(|v| v.x > 11.5));
}

#[test]
fn round_join_stays_within_the_half_width() {
    let points = [point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0), point(0.0, 3.0)];
    let path = polyline(&points, false);
    let options = StrokeOptions::tolerance(0.01)
        .with_line_width(2.0)
        .with_line_join(LineJoin::Round);
    let buffers = stroke(&path, &options);
    let bevel = stroke(&path, &options.with_line_join(LineJoin::Bevel));

    assert!(triangle_count(&buffers) > triangle_count(&bevel));
    for v in &buffers.vertices {
        let distance = points
            .windows(2)
            .map(|w| crate::geom::LineSegment { from: w[0], to: w[1] }.distance_to_point(*v))
            .fold(f32::MAX, f32::min);
        assert!(distance <= 1.0 + 1e-3, "{:?} is {} away from the path", v, distance);
    }
}

#[test]
fn closed_square() {
    let path = polyline(
        &[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0), point(0.0, 10.0)],
        true,
    );
    let buffers = stroke(&path, &StrokeOptions::default().with_line_width(2.0));

    // A miter on each corner, no caps.
    assert_eq!(buffers.vertices.len(), 8);
    assert_eq!(triangle_count(&buffers), 8);
    for corner in [point(-1.0, -1.0), point(11.0, 11.0), point(1.0, 1.0), point(9.0, 9.0)] {
        assert!(buffers.vertices.contains(&corner));
    }
}

#[test]
fn closing_point_is_not_duplicated() {
    let open = polyline(
        &[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0), point(0.0, 0.0)],
        true,
    );
    let closed = polyline(&[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)], true);

    let a = stroke(&open, &StrokeOptions::default());
    let b = stroke(&closed, &StrokeOptions::default());
    assert_eq!(a.vertices, b.vertices);
    assert_eq!(a.indices, b.indices);
}

#[test]
fn u_turns() {
    let path = polyline(&[point(0.0, 0.0), point(10.0, 0.0), point(0.0, 0.0)], false);

    let miter = stroke(&path, &StrokeOptions::default());
    assert_eq!(miter.vertices.len(), 6);
    assert_eq!(triangle_count(&miter), 4);

    let round = stroke(&path, &StrokeOptions::default().with_line_join(LineJoin::Round));
    assert!(triangle_count(&round) > 4);
    assert!(round.vertices.iter().all(|v| v.x <= 10.5 + 1e-4));

    let clip = stroke(&path, &StrokeOptions::default().with_line_join(LineJoin::MiterClip));
    assert_eq!(triangle_count(&clip), 6);

    // Closed contours of two points turn around at both ends.
    let closed = polyline(&[point(0.0, 0.0), point(10.0, 0.0)], true);
    let buffers = stroke(&closed, &StrokeOptions::default().with_line_join(LineJoin::Round));
    assert!(triangle_count(&buffers) > 4);
}

#[test]
fn zero_length_contours() {
    let mut builder = Path::builder();
    builder.begin(point(5.0, 5.0)).unwrap();
    builder.line_to(point(5.0, 5.0)).unwrap();
    builder.end().unwrap();
    builder.begin(point(1.0, 1.0)).unwrap();
    builder.line_to(point(1.0, 1.0)).unwrap();
    builder.close().unwrap();
    let path = builder.build().unwrap();

    for cap in [LineCap::Butt, LineCap::Square, LineCap::Round] {
        let buffers = stroke(&path, &StrokeOptions::default().with_line_cap(cap));
        assert!(buffers.vertices.is_empty());
        assert!(buffers.indices.is_empty());
    }
}

#[test]
fn curves_are_flattened() {
    let mut builder = Path::builder();
    builder.begin(point(0.0, 0.0)).unwrap();
    builder
        .cubic_bezier_to(point(0.0, 10.0), point(10.0, 10.0), point(10.0, 0.0))
        .unwrap();
    builder.end().unwrap();
    let path = builder.build().unwrap();

    let coarse = stroke(&path, &StrokeOptions::tolerance(1.0));
    let fine = stroke(&path, &StrokeOptions::tolerance(0.01));
    assert!(fine.vertices.len() > coarse.vertices.len());
}

#[test]
fn invalid_options() {
    let path = polyline(&[point(0.0, 0.0), point(10.0, 0.0)], false);
    let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
    let mut tess = StrokeTessellator::new();

    for (options, expected) in [
        (StrokeOptions::default().with_line_width(0.0), crate::InvalidOptions::LineWidth),
        (StrokeOptions::default().with_miter_limit(0.9), crate::InvalidOptions::MiterLimit),
        (StrokeOptions::tolerance(0.0), crate::InvalidOptions::Tolerance),
    ] {
        let result = tess.tessellate_path(&path, &options, &mut simple_builder(&mut buffers));
        assert_eq!(result, Err(TessellationError::InvalidOptions(expected)));
    }

    assert!(buffers.vertices.is_empty());
}

#[test]
fn non_finite_input() {
    let events = [
        PathEvent::Begin {
            at: point(0.0, 0.0),
        },
        PathEvent::Line {
            from: point(0.0, 0.0),
            to: point(10.0, f32::NAN),
        },
        PathEvent::End {
            last: point(10.0, f32::NAN),
            first: point(0.0, 0.0),
            close: false,
        },
    ];

    let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
    let result = StrokeTessellator::new().tessellate(
        events,
        &StrokeOptions::default(),
        &mut simple_builder(&mut buffers),
    );

    assert_eq!(
        result,
        Err(TessellationError::GeometryBuilder(GeometryBuilderError::InvalidVertex))
    );
    assert!(buffers.vertices.is_empty());
    assert!(buffers.indices.is_empty());
}

#[test]
fn too_many_vertices() {
    struct CountAborts<'l> {
        builder: BuffersBuilder<'l, Point, u8, Positions>,
        aborted: bool,
    }

    impl<'l> GeometryBuilder for CountAborts<'l> {
        fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
            self.builder.add_triangle(a, b, c);
        }
        fn abort_geometry(&mut self) {
            self.aborted = true;
        }
    }

    impl<'l> StrokeGeometryBuilder for CountAborts<'l> {
        fn add_stroke_vertex(
            &mut self,
            vertex: StrokeVertex,
        ) -> Result<VertexId, GeometryBuilderError> {
            self.builder.add_stroke_vertex(vertex)
        }
    }

    let mut builder = Path::builder();
    builder.begin(point(0.0, 0.0)).unwrap();
    for i in 1..200 {
        builder
            .line_to(point(i as f32 * 10.0, (i % 2) as f32 * 10.0))
            .unwrap();
    }
    builder.end().unwrap();
    let path = builder.build().unwrap();

    let mut buffers: VertexBuffers<Point, u8> = VertexBuffers::new();
    let mut output = CountAborts {
        builder: BuffersBuilder::new(&mut buffers, Positions),
        aborted: false,
    };
    let result = StrokeTessellator::new().tessellate_path(
        &path,
        &StrokeOptions::default().with_line_join(LineJoin::Round),
        &mut output,
    );

    assert_eq!(
        result,
        Err(TessellationError::GeometryBuilder(GeometryBuilderError::TooManyVertices))
    );
    assert!(output.aborted);

    // What was emitted before the error is kept and only references stored vertices.
    assert_eq!(buffers.vertices.len(), 255);
    assert!(!buffers.indices.is_empty());
    assert!(buffers.indices.iter().all(|&i| (i as usize) < buffers.vertices.len()));
}

#[test]
fn vertex_attributes() {
    let path = polyline(&[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)], false);

    let mut buffers: VertexBuffers<StrokeVertex, u16> = VertexBuffers::new();
    StrokeTessellator::new()
        .tessellate_path(
            &path,
            &StrokeOptions::default().with_line_width(2.0),
            &mut BuffersBuilder::new(&mut buffers, |v: StrokeVertex| v),
        )
        .unwrap();
    let vertices = &buffers.vertices;

    for v in vertices {
        assert_eq!(v.line_width(), 2.0);
        assert_eq!(v.position(), v.position_on_path() + v.normal());
        match v.side() {
            Side::Positive | Side::Negative => assert!(v.normal().length() >= 1.0 - 1e-5),
            Side::Center => assert_eq!(v.normal(), Vector::zero()),
        }
    }

    let last = vertices.last().unwrap();
    assert_eq!(last.position_on_path(), point(10.0, 10.0));
    assert_eq!(last.advancement(), 20.0);
    assert_eq!(vertices[0].advancement(), 0.0);
}
