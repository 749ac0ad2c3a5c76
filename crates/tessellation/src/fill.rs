use crate::event_queue::{from_sweep_space, EdgeData, EventQueue, EventQueueBuilder};
use crate::geom::LineSegment;
use crate::math::*;
use crate::monotone::MonotoneTessellator;
use crate::path::{FillRule, Path, PathEvent};
use crate::{FillGeometryBuilder, FillOptions, Orientation, VertexId};
use crate::{InternalError, TessellationResult};

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::mem;
use core::ops::Range;
use float_next_after::NextAfter;

#[cfg(not(feature = "std"))]
use num_traits::Float;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn is_right(self) -> bool {
        self == Side::Right
    }
}

type SpanIdx = i32;
type ActiveEdgeIdx = usize;

#[cfg(debug_assertions)]
macro_rules! tess_log {
    ($obj:ident, $($arg:tt)+) => {
        if $obj.log {
            log::trace!($($arg)+);
        }
    };
}

#[cfg(not(debug_assertions))]
macro_rules! tess_log {
    ($obj:ident, $($arg:tt)+) => {};
}

/// Orders two edge directions leaving the same point from left to right.
///
/// Both vectors point downward in sweep order, so the cross product is enough.
fn compare_directions(a: Vector, b: Vector) -> Ordering {
    let cross = a.cross(b);
    if cross < 0.0 {
        Ordering::Less
    } else if cross > 0.0 {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

fn directions_are_close(a: Vector, b: Vector) -> bool {
    const THRESHOLD: f32 = 0.00005;
    a.dot(b) > 0.0 && a.cross(b).abs() <= THRESHOLD * a.length() * b.length()
}

#[derive(Copy, Clone, Debug)]
struct WindingState {
    span_index: SpanIdx,
    number: i16,
    is_in: bool,
}

impl WindingState {
    fn new() -> Self {
        // Entering the first span bumps the index to zero.
        WindingState {
            span_index: -1,
            number: 0,
            is_in: false,
        }
    }

    fn update(&mut self, fill_rule: FillRule, edge_winding: i16) {
        self.number += edge_winding;
        self.is_in = fill_rule.is_in(self.number);
        if self.is_in {
            self.span_index += 1;
        }
    }
}

/// What the current event does to the active edges, gathered before anything
/// is modified.
struct ActiveEdgeScan {
    vertex_events: Vec<(SpanIdx, Side)>,
    edges_to_split: Vec<ActiveEdgeIdx>,
    spans_to_end: Vec<SpanIdx>,
    merge_event: bool,
    split_event: bool,
    merge_split_event: bool,
    // Inside on both sides of the point: without edges below, it is a merge vertex.
    in_around_vertex: bool,
    is_empty: bool,
    above: Range<ActiveEdgeIdx>,
    winding_before_point: WindingState,
}

impl ActiveEdgeScan {
    fn new() -> Self {
        ActiveEdgeScan {
            vertex_events: Vec::new(),
            edges_to_split: Vec::new(),
            spans_to_end: Vec::new(),
            merge_event: false,
            split_event: false,
            merge_split_event: false,
            in_around_vertex: false,
            is_empty: false,
            above: 0..0,
            winding_before_point: WindingState::new(),
        }
    }

    fn reset(&mut self) {
        self.vertex_events.clear();
        self.edges_to_split.clear();
        self.spans_to_end.clear();
        self.merge_event = false;
        self.split_event = false;
        self.merge_split_event = false;
        self.in_around_vertex = false;
        self.is_empty = false;
        self.above = 0..0;
        self.winding_before_point = WindingState::new();
    }
}

/// An edge crossing the sweep line, or the placeholder of an unresolved merge
/// vertex (`is_merge`, with `from == to`).
#[derive(Copy, Clone, Debug)]
struct ActiveEdge {
    from: Point,
    to: Point,
    winding: i16,
    is_merge: bool,
    from_id: VertexId,
}

impl ActiveEdge {
    #[inline]
    fn min_x(&self) -> f32 {
        self.from.x.min(self.to.x)
    }

    #[inline]
    fn max_x(&self) -> f32 {
        self.from.x.max(self.to.x)
    }

    fn solve_x_for_y(&self, y: f32) -> f32 {
        // Keep the result in the x range of the edge so that it agrees with the
        // min_x/max_x shortcuts of the scan.
        LineSegment {
            from: self.from,
            to: self.to,
        }
        .solve_x_for_y(y)
        .max(self.min_x())
        .min(self.max_x())
    }

    /// Where the edge crosses the sweep line relative to `p`.
    ///
    /// Horizontal edges overlapping `p` and edges passing within `tolerance` of it
    /// count as touching.
    fn side_of(&self, p: Point, tolerance: f32) -> EdgeSide {
        if self.to == p {
            return EdgeSide::Touching;
        }
        if self.max_x() < p.x {
            return EdgeSide::Left;
        }
        if self.min_x() > p.x {
            return EdgeSide::Right;
        }
        if self.from.y == self.to.y {
            return EdgeSide::Touching;
        }

        let dx = self.solve_x_for_y(p.y) - p.x;
        match dx {
            _ if dx.abs() <= tolerance => EdgeSide::Touching,
            _ if dx < 0.0 => EdgeSide::Left,
            _ => EdgeSide::Right,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum EdgeSide {
    Left,
    Touching,
    Right,
}

struct Span {
    tess: Option<MonotoneTessellator>,
}

/// The monotone pieces between pairs of active edges, left to right.
struct Spans {
    spans: Vec<Span>,
    pool: Vec<MonotoneTessellator>,
}

impl Spans {
    fn new() -> Self {
        Spans {
            spans: Vec::new(),
            pool: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.spans.len()
    }

    fn tess(&mut self, span_idx: SpanIdx) -> Result<&mut MonotoneTessellator, InternalError> {
        usize::try_from(span_idx)
            .ok()
            .and_then(|idx| self.spans.get_mut(idx))
            .and_then(|span| span.tess.as_mut())
            .ok_or(InternalError::InsufficientNumberOfSpans)
    }

    fn begin_span(
        &mut self,
        span_idx: SpanIdx,
        position: &Point,
        vertex: VertexId,
    ) -> Result<(), InternalError> {
        let idx = usize::try_from(span_idx).map_err(|_| InternalError::InsufficientNumberOfSpans)?;
        if idx > self.spans.len() {
            return Err(InternalError::InsufficientNumberOfSpans);
        }

        let mut tess = self.pool.pop().unwrap_or_else(MonotoneTessellator::new);
        tess.begin(*position, vertex);
        self.spans.insert(idx, Span { tess: Some(tess) });

        Ok(())
    }

    fn end_span(
        &mut self,
        span_idx: SpanIdx,
        position: &Point,
        vertex: VertexId,
        output: &mut dyn FillGeometryBuilder,
    ) -> Result<(), InternalError> {
        let tess = usize::try_from(span_idx)
            .ok()
            .and_then(|idx| self.spans.get_mut(idx))
            .and_then(|span| span.tess.take());

        let mut tess = tess.ok_or(InternalError::InsufficientNumberOfSpans)?;
        tess.end(*position, vertex);
        tess.flush(output);
        self.pool.push(tess);

        Ok(())
    }

    fn cleanup_spans(&mut self) {
        // Spans that ended during this event have no tessellator anymore.
        self.spans.retain(|span| span.tess.is_some());
    }

    fn flush_all(&mut self, output: &mut dyn FillGeometryBuilder) {
        for span in &mut self.spans {
            if let Some(tess) = span.tess.as_mut() {
                tess.flush(output);
            }
        }
        self.spans.clear();
    }
}

/// A vertex produced by the fill tessellator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FillVertex {
    pub(crate) position: Point,
}

impl FillVertex {
    pub(crate) fn new(position: Point) -> Self {
        FillVertex { position }
    }

    /// The position of the vertex, in the coordinate space of the input path.
    pub fn position(&self) -> Point {
        self.position
    }
}

/// A sweep-line tessellator for path fills.
///
/// Positions are visited in sweep order. A sorted list of active edges tracks the
/// edges crossing the sweep line and, together with the fill rule, the spans of
/// the shape's interior between them. Each span is a monotone polygon that is
/// triangulated as its vertices come in. Split and merge vertices are resolved by
/// connecting them to the span they split or merge, so spans stay monotone.
///
/// When intersections are handled, every edge entering the sweep line is tested
/// against the active edges. Crossing edges are cut at the intersection and their
/// lower parts go back into the event queue, so the sweep never sees edges that
/// cross each other.
///
/// A vertex is emitted for each distinct position the sweep line visits. Output
/// triangles are counter-clockwise (positive signed area).
///
/// The tessellator keeps its allocations between calls, reuse it when tessellating
/// many paths.
///
/// # Examples
///
/// ```
/// use pathmesh_tessellation::{FillTessellator, FillOptions, VertexBuffers, simple_builder};
/// use pathmesh_tessellation::math::{box2d, Point};
/// use pathmesh_tessellation::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = Path::builder();
/// builder.add_rect(&box2d(0.0, 0.0, 100.0, 50.0))?;
/// let path = builder.build()?;
///
/// let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
/// let mut tessellator = FillTessellator::new();
/// tessellator.tessellate_path(&path, &FillOptions::default(), &mut simple_builder(&mut buffers))?;
///
/// assert_eq!(buffers.vertices.len(), 4);
/// assert_eq!(buffers.indices.len(), 6);
/// # Ok(())
/// # }
/// ```
pub struct FillTessellator {
    current_position: Point,
    current_vertex: VertexId,
    active: Vec<ActiveEdge>,
    edges_below: Vec<EdgeData>,
    spans: Spans,
    events: EventQueue,
    scan: ActiveEdgeScan,
    fill_rule: FillRule,
    orientation: Orientation,
    tolerance: f32,
    handle_intersections: bool,
    log: bool,
}

impl Default for FillTessellator {
    fn default() -> Self {
        Self::new()
    }
}

impl FillTessellator {
    pub fn new() -> Self {
        #[cfg(all(debug_assertions, feature = "std"))]
        let log = std::env::var("PATHMESH_FORCE_LOGGING").is_ok();

        #[cfg(not(all(debug_assertions, feature = "std")))]
        let log = false;

        FillTessellator {
            current_position: point(f32::MIN, f32::MIN),
            current_vertex: VertexId::INVALID,
            active: Vec::new(),
            edges_below: Vec::new(),
            spans: Spans::new(),
            events: EventQueue::new(),
            scan: ActiveEdgeScan::new(),
            fill_rule: FillRule::EvenOdd,
            orientation: Orientation::Vertical,
            tolerance: FillOptions::DEFAULT_TOLERANCE,
            handle_intersections: true,
            log,
        }
    }

    /// Compute the tessellation from a path iterator.
    ///
    /// Options are validated and the input is checked for non-finite coordinates
    /// before the output is touched. If the output fails to add a vertex, the
    /// tessellation stops, `abort_geometry` is called and the error is returned.
    pub fn tessellate(
        &mut self,
        path: impl IntoIterator<Item = PathEvent>,
        options: &FillOptions,
        output: &mut dyn FillGeometryBuilder,
    ) -> TessellationResult {
        options.validate()?;

        self.reset();
        self.fill_rule = options.fill_rule;
        self.orientation = options.sweep_orientation;
        self.tolerance = options.tolerance * 0.5;
        self.handle_intersections = options.handle_intersections;

        let stats = EventQueueBuilder::new(&mut self.events, options.tolerance, self.orientation)
            .build(path)?;

        log::debug!(
            "fill: {} contours ({} dropped), {} edges, {:?}, {:?} sweep",
            stats.contours,
            stats.dropped_contours,
            stats.edges,
            self.fill_rule,
            self.orientation,
        );

        output.begin_geometry();

        let mut scan = mem::replace(&mut self.scan, ActiveEdgeScan::new());
        let result = self.tessellator_loop(&mut scan, output);
        self.scan = scan;

        if let Err(e) = result {
            log::debug!("fill tessellation aborted: {}", e);
            output.abort_geometry();
            self.reset();

            return Err(e);
        }

        if !self.active.is_empty() {
            log::warn!("fill: {} active edges left after the sweep", self.active.len());
            self.active.clear();
        }

        // Nothing should be left at this point, but don't lose triangles if something is.
        self.spans.flush_all(output);

        output.end_geometry();

        Ok(())
    }

    /// Tessellate a `Path`.
    pub fn tessellate_path(
        &mut self,
        path: &Path,
        options: &FillOptions,
        output: &mut dyn FillGeometryBuilder,
    ) -> TessellationResult {
        self.tessellate(path.iter(), options, output)
    }

    /// Enable/disable per-event tracing of the sweep (debug builds only).
    ///
    /// Setting the `PATHMESH_FORCE_LOGGING` environment variable forces it on.
    pub fn set_logging(&mut self, is_enabled: bool) {
        #[cfg(all(debug_assertions, feature = "std"))]
        let forced = std::env::var("PATHMESH_FORCE_LOGGING").is_ok();

        #[cfg(not(all(debug_assertions, feature = "std")))]
        let forced = false;

        self.log = is_enabled || forced;
    }

    fn tessellator_loop(
        &mut self,
        scan: &mut ActiveEdgeScan,
        output: &mut dyn FillGeometryBuilder,
    ) -> TessellationResult {
        while let Some(position) = self.events.pop(&mut self.edges_below) {
            debug_assert!(is_after(position, self.current_position));
            self.current_position = position;

            tess_log!(
                self,
                "event at {:?}, {} edges below",
                position,
                self.edges_below.len()
            );

            self.sort_edges_below();
            self.handle_coincident_edges_below();

            if let Err(e) = self.scan_active_edges(scan) {
                log::warn!(
                    "fill: recovering from {} at {:?}",
                    e,
                    from_sweep_space(position, self.orientation)
                );
                self.recover_from_error(output)?;
                self.scan_active_edges(scan)?;
            }

            if scan.is_empty {
                // Everything that used to start or end here has cancelled out.
                tess_log!(self, "skip empty event");
                continue;
            }

            self.current_vertex =
                output.add_fill_vertex(FillVertex::new(from_sweep_space(position, self.orientation)))?;

            self.process_edges_above(scan, output)?;
            self.process_edges_below(scan)?;
            self.update_active_edges(scan);
        }

        Ok(())
    }

    fn scan_active_edges(&self, scan: &mut ActiveEdgeScan) -> Result<(), InternalError> {
        scan.reset();

        let current_x = self.current_position.x;
        let mut connecting_edges = false;
        let mut active_edge_idx = 0;
        let mut winding = WindingState::new();
        let mut previous_was_merge = false;

        // Edges on the left of the current point.
        for active_edge in &self.active {
            if active_edge.is_merge {
                // The spans on each side of a pending merge vertex are adjacent,
                // there is no edge transition to bump the span index.
                winding.span_index += 1;
                active_edge_idx += 1;
                previous_was_merge = true;

                continue;
            }

            match active_edge.side_of(self.current_position, self.tolerance) {
                EdgeSide::Left => {}
                EdgeSide::Touching => {
                    connecting_edges = true;
                    break;
                }
                EdgeSide::Right => break,
            }

            winding.update(self.fill_rule, active_edge.winding);
            previous_was_merge = false;
            active_edge_idx += 1;
        }

        if !connecting_edges && self.edges_below.is_empty() {
            scan.is_empty = true;
            return Ok(());
        }

        scan.above.start = active_edge_idx;
        scan.winding_before_point = winding;

        if previous_was_merge {
            // The merge placeholder on the left is resolved by the current point.
            scan.winding_before_point.span_index -= 1;
            scan.above.start -= 1;

            if !connecting_edges {
                // Only edges below: the merge and the split cancel each other out.
                scan.vertex_events.push((winding.span_index - 1, Side::Right));
                scan.vertex_events.push((winding.span_index, Side::Left));
                scan.merge_split_event = true;
                tess_log!(self, "merge + split");
            }
        }

        scan.split_event = !connecting_edges && winding.is_in && !scan.merge_split_event;

        // Edges that end at the current point or pass through it.
        if connecting_edges {
            let in_before_vertex = winding.is_in;
            let mut first_connecting_edge = !previous_was_merge;

            for active_edge in &self.active[active_edge_idx..] {
                if active_edge.is_merge {
                    if !winding.is_in {
                        return Err(InternalError::MergeVertexOutside);
                    }

                    // The span between the previous connecting edge and the merge
                    // ends here, the one on the right of the merge continues.
                    scan.spans_to_end.push(winding.span_index);
                    winding.span_index += 1;
                    active_edge_idx += 1;
                    first_connecting_edge = false;

                    continue;
                }

                if !self.is_edge_connecting(active_edge, active_edge_idx, scan)? {
                    break;
                }

                if !first_connecting_edge && winding.is_in {
                    scan.spans_to_end.push(winding.span_index);
                }

                winding.update(self.fill_rule, active_edge.winding);

                if winding.is_in && winding.span_index >= self.spans.len() as SpanIdx {
                    return Err(InternalError::InsufficientNumberOfSpans);
                }

                active_edge_idx += 1;
                first_connecting_edge = false;
            }

            let in_after_vertex = winding.is_in;

            scan.in_around_vertex = in_before_vertex && in_after_vertex;
            scan.merge_event = scan.in_around_vertex
                && self.edges_below.is_empty()
                && scan.edges_to_split.is_empty();

            if in_before_vertex {
                scan.vertex_events
                    .push((scan.winding_before_point.span_index, Side::Right));
            }

            if in_after_vertex {
                scan.vertex_events.push((winding.span_index, Side::Left));
            }
        }

        scan.above.end = active_edge_idx;

        tess_log!(
            self,
            "above: {:?}, split: {}, merge: {}",
            scan.above,
            scan.split_event,
            scan.merge_event
        );

        self.check_remaining_edges(active_edge_idx, current_x)
    }

    /// Edges on the right of the current point must really be on its right.
    fn check_remaining_edges(
        &self,
        active_edge_idx: usize,
        current_x: f32,
    ) -> Result<(), InternalError> {
        for active_edge in &self.active[active_edge_idx..] {
            if active_edge.is_merge {
                continue;
            }

            if active_edge.max_x() < current_x {
                return Err(InternalError::IncorrectActiveEdgeOrder(1));
            }

            if active_edge.to == self.current_position {
                return Err(InternalError::IncorrectActiveEdgeOrder(2));
            }

            if active_edge.min_x() < current_x
                && active_edge.solve_x_for_y(self.current_position.y) < current_x
            {
                return Err(InternalError::IncorrectActiveEdgeOrder(3));
            }
        }

        Ok(())
    }

    /// Whether the edge ends at the current point or passes within the tolerance
    /// of it. The latter are recorded in `edges_to_split`.
    fn is_edge_connecting(
        &self,
        active_edge: &ActiveEdge,
        active_edge_idx: usize,
        scan: &mut ActiveEdgeScan,
    ) -> Result<bool, InternalError> {
        let p = self.current_position;
        if active_edge.to == p {
            return Ok(true);
        }

        if active_edge.max_x() + self.tolerance < p.x || active_edge.to.y < p.y {
            return Err(InternalError::IncorrectActiveEdgeOrder(4));
        }

        // An edge ending slightly before the point may still be within the
        // tolerance of it.
        let side = if active_edge.max_x() < p.x {
            let x = if active_edge.from.y == active_edge.to.y {
                active_edge.to.x
            } else {
                active_edge.solve_x_for_y(p.y)
            };
            if p.x - x <= self.tolerance {
                EdgeSide::Touching
            } else {
                EdgeSide::Left
            }
        } else {
            active_edge.side_of(p, self.tolerance)
        };

        match side {
            EdgeSide::Touching => {
                tess_log!(self, "point on edge {:?} -> {:?}", active_edge.from, active_edge.to);
                scan.edges_to_split.push(active_edge_idx);
                Ok(true)
            }
            EdgeSide::Left => Err(InternalError::IncorrectActiveEdgeOrder(5)),
            EdgeSide::Right => Ok(false),
        }
    }

    fn process_edges_above(
        &mut self,
        scan: &mut ActiveEdgeScan,
        output: &mut dyn FillGeometryBuilder,
    ) -> Result<(), InternalError> {
        for &(span_index, side) in &scan.vertex_events {
            tess_log!(self, "vertex event, span {} {:?}", span_index, side);
            self.spans
                .tess(span_index)?
                .vertex(self.current_position, self.current_vertex, side);
        }

        for &span_index in &scan.spans_to_end {
            tess_log!(self, "end span {}", span_index);
            self.spans
                .end_span(span_index, &self.current_position, self.current_vertex, output)?;
        }

        self.spans.cleanup_spans();

        for &edge_idx in &scan.edges_to_split {
            let active_edge = &mut self.active[edge_idx];
            self.edges_below.push(EdgeData {
                to: active_edge.to,
                winding: active_edge.winding,
            });
            active_edge.to = self.current_position;
        }

        if !scan.edges_to_split.is_empty() {
            self.sort_edges_below();
            self.handle_coincident_edges_below();

            // The remainder of a split edge can cancel out with an edge going back
            // along it, in which case nothing continues below the point.
            if scan.in_around_vertex && self.edges_below.is_empty() {
                tess_log!(self, "split edges cancelled out, merge");
                scan.merge_event = true;
            }
        }

        if scan.merge_event {
            // The first edge above becomes the placeholder of the merge vertex, which
            // is resolved by the next point showing up between the two spans.
            let edge = &mut self.active[scan.above.start];
            edge.is_merge = true;
            edge.from = self.current_position;
            edge.to = self.current_position;
            edge.winding = 0;
            edge.from_id = self.current_vertex;

            scan.above.start += 1;
        }

        Ok(())
    }

    fn process_edges_below(&mut self, scan: &ActiveEdgeScan) -> Result<(), InternalError> {
        let mut winding = scan.winding_before_point;

        if scan.split_event {
            let left_enclosing_edge_idx = scan
                .above
                .start
                .checked_sub(1)
                .ok_or(InternalError::IncorrectActiveEdgeOrder(6))?;
            self.split_event(left_enclosing_edge_idx, winding.span_index)?;
        }

        // Each in-out transition between two edges below starts a new span.
        let mut first_pending_edge = true;
        for pending_edge in &self.edges_below {
            if !first_pending_edge && winding.is_in {
                tess_log!(self, "begin span {}", winding.span_index);
                self.spans.begin_span(
                    winding.span_index,
                    &self.current_position,
                    self.current_vertex,
                )?;
            }
            winding.update(self.fill_rule, pending_edge.winding);
            first_pending_edge = false;
        }

        Ok(())
    }

    fn update_active_edges(&mut self, scan: &ActiveEdgeScan) {
        let above = scan.above.clone();

        if self.handle_intersections {
            self.handle_intersections(above.clone());
        }

        let from = self.current_position;
        let from_id = self.current_vertex;
        self.active.splice(
            above,
            self.edges_below.drain(..).map(|edge| ActiveEdge {
                from,
                to: edge.to,
                winding: edge.winding,
                is_merge: false,
                from_id,
            }),
        );
    }

    /// The current point is inside a span and has no edge above: connect it to the
    /// lowest of the two upper endpoints of the enclosing edges, which splits the
    /// span in two.
    fn split_event(
        &mut self,
        left_enclosing_edge_idx: ActiveEdgeIdx,
        left_span_idx: SpanIdx,
    ) -> Result<(), InternalError> {
        let right_enclosing_edge_idx = left_enclosing_edge_idx + 1;

        let left = *self
            .active
            .get(left_enclosing_edge_idx)
            .ok_or(InternalError::IncorrectActiveEdgeOrder(7))?;
        let right = *self
            .active
            .get(right_enclosing_edge_idx)
            .ok_or(InternalError::IncorrectActiveEdgeOrder(7))?;

        let right_span_idx = left_span_idx + 1;

        let (upper_position, upper_id, new_span_idx) = if is_after(left.from, right.from) {
            (left.from, left.from_id, left_span_idx)
        } else {
            (right.from, right.from_id, right_span_idx)
        };

        tess_log!(self, "split event, connect to {:?}", upper_position);

        self.spans
            .begin_span(new_span_idx, &upper_position, upper_id)?;

        self.spans.tess(left_span_idx)?.vertex(
            self.current_position,
            self.current_vertex,
            Side::Right,
        );
        self.spans.tess(right_span_idx)?.vertex(
            self.current_position,
            self.current_vertex,
            Side::Left,
        );

        Ok(())
    }

    /// Tests the edges starting at the current point against the active edges.
    ///
    /// For each new edge only the first intersection is kept. Both edges are cut
    /// there and their lower parts are queued, starting at the intersection.
    fn handle_intersections(&mut self, skip_range: Range<usize>) {
        let current = self.current_position;

        for below_idx in 0..self.edges_below.len() {
            let below = self.edges_below[below_idx];
            let below_segment = LineSegment {
                from: current,
                to: below.to,
            };
            let below_segment_f64 = below_segment.to_f64();
            let below_box = below_segment.bounding_box();

            let mut closest: Option<(f64, usize, Point)> = None;

            for (active_idx, active_edge) in self.active.iter().enumerate() {
                if active_edge.is_merge || skip_range.contains(&active_idx) {
                    continue;
                }

                if active_edge.max_x() < below_box.min.x
                    || active_edge.min_x() > below_box.max.x
                    || active_edge.from.y > below_box.max.y
                {
                    continue;
                }

                let active_segment = LineSegment {
                    from: active_edge.from,
                    to: active_edge.to,
                }
                .to_f64();

                let (tb, ta) = match below_segment_f64.intersection_t(&active_segment) {
                    Some(t) => t,
                    None => continue,
                };

                // Intersections at endpoints are points on edges, the scan splits
                // those when it reaches them.
                if tb <= 0.0 || tb >= 1.0 || ta <= 0.0 || ta >= 1.0 {
                    continue;
                }

                if let Some((closest_t, _, _)) = closest {
                    if closest_t <= tb {
                        continue;
                    }
                }

                let p = below_segment_f64.sample(tb);
                let mut intersection = point(p.x as f32, p.y as f32);

                if !is_after(intersection, current) {
                    intersection.x = current.x.next_after(f32::INFINITY);
                    intersection.y = current.y;
                }

                if !is_after(below.to, intersection) || !is_after(active_edge.to, intersection) {
                    continue;
                }

                closest = Some((tb, active_idx, intersection));
            }

            if let Some((_, active_idx, intersection)) = closest {
                tess_log!(self, "intersection at {:?}", intersection);

                let active_edge = &mut self.active[active_idx];
                let active_to = active_edge.to;
                active_edge.to = intersection;
                self.events
                    .push_edge(intersection, active_to, active_edge.winding);

                self.events
                    .push_edge(intersection, below.to, below.winding);
                self.edges_below[below_idx].to = intersection;
            }
        }
    }

    /// Puts the active edges back in a consistent order after numerical errors and
    /// rebuilds the spans to match.
    fn recover_from_error(
        &mut self,
        output: &mut dyn FillGeometryBuilder,
    ) -> Result<(), InternalError> {
        self.sort_active_edges();

        // Merge placeholders can't be the last active edge.
        let len = self.active.len();
        if len > 1 && self.active[len - 1].is_merge {
            self.active.swap(len - 1, len - 2);
        }

        let mut winding = WindingState::new();
        for edge in &self.active {
            if edge.is_merge {
                winding.span_index += 1;
            } else {
                winding.update(self.fill_rule, edge.winding);
            }

            if winding.span_index >= self.spans.len() as SpanIdx {
                self.spans
                    .begin_span(winding.span_index, &edge.from, edge.from_id)?;
            }
        }

        let expected_spans = (winding.span_index + 1).max(0) as usize;
        while self.spans.len() > expected_spans {
            if let Some(mut span) = self.spans.spans.pop() {
                if let Some(tess) = span.tess.as_mut() {
                    tess.flush(output);
                }
            }
        }

        Ok(())
    }

    fn sort_active_edges(&mut self) {
        // Merge placeholders are points: they keep the position of the edge on their
        // left and are moved back inside the shape afterwards if needed.
        let y = self.current_position.y;
        let current_x = self.current_position.x;

        let mut keys = Vec::with_capacity(self.active.len());
        let mut has_merge_vertex = false;
        let mut prev_x = f32::MIN;
        for (i, edge) in self.active.iter().enumerate() {
            if edge.is_merge {
                has_merge_vertex = true;
                keys.push((prev_x, i));
                continue;
            }

            let eq_to = edge.to.y == y;
            let eq_from = edge.from.y == y;

            let x = if eq_to && eq_from {
                if edge.max_x() >= current_x && edge.min_x() <= current_x {
                    current_x
                } else {
                    edge.min_x()
                }
            } else if eq_from {
                edge.from.x
            } else if eq_to {
                edge.to.x
            } else {
                edge.solve_x_for_y(y)
            };

            keys.push((x.max(edge.min_x()), i));
            prev_x = x;
        }

        let active = &self.active;
        keys.sort_by(|a, b| {
            a.0.total_cmp(&b.0).then_with(|| {
                let a = &active[a.1];
                let b = &active[b.1];
                match (a.is_merge, b.is_merge) {
                    (false, false) => compare_directions(a.to - a.from, b.to - b.from),
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (true, true) => Ordering::Equal,
                }
            })
        });

        self.active = keys.iter().map(|&(_, idx)| self.active[idx]).collect();

        if !has_merge_vertex {
            return;
        }

        let mut winding_number = 0;
        for i in 0..self.active.len() {
            let edge = self.active[i];
            if !edge.is_merge {
                winding_number += edge.winding;
                continue;
            }

            if self.fill_rule.is_in(winding_number) {
                continue;
            }

            // Move the placeholder left until it is inside.
            let mut w = winding_number;
            let mut idx = i;
            while idx > 0 {
                w -= self.active[idx - 1].winding;
                self.active.swap(idx, idx - 1);
                idx -= 1;
                if self.fill_rule.is_in(w) {
                    break;
                }
            }
        }
    }

    fn sort_edges_below(&mut self) {
        let current = self.current_position;
        self.edges_below
            .sort_by(|a, b| compare_directions(a.to - current, b.to - current));
    }

    /// Edges below going in the same direction are merged into one, summing their
    /// winding. If one is longer, its remainder is queued at the end of the shorter.
    fn handle_coincident_edges_below(&mut self) {
        if self.edges_below.len() >= 2 {
            let current = self.current_position;
            for idx in (0..(self.edges_below.len() - 1)).rev() {
                let a = self.edges_below[idx];
                let b = self.edges_below[idx + 1];
                if !directions_are_close(a.to - current, b.to - current) {
                    continue;
                }

                let (upper_idx, lower) = match compare_positions(a.to, b.to) {
                    Ordering::Greater => (idx + 1, a),
                    _ => (idx, b),
                };

                tess_log!(self, "coincident edges {:?} / {:?}", a.to, b.to);

                let upper = &mut self.edges_below[upper_idx];
                upper.winding += lower.winding;
                let upper_to = upper.to;

                if upper_to != lower.to {
                    self.events.push_edge(upper_to, lower.to, lower.winding);
                }

                let lower_idx = if upper_idx == idx { idx + 1 } else { idx };
                self.edges_below.remove(lower_idx);
            }
        }

        self.edges_below.retain(|edge| edge.winding != 0);
    }

    fn reset(&mut self) {
        self.current_position = point(f32::MIN, f32::MIN);
        self.current_vertex = VertexId::INVALID;
        self.active.clear();
        self.edges_below.clear();
        self.spans.spans.clear();
        self.events.clear();
    }
}

#[inline]
pub(crate) fn compare_positions(a: Point, b: Point) -> Ordering {
    if a.y > b.y {
        return Ordering::Greater;
    }
    if a.y < b.y {
        return Ordering::Less;
    }
    if a.x > b.x {
        return Ordering::Greater;
    }
    if a.x < b.x {
        return Ordering::Less;
    }

    Ordering::Equal
}

#[inline]
pub(crate) fn is_after(a: Point, b: Point) -> bool {
    a.y > b.y || (a.y == b.y && a.x > b.x)
}

#[test]
fn directions_left_to_right() {
    let down = vector(0.0, 1.0);
    let right = vector(1.0, 0.0);
    let down_left = vector(-1.0, 1.0);
    let down_right = vector(1.0, 1.0);

    assert_eq!(compare_directions(down_left, down), Ordering::Less);
    assert_eq!(compare_directions(down, down_right), Ordering::Less);
    assert_eq!(compare_directions(down_right, right), Ordering::Less);
    assert_eq!(compare_directions(right, down_left), Ordering::Greater);
    assert_eq!(compare_directions(down, vector(0.0, 5.0)), Ordering::Equal);

    assert!(directions_are_close(down, vector(0.0, 3.0)));
    assert!(!directions_are_close(down, down_right));
}

#[test]
fn position_order() {
    assert!(is_after(point(0.0, 1.0), point(5.0, 0.0)));
    assert!(is_after(point(1.0, 0.0), point(0.0, 0.0)));
    assert!(!is_after(point(0.0, 0.0), point(0.0, 0.0)));
    assert_eq!(compare_positions(point(2.0, 2.0), point(2.0, 2.0)), Ordering::Equal);
    assert_eq!(compare_positions(point(3.0, 2.0), point(2.0, 2.0)), Ordering::Greater);
}
