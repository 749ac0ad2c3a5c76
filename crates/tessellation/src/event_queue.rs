use crate::fill::{compare_positions, is_after};
use crate::geom::{CubicBezierSegment, QuadraticBezierSegment};
use crate::math::*;
use crate::path::PathEvent;
use crate::{GeometryBuilderError, Orientation};

use alloc::collections::BinaryHeap;
use alloc::vec::Vec;
use core::cmp::Ordering;

/// An edge waiting to be inserted in the sweep line, oriented downward.
///
/// The upper endpoint is the position of the event it is attached to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct EdgeData {
    pub to: Point,
    pub winding: i16,
}

#[derive(Copy, Clone, Debug)]
struct QueuedEvent {
    position: Point,
    edge: Option<EdgeData>,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the greatest element first, we want the earliest position.
        compare_positions(other.position, self.position)
    }
}

/// Positions to visit in sweep order, with the edges that start at each of them.
///
/// Edges discovered while sweeping (intersections, split edges) are pushed back
/// into the queue.
#[derive(Default)]
pub(crate) struct EventQueue {
    heap: BinaryHeap<QueuedEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue {
            heap: BinaryHeap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Adds an edge starting at `from`, along with an event at its lower endpoint.
    pub fn push_edge(&mut self, from: Point, to: Point, winding: i16) {
        debug_assert!(is_after(to, from));
        self.heap.push(QueuedEvent {
            position: from,
            edge: Some(EdgeData { to, winding }),
        });
        self.heap.push(QueuedEvent {
            position: to,
            edge: None,
        });
    }

    /// Removes the next position and appends the edges starting there to `edges`.
    pub fn pop(&mut self, edges: &mut Vec<EdgeData>) -> Option<Point> {
        let first = self.heap.pop()?;
        let position = first.position;
        edges.extend(first.edge);

        while let Some(next) = self.heap.peek() {
            if next.position != position {
                break;
            }

            let next = *next;
            self.heap.pop();
            edges.extend(next.edge);
        }

        Some(position)
    }
}

/// Counts gathered while building the queue.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct QueueStats {
    pub contours: usize,
    pub dropped_contours: usize,
    pub edges: usize,
}

/// Flattens path events into edges in sweep space and fills an `EventQueue`.
///
/// Every contour is closed, whether the path closes it or not.
pub(crate) struct EventQueueBuilder<'l> {
    queue: &'l mut EventQueue,
    contour: Vec<Point>,
    tolerance: f32,
    orientation: Orientation,
    stats: QueueStats,
}

impl<'l> EventQueueBuilder<'l> {
    pub fn new(queue: &'l mut EventQueue, tolerance: f32, orientation: Orientation) -> Self {
        queue.clear();
        EventQueueBuilder {
            queue,
            contour: Vec::new(),
            tolerance,
            orientation,
            stats: QueueStats::default(),
        }
    }

    /// Consumes the events. Non-finite coordinates are rejected before anything
    /// is queued.
    pub fn build(
        mut self,
        events: impl IntoIterator<Item = PathEvent>,
    ) -> Result<QueueStats, GeometryBuilderError> {
        let tolerance = self.tolerance;
        for event in events {
            if event.has_non_finite_points() {
                self.queue.clear();
                return Err(GeometryBuilderError::InvalidVertex);
            }

            match event {
                PathEvent::Begin { at } => {
                    self.end_contour();
                    let at = self.to_sweep_space(at);
                    self.push_point(at);
                }
                PathEvent::Line { to, .. } => {
                    let to = self.to_sweep_space(to);
                    self.push_point(to);
                }
                PathEvent::Quadratic { from, ctrl, to } => {
                    let curve = QuadraticBezierSegment {
                        from: self.to_sweep_space(from),
                        ctrl: self.to_sweep_space(ctrl),
                        to: self.to_sweep_space(to),
                    };
                    curve.for_each_flattened(tolerance, &mut |line| self.push_point(line.to));
                }
                PathEvent::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                } => {
                    let curve = CubicBezierSegment {
                        from: self.to_sweep_space(from),
                        ctrl1: self.to_sweep_space(ctrl1),
                        ctrl2: self.to_sweep_space(ctrl2),
                        to: self.to_sweep_space(to),
                    };
                    curve.for_each_flattened(tolerance, &mut |line| self.push_point(line.to));
                }
                PathEvent::End { .. } => {
                    self.end_contour();
                }
            }
        }

        self.end_contour();

        Ok(self.stats)
    }

    fn to_sweep_space(&self, p: Point) -> Point {
        to_sweep_space(p, self.orientation)
    }

    fn push_point(&mut self, p: Point) {
        if self.contour.last() != Some(&p) {
            self.contour.push(p);
        }
    }

    fn end_contour(&mut self) {
        if self.contour.len() > 1 && self.contour.first() == self.contour.last() {
            self.contour.pop();
        }

        let n = self.contour.len();
        if n < 3 {
            if n > 0 {
                self.stats.dropped_contours += 1;
            }
            self.contour.clear();
            return;
        }

        self.stats.contours += 1;
        for i in 0..n {
            let a = self.contour[i];
            let b = self.contour[(i + 1) % n];
            match compare_positions(b, a) {
                Ordering::Greater => self.queue.push_edge(a, b, 1),
                Ordering::Less => self.queue.push_edge(b, a, -1),
                Ordering::Equal => continue,
            }
            self.stats.edges += 1;
        }

        self.contour.clear();
    }
}

/// Maps a position so that the sweep always advances along the y axis.
///
/// The horizontal orientation is a quarter turn, which preserves the winding of
/// triangles.
#[inline]
pub(crate) fn to_sweep_space(p: Point, orientation: Orientation) -> Point {
    match orientation {
        Orientation::Vertical => p,
        Orientation::Horizontal => point(-p.y, p.x),
    }
}

#[inline]
pub(crate) fn from_sweep_space(p: Point, orientation: Orientation) -> Point {
    match orientation {
        Orientation::Vertical => p,
        Orientation::Horizontal => point(p.y, -p.x),
    }
}

#[cfg(test)]
fn drain(queue: &mut EventQueue) -> Vec<(Point, Vec<EdgeData>)> {
    let mut result = Vec::new();
    let mut edges = Vec::new();
    while let Some(position) = queue.pop(&mut edges) {
        result.push((position, core::mem::take(&mut edges)));
    }

    result
}

#[test]
fn events_come_out_in_sweep_order() {
    let mut queue = EventQueue::new();
    queue.push_edge(point(5.0, 1.0), point(0.0, 3.0), 1);
    queue.push_edge(point(0.0, 0.0), point(5.0, 1.0), -1);
    queue.push_edge(point(2.0, 1.0), point(3.0, 1.0), 1);

    let events = drain(&mut queue);
    let positions: Vec<Point> = events.iter().map(|(p, _)| *p).collect();
    assert_eq!(
        positions,
        &[
            point(0.0, 0.0),
            point(2.0, 1.0),
            point(3.0, 1.0),
            point(5.0, 1.0),
            point(0.0, 3.0),
        ]
    );

    // Both the end of the first edge and the start of the second one land on (5, 1).
    assert_eq!(events[3].1, &[EdgeData { to: point(0.0, 3.0), winding: 1 }]);
    assert!(queue.is_empty());
}

#[test]
fn builder_closes_contours_and_drops_degenerate_ones() {
    use crate::path::Path;

    let mut builder = Path::builder();
    builder.begin(point(0.0, 0.0)).unwrap();
    builder.line_to(point(10.0, 0.0)).unwrap();
    builder.line_to(point(10.0, 10.0)).unwrap();
    builder.end().unwrap();
    builder.begin(point(20.0, 0.0)).unwrap();
    builder.line_to(point(30.0, 0.0)).unwrap();
    builder.line_to(point(30.0, 0.0)).unwrap();
    builder.close().unwrap();
    let path = builder.build().unwrap();

    let mut queue = EventQueue::new();
    let stats = EventQueueBuilder::new(&mut queue, 0.1, Orientation::Vertical)
        .build(path.iter())
        .unwrap();

    assert_eq!(
        stats,
        QueueStats {
            contours: 1,
            dropped_contours: 1,
            edges: 3,
        }
    );
}

#[test]
fn non_finite_points_are_rejected() {
    let events = [
        PathEvent::Begin {
            at: point(0.0, 0.0),
        },
        PathEvent::Line {
            from: point(0.0, 0.0),
            to: point(f32::NAN, 1.0),
        },
    ];

    let mut queue = EventQueue::new();
    let result = EventQueueBuilder::new(&mut queue, 0.1, Orientation::Vertical).build(events);
    assert_eq!(result, Err(GeometryBuilderError::InvalidVertex));
    assert!(queue.is_empty());
}

#[test]
fn sweep_space_round_trip() {
    let p = point(3.0, -7.5);
    for orientation in [Orientation::Vertical, Orientation::Horizontal] {
        assert_eq!(from_sweep_space(to_sweep_space(p, orientation), orientation), p);
    }
    assert_eq!(to_sweep_space(p, Orientation::Horizontal), point(7.5, 3.0));
}
