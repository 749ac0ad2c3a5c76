//! The path data structure and its event iterator.

use crate::builder::{BuilderError, PathBuilder};
use crate::math::Point;
use crate::{Event, PathEvent};

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// The commands a path is made of, without their parameters.
///
/// Points are stored separately and consumed positionally: `Begin` and `LineTo` consume
/// one point, `QuadraticBezierTo` two, `CubicBezierTo` three, `Close` and `End` none.
///
/// The discriminants match the integer encoding used by host bindings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum PathVerb {
    Begin = 0,
    LineTo = 1,
    QuadraticBezierTo = 2,
    CubicBezierTo = 3,
    Close = 4,
    End = 5,
}

impl PathVerb {
    /// Number of points this verb consumes.
    #[inline]
    pub fn num_points(self) -> usize {
        match self {
            PathVerb::Begin | PathVerb::LineTo => 1,
            PathVerb::QuadraticBezierTo => 2,
            PathVerb::CubicBezierTo => 3,
            PathVerb::Close | PathVerb::End => 0,
        }
    }

    #[inline]
    pub fn is_terminator(self) -> bool {
        matches!(self, PathVerb::Close | PathVerb::End)
    }

    /// Decodes the integer representation used by host bindings.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PathVerb::Begin),
            1 => Some(PathVerb::LineTo),
            2 => Some(PathVerb::QuadraticBezierTo),
            3 => Some(PathVerb::CubicBezierTo),
            4 => Some(PathVerb::Close),
            5 => Some(PathVerb::End),
            _ => None,
        }
    }
}

/// A validated, immutable path.
///
/// Every sub-path of a `Path` is terminated by `Close` or `End`. Paths are built with
/// [`PathBuilder`] or validated from raw parts with [`Path::from_raw_parts`].
#[derive(Clone, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Path {
    points: Box<[Point]>,
    verbs: Box<[PathVerb]>,
}

impl Path {
    /// Creates a [`PathBuilder`].
    pub fn builder() -> PathBuilder {
        PathBuilder::new()
    }

    /// Creates an empty path.
    pub fn new() -> Path {
        Path {
            points: Box::new([]),
            verbs: Box::new([]),
        }
    }

    pub(crate) fn from_parts(verbs: Vec<PathVerb>, points: Vec<Point>) -> Path {
        Path {
            points: points.into_boxed_slice(),
            verbs: verbs.into_boxed_slice(),
        }
    }

    /// Validates a raw verb stream and the points it consumes.
    ///
    /// The verbs are replayed through a [`PathBuilder`], so the same state machine applies.
    /// The points must be consumed exactly.
    pub fn from_raw_parts(verbs: &[PathVerb], points: &[Point]) -> Result<Path, BuilderError> {
        let expected: usize = verbs.iter().map(|v| v.num_points()).sum();
        if expected != points.len() {
            return Err(BuilderError::PointCountMismatch {
                expected,
                actual: points.len(),
            });
        }

        let mut builder = PathBuilder::with_capacity(points.len(), verbs.len());
        let mut offset = 0;
        for &verb in verbs {
            let n = verb.num_points();
            builder.push_verb(verb, &points[offset..offset + n])?;
            offset += n;
        }

        builder.build()
    }

    /// Iterates over the normalized events of this path.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.verbs, &self.points)
    }

    pub fn verbs(&self) -> &[PathVerb] {
        &self.verbs
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }
}

impl<'l> IntoIterator for &'l Path {
    type Item = PathEvent;
    type IntoIter = Iter<'l>;

    fn into_iter(self) -> Iter<'l> {
        self.iter()
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "\"")?;
        let mut points = self.points.iter();
        let mut next = || points.next().copied().unwrap_or(Point::zero());
        for verb in self.verbs.iter() {
            match verb {
                PathVerb::Begin => {
                    let p = next();
                    write!(formatter, "M {:?} {:?} ", p.x, p.y)?;
                }
                PathVerb::LineTo => {
                    let p = next();
                    write!(formatter, "L {:?} {:?} ", p.x, p.y)?;
                }
                PathVerb::QuadraticBezierTo => {
                    let (c, p) = (next(), next());
                    write!(formatter, "Q {:?} {:?} {:?} {:?} ", c.x, c.y, p.x, p.y)?;
                }
                PathVerb::CubicBezierTo => {
                    let (c1, c2, p) = (next(), next(), next());
                    write!(
                        formatter,
                        "C {:?} {:?} {:?} {:?} {:?} {:?} ",
                        c1.x, c1.y, c2.x, c2.y, p.x, p.y
                    )?;
                }
                PathVerb::Close => write!(formatter, "Z ")?,
                PathVerb::End => {}
            }
        }

        write!(formatter, "\"")
    }
}

/// Lowers a verb stream into normalized [`PathEvent`]s in a single forward pass.
///
/// - Each `Begin` starts a new contour.
/// - `Close` reports the edge back to the first point as a `Line` (unless the contour
///   already ends there) followed by `End { close: true }`.
/// - `End` reports `End { close: false }`.
/// - Contours with fewer than two endpoints are skipped entirely.
///
/// The iterator stops at the first inconsistency between verbs and points instead of
/// panicking, which cannot happen for a validated [`Path`].
#[derive(Clone)]
pub struct Iter<'l> {
    verbs: &'l [PathVerb],
    points: &'l [Point],
    verb_idx: usize,
    point_idx: usize,
    first: Point,
    current: Point,
    pending: Option<PathEvent>,
}

impl<'l> Iter<'l> {
    pub fn new(verbs: &'l [PathVerb], points: &'l [Point]) -> Self {
        Iter {
            verbs,
            points,
            verb_idx: 0,
            point_idx: 0,
            first: Point::zero(),
            current: Point::zero(),
            pending: None,
        }
    }

    #[inline]
    fn next_point(&mut self) -> Option<Point> {
        let p = *self.points.get(self.point_idx)?;
        self.point_idx += 1;
        Some(p)
    }

    // Number of endpoints in the contour whose `Begin` was just consumed.
    fn contour_endpoint_count(&self) -> usize {
        let mut count = 1;
        for verb in &self.verbs[self.verb_idx..] {
            if verb.is_terminator() || *verb == PathVerb::Begin {
                break;
            }
            count += 1;
        }

        count
    }

    fn skip_contour(&mut self) {
        while let Some(&verb) = self.verbs.get(self.verb_idx) {
            if verb == PathVerb::Begin {
                return;
            }
            self.verb_idx += 1;
            self.point_idx += verb.num_points();
            if verb.is_terminator() {
                return;
            }
        }
    }
}

impl<'l> Iterator for Iter<'l> {
    type Item = PathEvent;

    fn next(&mut self) -> Option<PathEvent> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }

        loop {
            let verb = *self.verbs.get(self.verb_idx)?;
            self.verb_idx += 1;

            return match verb {
                PathVerb::Begin => {
                    let at = self.next_point()?;
                    if self.contour_endpoint_count() < 2 {
                        self.skip_contour();
                        continue;
                    }
                    self.first = at;
                    self.current = at;
                    Some(Event::Begin { at })
                }
                PathVerb::LineTo => {
                    let from = self.current;
                    self.current = self.next_point()?;
                    Some(Event::Line {
                        from,
                        to: self.current,
                    })
                }
                PathVerb::QuadraticBezierTo => {
                    let from = self.current;
                    let ctrl = self.next_point()?;
                    self.current = self.next_point()?;
                    Some(Event::Quadratic {
                        from,
                        ctrl,
                        to: self.current,
                    })
                }
                PathVerb::CubicBezierTo => {
                    let from = self.current;
                    let ctrl1 = self.next_point()?;
                    let ctrl2 = self.next_point()?;
                    self.current = self.next_point()?;
                    Some(Event::Cubic {
                        from,
                        ctrl1,
                        ctrl2,
                        to: self.current,
                    })
                }
                PathVerb::Close => {
                    let last = self.current;
                    let first = self.first;
                    self.current = first;
                    let end = Event::End {
                        last: first,
                        first,
                        close: true,
                    };
                    if last != first {
                        self.pending = Some(end);
                        Some(Event::Line { from: last, to: first })
                    } else {
                        Some(end)
                    }
                }
                PathVerb::End => Some(Event::End {
                    last: self.current,
                    first: self.first,
                    close: false,
                }),
            };
        }
    }
}

#[cfg(test)]
use crate::math::{box2d, point};

#[cfg(test)]
fn events(path: &Path) -> Vec<PathEvent> {
    path.iter().collect()
}

#[test]
fn close_emits_the_closing_edge() {
    let mut builder = Path::builder();
    builder
        .begin(point(0.0, 0.0))
        .unwrap()
        .line_to(point(1.0, 0.0))
        .unwrap()
        .quadratic_bezier_to(point(2.0, 0.0), point(2.0, 1.0))
        .unwrap()
        .close()
        .unwrap();
    let path = builder.build().unwrap();

    assert_eq!(
        events(&path),
        alloc::vec![
            Event::Begin { at: point(0.0, 0.0) },
            Event::Line {
                from: point(0.0, 0.0),
                to: point(1.0, 0.0)
            },
            Event::Quadratic {
                from: point(1.0, 0.0),
                ctrl: point(2.0, 0.0),
                to: point(2.0, 1.0)
            },
            Event::Line {
                from: point(2.0, 1.0),
                to: point(0.0, 0.0)
            },
            Event::End {
                last: point(0.0, 0.0),
                first: point(0.0, 0.0),
                close: true
            },
        ]
    );
}

#[test]
fn close_on_first_point_adds_no_edge() {
    let mut builder = Path::builder();
    builder
        .begin(point(0.0, 0.0))
        .unwrap()
        .line_to(point(1.0, 0.0))
        .unwrap()
        .line_to(point(0.0, 0.0))
        .unwrap()
        .close()
        .unwrap();
    let path = builder.build().unwrap();

    let evts = events(&path);
    assert_eq!(evts.len(), 4);
    assert_eq!(
        evts[3],
        Event::End {
            last: point(0.0, 0.0),
            first: point(0.0, 0.0),
            close: true
        }
    );
}

#[test]
fn end_leaves_the_contour_open() {
    let mut builder = Path::builder();
    builder
        .add_cubic_bezier(point(0.0, 0.0), point(1.0, 1.0), point(2.0, 1.0), point(3.0, 0.0))
        .unwrap();
    let path = builder.build().unwrap();

    assert_eq!(
        events(&path),
        alloc::vec![
            Event::Begin { at: point(0.0, 0.0) },
            Event::Cubic {
                from: point(0.0, 0.0),
                ctrl1: point(1.0, 1.0),
                ctrl2: point(2.0, 1.0),
                to: point(3.0, 0.0)
            },
            Event::End {
                last: point(3.0, 0.0),
                first: point(0.0, 0.0),
                close: false
            },
        ]
    );
}

#[test]
fn degenerate_contours_are_dropped() {
    let mut builder = Path::builder();
    builder.begin(point(0.0, 0.0)).unwrap().end().unwrap();
    builder.begin(point(5.0, 5.0)).unwrap().close().unwrap();
    builder.add_line(point(1.0, 1.0), point(2.0, 2.0)).unwrap();
    builder.begin(point(9.0, 9.0)).unwrap().end().unwrap();
    let path = builder.build().unwrap();

    assert_eq!(
        events(&path),
        alloc::vec![
            Event::Begin { at: point(1.0, 1.0) },
            Event::Line {
                from: point(1.0, 1.0),
                to: point(2.0, 2.0)
            },
            Event::End {
                last: point(2.0, 2.0),
                first: point(1.0, 1.0),
                close: false
            },
        ]
    );
}

#[test]
fn multiple_contours() {
    let mut builder = Path::builder();
    builder.add_rect(&box2d(0.0, 0.0, 1.0, 1.0)).unwrap();
    builder.add_rect(&box2d(2.0, 2.0, 3.0, 3.0)).unwrap();
    let path = builder.build().unwrap();

    let evts = events(&path);
    let begins = evts.iter().filter(|e| matches!(e, Event::Begin { .. })).count();
    let ends = evts
        .iter()
        .filter(|e| matches!(e, Event::End { close: true, .. }))
        .count();
    let edges = evts.iter().filter(|e| e.is_edge()).count();
    assert_eq!(begins, 2);
    assert_eq!(ends, 2);
    assert_eq!(edges, 8);
}

#[test]
fn empty_path() {
    let path = Path::builder().build().unwrap();
    assert!(path.is_empty());
    assert_eq!(path.iter().next(), None);
    assert_eq!(Path::new(), path);
}

#[test]
fn raw_parts_are_validated() {
    use crate::builder::{BuilderOp, BuilderState};

    let points = [point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0)];
    let verbs = [
        PathVerb::Begin,
        PathVerb::LineTo,
        PathVerb::LineTo,
        PathVerb::Close,
    ];
    let path = Path::from_raw_parts(&verbs, &points).unwrap();
    assert_eq!(path.verbs(), &verbs);
    assert_eq!(path.points(), &points);

    assert_eq!(
        Path::from_raw_parts(&verbs, &points[..2]),
        Err(BuilderError::PointCountMismatch {
            expected: 3,
            actual: 2
        })
    );

    let no_begin = [PathVerb::LineTo, PathVerb::LineTo, PathVerb::LineTo];
    assert_eq!(
        Path::from_raw_parts(&no_begin, &points),
        Err(BuilderError::InvalidState {
            op: BuilderOp::LineTo,
            state: BuilderState::Idle
        })
    );

    let unterminated = [PathVerb::Begin, PathVerb::LineTo, PathVerb::LineTo];
    assert_eq!(
        Path::from_raw_parts(&unterminated, &points),
        Err(BuilderError::InvalidState {
            op: BuilderOp::Build,
            state: BuilderState::PathOpen
        })
    );
}

#[test]
fn verb_codes() {
    for code in 0..6u8 {
        let verb = PathVerb::from_code(code).unwrap();
        assert_eq!(verb as u8, code);
    }
    assert_eq!(PathVerb::from_code(6), None);
}
