use crate::math::Point;

/// Represents an event or edge of path.
///
/// A contour is always reported as a `Begin`, a run of edges and an `End`.
/// When `close` is true the edge back to the first point has already been
/// reported as a `Line`, so `last == first`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Event<Endpoint, ControlPoint> {
    Begin {
        at: Endpoint,
    },
    Line {
        from: Endpoint,
        to: Endpoint,
    },
    Quadratic {
        from: Endpoint,
        ctrl: ControlPoint,
        to: Endpoint,
    },
    Cubic {
        from: Endpoint,
        ctrl1: ControlPoint,
        ctrl2: ControlPoint,
        to: Endpoint,
    },
    End {
        last: Endpoint,
        first: Endpoint,
        close: bool,
    },
}

/// A path event representing endpoints and control points as positions.
pub type PathEvent = Event<Point, Point>;

impl<Ep, Cp> Event<Ep, Cp> {
    pub fn is_edge(&self) -> bool {
        match self {
            &Event::Line { .. } | &Event::Quadratic { .. } | &Event::Cubic { .. } => true,
            _ => false,
        }
    }

    pub fn from(&self) -> Ep
    where
        Ep: Clone,
    {
        match &self {
            &Event::Line { from, .. }
            | &Event::Quadratic { from, .. }
            | &Event::Cubic { from, .. }
            | &Event::Begin { at: from }
            | &Event::End { last: from, .. } => from.clone(),
        }
    }

    pub fn to(&self) -> Ep
    where
        Ep: Clone,
    {
        match &self {
            &Event::Line { to, .. }
            | &Event::Quadratic { to, .. }
            | &Event::Cubic { to, .. }
            | &Event::Begin { at: to }
            | &Event::End { first: to, .. } => to.clone(),
        }
    }
}

impl PathEvent {
    /// Returns true if any position carried by this event is NaN or infinite.
    pub fn has_non_finite_points(&self) -> bool {
        let finite = |p: &Point| p.x.is_finite() && p.y.is_finite();
        match self {
            Event::Begin { at } => !finite(at),
            Event::Line { from, to } => !(finite(from) && finite(to)),
            Event::Quadratic { from, ctrl, to } => !(finite(from) && finite(ctrl) && finite(to)),
            Event::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => !(finite(from) && finite(ctrl1) && finite(ctrl2) && finite(to)),
            Event::End { last, first, .. } => !(finite(last) && finite(first)),
        }
    }
}

#[test]
fn non_finite_events() {
    use crate::math::point;

    let ok = PathEvent::Line {
        from: point(0.0, 0.0),
        to: point(1.0, 1.0),
    };
    let nan = PathEvent::Quadratic {
        from: point(0.0, 0.0),
        ctrl: point(f32::NAN, 1.0),
        to: point(1.0, 1.0),
    };
    let inf = PathEvent::Begin {
        at: point(f32::INFINITY, 0.0),
    };

    assert!(!ok.has_non_finite_points());
    assert!(nan.has_non_finite_points());
    assert!(inf.has_non_finite_points());
    assert!(ok.is_edge());
    assert!(!inf.is_edge());
}
