use crate::fill::{is_after, Side};
use crate::math::{point, Point};
use crate::{FillGeometryBuilder, VertexId};

use alloc::vec::Vec;

/// Triangulates a y-monotone polygon whose vertices are fed in sweep order.
///
/// Each vertex is tagged with the chain (left or right) it belongs to. Triangles
/// are buffered until the span is flushed.
pub(crate) struct MonotoneTessellator {
    stack: Vec<MonotoneVertex>,
    previous: MonotoneVertex,
    triangles: Vec<(MonotoneVertex, MonotoneVertex, MonotoneVertex)>,
}

#[derive(Copy, Clone, Debug)]
struct MonotoneVertex {
    pos: Point,
    id: VertexId,
    side: Side,
}

impl MonotoneTessellator {
    pub fn new() -> Self {
        MonotoneTessellator {
            stack: Vec::with_capacity(16),
            triangles: Vec::with_capacity(16),
            previous: MonotoneVertex {
                pos: point(0.0, 0.0),
                id: VertexId::INVALID,
                side: Side::Left,
            },
        }
    }

    pub fn begin(&mut self, pos: Point, id: VertexId) {
        debug_assert!(id != VertexId::INVALID);
        let first = MonotoneVertex {
            pos,
            id,
            side: Side::Left,
        };

        self.previous = first;
        self.triangles.clear();
        self.stack.clear();
        self.stack.push(first);
    }

    pub fn vertex(&mut self, pos: Point, id: VertexId, side: Side) {
        let current = MonotoneVertex { pos, id, side };
        debug_assert!(!is_after(self.previous.pos, current.pos));
        debug_assert!(!self.stack.is_empty());

        if current.side != self.previous.side {
            // The new vertex sees every vertex of the opposite chain.
            for pair in self.stack.windows(2) {
                self.triangles.push((pair[0], pair[1], current));
            }

            self.stack.clear();
            self.stack.push(self.previous);
        } else {
            // Same chain: cut off the reflex-free part of the stack.
            let mut last_popped = self.stack.pop();
            while let (Some(mut a), Some(&top)) = (last_popped, self.stack.last()) {
                let mut b = top;
                if current.side.is_right() {
                    core::mem::swap(&mut a, &mut b);
                }

                if (current.pos - b.pos).cross(a.pos - b.pos) < 0.0 {
                    break;
                }

                self.triangles.push((b, a, current));
                last_popped = self.stack.pop();
            }

            if let Some(vertex) = last_popped {
                self.stack.push(vertex);
            }
        }

        self.stack.push(current);
        self.previous = current;
    }

    pub fn end(&mut self, pos: Point, id: VertexId) {
        let side = self.previous.side.opposite();
        self.vertex(pos, id, side);
        self.stack.clear();
    }

    /// Sends the buffered triangles to the output, counter-clockwise, dropping the
    /// ones with no area.
    pub fn flush(&mut self, output: &mut dyn FillGeometryBuilder) {
        for (a, b, c) in self.triangles.drain(..) {
            let area = (b.pos - a.pos).cross(c.pos - a.pos);
            if area == 0.0 || a.id == b.id || b.id == c.id || a.id == c.id {
                continue;
            }

            if area > 0.0 {
                output.add_triangle(a.id, b.id, c.id);
            } else {
                output.add_triangle(a.id, c.id, b.id);
            }
        }
    }

    #[cfg(test)]
    fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

#[test]
fn single_triangle() {
    let mut tess = MonotoneTessellator::new();
    tess.begin(point(0.0, 0.0), VertexId(0));
    tess.vertex(point(-1.0, 1.0), VertexId(1), Side::Left);
    tess.end(point(1.0, 2.0), VertexId(2));
    assert_eq!(tess.triangle_count(), 1);
}

#[test]
fn alternating_chains() {
    let mut tess = MonotoneTessellator::new();
    tess.begin(point(0.0, 0.0), VertexId(0));
    tess.vertex(point(1.0, 1.0), VertexId(1), Side::Right);
    tess.vertex(point(-1.5, 2.0), VertexId(2), Side::Left);
    tess.vertex(point(-1.0, 3.0), VertexId(3), Side::Left);
    tess.vertex(point(1.0, 4.0), VertexId(4), Side::Right);
    tess.end(point(0.0, 5.0), VertexId(5));
    assert_eq!(tess.triangle_count(), 4);
}

#[test]
fn reflex_chain_on_the_right() {
    let mut tess = MonotoneTessellator::new();
    tess.begin(point(0.0, 0.0), VertexId(0));
    tess.vertex(point(1.0, 1.0), VertexId(1), Side::Right);
    tess.vertex(point(3.0, 2.0), VertexId(2), Side::Right);
    tess.vertex(point(1.0, 3.0), VertexId(3), Side::Right);
    tess.vertex(point(1.0, 4.0), VertexId(4), Side::Right);
    tess.vertex(point(4.0, 5.0), VertexId(5), Side::Right);
    tess.end(point(0.0, 6.0), VertexId(6));
    assert_eq!(tess.triangle_count(), 5);
}

#[test]
fn flushed_triangles_are_counter_clockwise() {
    use crate::geometry_builder::{simple_builder, VertexBuffers};
    use crate::{FillGeometryBuilder, FillVertex, GeometryBuilder};

    let positions = [
        point(0.0, 0.0),
        point(-1.0, 1.0),
        point(2.0, 2.0),
        point(-1.0, 3.0),
        point(0.0, 4.0),
    ];

    let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
    let mut builder = simple_builder(&mut buffers);
    builder.begin_geometry();
    let ids: Vec<VertexId> = positions
        .iter()
        .map(|&position| builder.add_fill_vertex(FillVertex::new(position)).unwrap())
        .collect();

    let mut tess = MonotoneTessellator::new();
    tess.begin(positions[0], ids[0]);
    tess.vertex(positions[1], ids[1], Side::Left);
    tess.vertex(positions[2], ids[2], Side::Right);
    tess.vertex(positions[3], ids[3], Side::Left);
    tess.end(positions[4], ids[4]);
    tess.flush(&mut builder);
    builder.end_geometry();

    assert_eq!(buffers.indices.len(), 9);
    for tri in buffers.indices.chunks(3) {
        let a = buffers.vertices[tri[0] as usize];
        let b = buffers.vertices[tri[1] as usize];
        let c = buffers.vertices[tri[2] as usize];
        assert!((b - a).cross(c - a) > 0.0);
    }
}
