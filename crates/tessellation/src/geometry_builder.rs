//! Interfaces between the tessellators and the geometry they produce.
//!
//! The tessellators don't know anything about vertex layouts or index buffers. They
//! hand out positions and connectivity through the traits of this module:
//!
//! * [`GeometryBuilder`] receives triangles and the begin/end/abort notifications.
//! * [`FillGeometryBuilder`] and [`StrokeGeometryBuilder`] add the vertices of the
//!   respective tessellators and hand back a [`VertexId`] for each of them.
//!
//! Adding a vertex can fail. A vertex with a NaN or infinite coordinate is rejected with
//! [`GeometryBuilderError::InvalidVertex`] and an output that ran out of indices reports
//! [`GeometryBuilderError::TooManyVertices`]. The tessellator then stops, calls
//! `abort_geometry` and returns the error. A failed vertex never gets an id, so no
//! triangle can reference it.
//!
//! For the common case of writing into a pair of vectors, [`VertexBuffers`] and
//! [`BuffersBuilder`] do the bookkeeping, while a [`FillVertexConstructor`] or
//! [`StrokeVertexConstructor`] turns the tessellator's vertices into the application's
//! vertex type. Hosts that own their buffers can plug a pair of callbacks in with
//! [`CallbackBuilder`].
//!
//! # Examples
//!
//! ```
//! use pathmesh_tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};
//! use pathmesh_tessellation::math::point;
//! use pathmesh_tessellation::path::Path;
//!
//! #[derive(Copy, Clone, Debug)]
//! struct ColoredVertex {
//!     position: [f32; 2],
//!     color: [f32; 4],
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = Path::builder();
//! builder.add_circle(point(0.0, 0.0), 10.0)?;
//! let path = builder.build()?;
//!
//! let mut output: VertexBuffers<ColoredVertex, u16> = VertexBuffers::new();
//! let red = [1.0, 0.0, 0.0, 1.0];
//!
//! FillTessellator::new().tessellate_path(
//!     &path,
//!     &FillOptions::tolerance(0.05),
//!     &mut BuffersBuilder::new(&mut output, |vertex: FillVertex| ColoredVertex {
//!         position: vertex.position().to_array(),
//!         color: red,
//!     }),
//! )?;
//!
//! assert!(!output.indices.is_empty());
//! assert_eq!(output.indices.len() % 3, 0);
//! # Ok(())
//! # }
//! ```

pub use crate::error::GeometryBuilderError;
use crate::math::Point;
use crate::{FillVertex, Index, StrokeVertex, VertexId};

use alloc::vec::Vec;

/// Receives the triangles of a tessellation.
///
/// Vertices are added through [`FillGeometryBuilder`] or [`StrokeGeometryBuilder`],
/// depending on the tessellator.
pub trait GeometryBuilder {
    /// Called before the first vertex of a tessellation is added.
    fn begin_geometry(&mut self) {}

    /// Called once the tessellation is complete.
    fn end_geometry(&mut self) {}

    /// Adds a triangle made of vertices added since `begin_geometry`.
    fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId);

    /// Called instead of `end_geometry` when the tessellation stops on an error.
    ///
    /// Triangles added before the error only reference valid vertices. Whether they are
    /// kept or discarded is up to the implementation.
    fn abort_geometry(&mut self) {}
}

/// Output of the [`FillTessellator`](crate::FillTessellator).
pub trait FillGeometryBuilder: GeometryBuilder {
    /// Adds a vertex and returns the id triangles use to reference it.
    fn add_fill_vertex(&mut self, vertex: FillVertex) -> Result<VertexId, GeometryBuilderError>;
}

/// Output of the [`StrokeTessellator`](crate::StrokeTessellator).
pub trait StrokeGeometryBuilder: GeometryBuilder {
    /// Adds a vertex and returns the id triangles use to reference it.
    fn add_stroke_vertex(&mut self, vertex: StrokeVertex)
        -> Result<VertexId, GeometryBuilderError>;
}

/// A vertex buffer and an index buffer.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VertexBuffers<OutputVertex, OutputIndex> {
    pub vertices: Vec<OutputVertex>,
    pub indices: Vec<OutputIndex>,
}

impl<OutputVertex, OutputIndex> VertexBuffers<OutputVertex, OutputIndex> {
    pub fn new() -> Self {
        VertexBuffers::with_capacity(512, 1024)
    }

    pub fn with_capacity(num_vertices: usize, num_indices: usize) -> Self {
        VertexBuffers {
            vertices: Vec::with_capacity(num_vertices),
            indices: Vec::with_capacity(num_indices),
        }
    }

    /// Removes all vertices and indices, keeping the allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

/// Writes the output of a tessellator into [`VertexBuffers`].
///
/// Ids handed to the tessellator are positions in the vertex buffer, so geometry can
/// be appended to buffers that already contain some. An extra offset can be added to
/// every index with [`with_vertex_offset`](BuffersBuilder::with_vertex_offset).
///
/// Vertices are checked before they are stored: a vertex that can't be addressed with
/// `OutputIndex`, or that has a non-finite position, is never pushed. Aborting keeps
/// what was written before the error.
pub struct BuffersBuilder<'l, OutputVertex: 'l, OutputIndex: 'l, Ctor> {
    buffers: &'l mut VertexBuffers<OutputVertex, OutputIndex>,
    vertex_offset: Index,
    vertex_constructor: Ctor,
}

impl<'l, OutputVertex: 'l, OutputIndex: 'l, Ctor>
    BuffersBuilder<'l, OutputVertex, OutputIndex, Ctor>
{
    pub fn new(buffers: &'l mut VertexBuffers<OutputVertex, OutputIndex>, ctor: Ctor) -> Self {
        BuffersBuilder {
            buffers,
            vertex_offset: 0,
            vertex_constructor: ctor,
        }
    }

    pub fn with_vertex_offset(mut self, offset: Index) -> Self {
        self.vertex_offset = offset;

        self
    }

    pub fn buffers<'a, 'b: 'a>(&'b self) -> &'a VertexBuffers<OutputVertex, OutputIndex> {
        self.buffers
    }

    fn next_vertex_id(&self, position: Point) -> Result<VertexId, GeometryBuilderError>
    where
        OutputIndex: MaxIndex,
    {
        if !(position.x.is_finite() && position.y.is_finite()) {
            return Err(GeometryBuilderError::InvalidVertex);
        }

        let id = self.buffers.vertices.len();
        // The largest index value is reserved, a `u16` buffer holds at most 65535 vertices.
        if id + self.vertex_offset as usize >= OutputIndex::MAX {
            return Err(GeometryBuilderError::TooManyVertices);
        }

        Ok(VertexId(id as Index))
    }
}

/// Builds the application's vertices out of the tessellator's.
pub trait FillVertexConstructor<OutputVertex> {
    fn new_vertex(&mut self, vertex: FillVertex) -> OutputVertex;
}

/// Builds the application's vertices out of the tessellator's.
pub trait StrokeVertexConstructor<OutputVertex> {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> OutputVertex;
}

/// A vertex constructor that only keeps the position.
pub struct Positions;

impl FillVertexConstructor<Point> for Positions {
    fn new_vertex(&mut self, vertex: FillVertex) -> Point {
        vertex.position()
    }
}

impl StrokeVertexConstructor<Point> for Positions {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> Point {
        vertex.position()
    }
}

impl<F, OutputVertex> FillVertexConstructor<OutputVertex> for F
where
    F: Fn(FillVertex) -> OutputVertex,
{
    fn new_vertex(&mut self, vertex: FillVertex) -> OutputVertex {
        self(vertex)
    }
}

impl<F, OutputVertex> StrokeVertexConstructor<OutputVertex> for F
where
    F: Fn(StrokeVertex) -> OutputVertex,
{
    fn new_vertex(&mut self, vertex: StrokeVertex) -> OutputVertex {
        self(vertex)
    }
}

/// A `BuffersBuilder` producing positions and `u16` indices.
pub type SimpleBuffersBuilder<'l> = BuffersBuilder<'l, Point, u16, Positions>;

/// Creates a `SimpleBuffersBuilder`.
pub fn simple_builder(buffers: &mut VertexBuffers<Point, u16>) -> SimpleBuffersBuilder<'_> {
    BuffersBuilder::new(buffers, Positions)
}

impl<'l, OutputVertex, OutputIndex, Ctor> GeometryBuilder
    for BuffersBuilder<'l, OutputVertex, OutputIndex, Ctor>
where
    OutputVertex: 'l,
    OutputIndex: From<VertexId> + MaxIndex,
{
    fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
        debug_assert!(a != b && a != c && b != c);
        debug_assert!(a != VertexId::INVALID && b != VertexId::INVALID && c != VertexId::INVALID);

        let offset = self.vertex_offset;
        self.buffers.indices.push((a + offset).into());
        self.buffers.indices.push((b + offset).into());
        self.buffers.indices.push((c + offset).into());
    }
}

impl<'l, OutputVertex, OutputIndex, Ctor> FillGeometryBuilder
    for BuffersBuilder<'l, OutputVertex, OutputIndex, Ctor>
where
    OutputVertex: 'l,
    OutputIndex: From<VertexId> + MaxIndex,
    Ctor: FillVertexConstructor<OutputVertex>,
{
    fn add_fill_vertex(&mut self, vertex: FillVertex) -> Result<VertexId, GeometryBuilderError> {
        let id = self.next_vertex_id(vertex.position())?;
        let vertex = self.vertex_constructor.new_vertex(vertex);
        self.buffers.vertices.push(vertex);

        Ok(id)
    }
}

impl<'l, OutputVertex, OutputIndex, Ctor> StrokeGeometryBuilder
    for BuffersBuilder<'l, OutputVertex, OutputIndex, Ctor>
where
    OutputVertex: 'l,
    OutputIndex: From<VertexId> + MaxIndex,
    Ctor: StrokeVertexConstructor<OutputVertex>,
{
    fn add_stroke_vertex(&mut self, vertex: StrokeVertex) -> Result<VertexId, GeometryBuilderError> {
        let id = self.next_vertex_id(vertex.position())?;
        let vertex = self.vertex_constructor.new_vertex(vertex);
        self.buffers.vertices.push(vertex);

        Ok(id)
    }
}

/// A geometry builder that counts vertices and discards everything.
///
/// Mostly useful for testing and benchmarks.
#[derive(Default)]
pub struct NoOutput {
    next_vertex: u32,
}

impl NoOutput {
    pub fn new() -> Self {
        NoOutput { next_vertex: 0 }
    }

    fn next_vertex_id(&mut self) -> Result<VertexId, GeometryBuilderError> {
        // u32::MAX is VertexId::INVALID.
        if self.next_vertex == u32::MAX {
            return Err(GeometryBuilderError::TooManyVertices);
        }
        self.next_vertex += 1;

        Ok(VertexId(self.next_vertex - 1))
    }
}

impl GeometryBuilder for NoOutput {
    fn begin_geometry(&mut self) {
        self.next_vertex = 0;
    }

    fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
        debug_assert!(a != b && a != c && b != c);
    }
}

impl FillGeometryBuilder for NoOutput {
    fn add_fill_vertex(&mut self, _: FillVertex) -> Result<VertexId, GeometryBuilderError> {
        self.next_vertex_id()
    }
}

impl StrokeGeometryBuilder for NoOutput {
    fn add_stroke_vertex(&mut self, _: StrokeVertex) -> Result<VertexId, GeometryBuilderError> {
        self.next_vertex_id()
    }
}

/// Forwards the tessellator's output to a pair of callbacks.
///
/// `add_vertex` receives a position and returns the index of the new vertex, or one of
/// the reserved values [`CallbackBuilder::INVALID_VERTEX`] and
/// [`CallbackBuilder::TOO_MANY_VERTICES`] to reject it. `add_triangle` receives the
/// indices of a triangle.
///
/// ```
/// use pathmesh_tessellation::{CallbackBuilder, StrokeOptions, StrokeTessellator};
/// use pathmesh_tessellation::math::point;
/// use pathmesh_tessellation::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = Path::builder();
/// builder.add_line(point(0.0, 0.0), point(10.0, 0.0))?;
/// let path = builder.build()?;
///
/// let mut positions = Vec::new();
/// let mut triangles = Vec::new();
/// StrokeTessellator::new().tessellate_path(
///     &path,
///     &StrokeOptions::default(),
///     &mut CallbackBuilder::new(
///         |x, y| {
///             positions.push((x, y));
///             positions.len() as u32 - 1
///         },
///         |a, b, c| triangles.push([a, b, c]),
///     ),
/// )?;
///
/// assert_eq!(positions.len(), 4);
/// assert_eq!(triangles.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct CallbackBuilder<AddVertex, AddTriangle> {
    add_vertex: AddVertex,
    add_triangle: AddTriangle,
}

impl<AddVertex, AddTriangle> CallbackBuilder<AddVertex, AddTriangle>
where
    AddVertex: FnMut(f32, f32) -> u32,
    AddTriangle: FnMut(u32, u32, u32),
{
    /// Returned by `add_vertex` to reject a vertex as invalid.
    pub const INVALID_VERTEX: u32 = u32::MAX - 1;
    /// Returned by `add_vertex` when the host can't store more vertices.
    pub const TOO_MANY_VERTICES: u32 = u32::MAX;

    pub fn new(add_vertex: AddVertex, add_triangle: AddTriangle) -> Self {
        CallbackBuilder {
            add_vertex,
            add_triangle,
        }
    }

    fn vertex(&mut self, position: Point) -> Result<VertexId, GeometryBuilderError> {
        match (self.add_vertex)(position.x, position.y) {
            Self::INVALID_VERTEX => Err(GeometryBuilderError::InvalidVertex),
            Self::TOO_MANY_VERTICES => Err(GeometryBuilderError::TooManyVertices),
            id => Ok(VertexId(id)),
        }
    }
}

impl<AddVertex, AddTriangle> GeometryBuilder for CallbackBuilder<AddVertex, AddTriangle>
where
    AddVertex: FnMut(f32, f32) -> u32,
    AddTriangle: FnMut(u32, u32, u32),
{
    fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
        (self.add_triangle)(a.0, b.0, c.0);
    }
}

impl<AddVertex, AddTriangle> FillGeometryBuilder for CallbackBuilder<AddVertex, AddTriangle>
where
    AddVertex: FnMut(f32, f32) -> u32,
    AddTriangle: FnMut(u32, u32, u32),
{
    fn add_fill_vertex(&mut self, vertex: FillVertex) -> Result<VertexId, GeometryBuilderError> {
        self.vertex(vertex.position())
    }
}

impl<AddVertex, AddTriangle> StrokeGeometryBuilder for CallbackBuilder<AddVertex, AddTriangle>
where
    AddVertex: FnMut(f32, f32) -> u32,
    AddTriangle: FnMut(u32, u32, u32),
{
    fn add_stroke_vertex(&mut self, vertex: StrokeVertex) -> Result<VertexId, GeometryBuilderError> {
        self.vertex(vertex.position())
    }
}

/// Number of distinct values an index type can take, capped to what `VertexId` can
/// address.
pub trait MaxIndex {
    const MAX: usize;
}

impl MaxIndex for u8 {
    const MAX: usize = u8::MAX as usize;
}
impl MaxIndex for u16 {
    const MAX: usize = u16::MAX as usize;
}
impl MaxIndex for u32 {
    const MAX: usize = u32::MAX as usize;
}
impl MaxIndex for i32 {
    const MAX: usize = i32::MAX as usize;
}
impl MaxIndex for usize {
    const MAX: usize = u32::MAX as usize;
}

#[cfg(test)]
use crate::math::point;

#[test]
fn buffers_builder_offsets_indices() {
    let mut buffers: VertexBuffers<Point, u32> = VertexBuffers::new();
    buffers.vertices.push(point(-1.0, -1.0));

    let mut builder = BuffersBuilder::new(&mut buffers, Positions).with_vertex_offset(10);
    builder.begin_geometry();
    let a = builder.add_fill_vertex(FillVertex::new(point(0.0, 0.0))).unwrap();
    let b = builder.add_fill_vertex(FillVertex::new(point(1.0, 0.0))).unwrap();
    let c = builder.add_fill_vertex(FillVertex::new(point(0.0, 1.0))).unwrap();
    builder.add_triangle(a, b, c);
    builder.end_geometry();

    assert_eq!((a, b, c), (VertexId(1), VertexId(2), VertexId(3)));
    assert_eq!(buffers.vertices.len(), 4);
    assert_eq!(buffers.indices, &[11, 12, 13]);
}

#[test]
fn buffers_builder_rejects_non_finite_positions() {
    let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
    let mut builder = simple_builder(&mut buffers);
    builder.begin_geometry();
    assert_eq!(
        builder.add_fill_vertex(FillVertex::new(point(f32::NAN, 0.0))),
        Err(GeometryBuilderError::InvalidVertex)
    );
    assert_eq!(
        builder.add_fill_vertex(FillVertex::new(point(0.0, f32::INFINITY))),
        Err(GeometryBuilderError::InvalidVertex)
    );
    builder.abort_geometry();

    assert!(buffers.vertices.is_empty());
}

#[test]
fn buffers_builder_index_limit() {
    let mut buffers: VertexBuffers<Point, u8> = VertexBuffers::new();
    let mut builder = BuffersBuilder::new(&mut buffers, Positions);
    builder.begin_geometry();
    for i in 0..255 {
        builder
            .add_fill_vertex(FillVertex::new(point(i as f32, 0.0)))
            .unwrap();
    }
    assert_eq!(
        builder.add_fill_vertex(FillVertex::new(point(0.0, 1.0))),
        Err(GeometryBuilderError::TooManyVertices)
    );
    builder.abort_geometry();

    // Nothing is rolled back, the rejected vertex was never stored.
    assert_eq!(buffers.vertices.len(), 255);

    buffers.clear();
    assert!(buffers.vertices.is_empty());
    assert!(buffers.indices.is_empty());
}

#[test]
fn callback_builder_sentinels() {
    let mut next = 0;
    let mut triangles = Vec::new();
    let mut builder = CallbackBuilder::new(
        |x: f32, _y: f32| {
            if x < 0.0 {
                return u32::MAX - 1;
            }
            if x > 100.0 {
                return u32::MAX;
            }
            next += 1;
            next - 1
        },
        |a, b, c| triangles.push((a, b, c)),
    );

    assert_eq!(
        builder.add_fill_vertex(FillVertex::new(point(1.0, 0.0))),
        Ok(VertexId(0))
    );
    assert_eq!(
        builder.add_fill_vertex(FillVertex::new(point(-1.0, 0.0))),
        Err(GeometryBuilderError::InvalidVertex)
    );
    assert_eq!(
        builder.add_fill_vertex(FillVertex::new(point(101.0, 0.0))),
        Err(GeometryBuilderError::TooManyVertices)
    );
    builder.add_triangle(VertexId(0), VertexId(1), VertexId(2));
    drop(builder);

    assert_eq!(triangles, &[(0, 1, 2)]);
}

#[test]
fn no_output_counts_vertices() {
    let mut output = NoOutput::new();
    output.begin_geometry();
    for i in 0..3 {
        let id = output
            .add_fill_vertex(FillVertex::new(point(0.0, 0.0)))
            .unwrap();
        assert_eq!(id, VertexId(i));
    }
    output.end_geometry();
}
