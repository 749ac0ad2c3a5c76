/// The tessellators' result type.
pub type TessellationResult = Result<(), TessellationError>;

/// An error reported by the output while the tessellator adds geometry.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GeometryBuilderError {
    /// The vertex is not representable, typically because a coordinate is NaN or infinite.
    #[error("invalid vertex")]
    InvalidVertex,
    /// The output can't address more vertices.
    #[error("too many vertices")]
    TooManyVertices,
}

/// Options rejected before tessellation starts.
#[non_exhaustive]
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InvalidOptions {
    #[error("the tolerance must be a positive number")]
    Tolerance,
    #[error("the line width must be a positive number")]
    LineWidth,
    #[error("the miter limit must be greater than or equal to 1")]
    MiterLimit,
}

/// Describes an unexpected error happening during tessellation.
///
/// These come from the fill sweep when the active edges end up in an order it
/// can't recover from, usually because of floating point precision issues with
/// self-intersecting input.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InternalError {
    #[error("incorrect active edge order ({0})")]
    IncorrectActiveEdgeOrder(i16),
    #[error("insufficient number of spans")]
    InsufficientNumberOfSpans,
    #[error("merge vertex is outside of the shape")]
    MergeVertexOutside,
}

/// The tessellators' error enumeration.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TessellationError {
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] InvalidOptions),
    #[error("geometry builder error: {0}")]
    GeometryBuilder(#[from] GeometryBuilderError),
    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

#[test]
fn error_messages() {
    use alloc::string::ToString;

    let err: TessellationError = GeometryBuilderError::TooManyVertices.into();
    assert_eq!(err.to_string(), "geometry builder error: too many vertices");

    let err: TessellationError = InternalError::IncorrectActiveEdgeOrder(3).into();
    assert_eq!(err.to_string(), "internal error: incorrect active edge order (3)");

    let err = TessellationError::from(InvalidOptions::MiterLimit);
    assert_eq!(err, TessellationError::InvalidOptions(InvalidOptions::MiterLimit));
}
