#![deny(bare_trait_objects)]
#![no_std]

//! 2D path tessellation in Rust.
//!
//! # Crates
//!
//! This meta-crate (`pathmesh`) reexports the following sub-crates for convenience:
//!
//! * **pathmesh_tessellation** - Fill and stroke tessellation.
//! * **pathmesh_path** - Tools to build and iterate over paths.
//! * **pathmesh_geom** - Line segments and bézier curves, and their flattening.
//!
//! Each `pathmesh_<name>` crate is reexported as a `<name>` module in `pathmesh`. For example:
//!
//! ```ignore
//! use pathmesh_tessellation::FillTessellator;
//! ```
//!
//! Is equivalent to:
//!
//! ```ignore
//! use pathmesh::tessellation::FillTessellator;
//! ```
//!
//! # Feature flags
//!
//! serialization using serde can be enabled on each crate using the
//! `serialization` feature flag (disabled by default).
//!
//! All crates work without the standard library when the default `std` feature is
//! disabled.
//!
//! # Examples
//!
//! ## Building and tessellating an arbitrary path
//!
//! ```
//! use pathmesh::math::{point, Point};
//! use pathmesh::path::Path;
//! use pathmesh::tessellation::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Build a Path.
//! let mut builder = Path::builder();
//! builder
//!     .begin(point(0.0, 0.0))?
//!     .line_to(point(1.0, 0.0))?
//!     .quadratic_bezier_to(point(2.0, 0.0), point(2.0, 1.0))?
//!     .cubic_bezier_to(point(1.0, 1.0), point(0.0, 1.0), point(0.0, 0.0))?
//!     .close()?;
//! let path = builder.build()?;
//!
//! // Let's use our own custom vertex type instead of the default one.
//! #[derive(Copy, Clone, Debug)]
//! struct MyVertex { position: [f32; 2] }
//!
//! // Will contain the result of the tessellation.
//! let mut geometry: VertexBuffers<MyVertex, u16> = VertexBuffers::new();
//!
//! let mut tessellator = FillTessellator::new();
//!
//! // Compute the tessellation.
//! tessellator.tessellate_path(
//!     &path,
//!     &FillOptions::default(),
//!     &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| {
//!         MyVertex {
//!             position: vertex.position().to_array(),
//!         }
//!     }),
//! )?;
//!
//! // The tessellated geometry is ready to be uploaded to the GPU.
//! println!(" -- {} vertices {} indices",
//!     geometry.vertices.len(),
//!     geometry.indices.len()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Stroking a rounded rectangle
//!
//! ```
//! use pathmesh::math::{box2d, Point};
//! use pathmesh::path::Path;
//! use pathmesh::tessellation::{StrokeOptions, StrokeTessellator, LineJoin, VertexBuffers, simple_builder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = Path::builder();
//! builder.add_rounded_rect(&box2d(0.0, 0.0, 100.0, 50.0), 10.0)?;
//! let path = builder.build()?;
//!
//! let mut geometry: VertexBuffers<Point, u16> = VertexBuffers::new();
//! StrokeTessellator::new().tessellate_path(
//!     &path,
//!     &StrokeOptions::tolerance(0.1)
//!         .with_line_width(4.0)
//!         .with_line_join(LineJoin::Round),
//!     &mut simple_builder(&mut geometry),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## What is the tolerance variable in these examples?
//!
//! The tessellators operate on flattened paths (that only contain line segments)
//! so the curves are approximated with sequences of line segments.
//! The tolerance is the maximum distance allowed between a curve and its approximation.

pub extern crate pathmesh_tessellation;

pub use pathmesh_tessellation as tessellation;
pub use tessellation::geom;
pub use tessellation::path;

pub use path::math;
