//! N-dimensional voxel volumes, grid ray marching and stochastic path tracing.
//!
//! Every type is generic over a spatial dimension `D` fixed at compile time,
//! so the same code drives a 2D slice and a 4D hypervolume:
//!
//! - [`SparseVoxelTree`] - Compressed `2^D`-ary tree that collapses uniform regions
//! - [`DenseVoxelGrid`] - Flat `size^D` array with an optional [`DistanceField`]
//! - [`Volume`] - The storage capability both implement
//! - [`Ray`], [`GridWalk`] and [`cast`] - DDA traversal to the next material boundary
//! - [`PathTracer`] - Depth-bounded Monte-Carlo shading over a [`MaterialTable`]
//! - [`VoxelEditor`] - Rectangle and sphere fills
//! - [`DirectionSampler`] - Uniform unit directions by rejection sampling
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. Rendering to
//! pixels, windows and scene files is left to the caller; the tracer returns
//! colors only.
//!
//! # Coordinates
//!
//! Cells are addressed by integer [`VoxelCoord`]s in `[0, size)^D`. Rays use
//! continuous `f64` coordinates in the same units, so cell `c` covers
//! `[c, c + 1)` on every axis.
//!
//! # Example
//!
//! ```
//! use cf_voxtrace::{
//!     Color, DenseVoxelGrid, Material, MaterialTable, PathTracer, Ray, TraceConfig, VoxelCoord,
//!     VoxelEditor,
//! };
//! use nalgebra::{Point3, Vector3};
//!
//! let mut materials = MaterialTable::new();
//! let air = materials.push(Material::default());
//! let lamp = materials.push(Material::light(Color::WHITE));
//! let clay = materials.push(Material::new(Color::gray(0.6)));
//!
//! let mut grid: DenseVoxelGrid<3> = DenseVoxelGrid::with_material(16, air).unwrap();
//! let mut editor = VoxelEditor::new(&mut grid);
//! editor
//!     .fill_rectangle(VoxelCoord::new([0, 0, 15]), VoxelCoord::new([16, 16, 1]), lamp)
//!     .unwrap();
//! editor.fill_circle(VoxelCoord::new([8, 8, 4]), 3, clay).unwrap();
//! grid.recalculate_distances();
//!
//! let config = TraceConfig::new().with_seed(7);
//! let mut tracer = PathTracer::new(&grid, &materials, config);
//! let ray = Ray::new(Point3::new(8.5, 8.5, 12.5), Vector3::new(0.1, -0.05, 1.0));
//! let color = tracer.trace(&ray).unwrap();
//! assert_eq!(color, Color::WHITE);
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod color;
mod coord;
mod dense;
mod distance;
mod editor;
mod error;
mod material;
mod range;
mod raycast;
mod sampler;
mod sparse;
mod tracer;
mod volume;

// Re-export core types
pub use color::Color;
pub use coord::VoxelCoord;
pub use dense::DenseVoxelGrid;
pub use distance::{DistanceField, RelaxationReport, Sweep};
pub use editor::VoxelEditor;
pub use error::{VoxelError, VoxelResult};
pub use material::{Material, MaterialIndex, MaterialTable};
pub use range::{GridRange, GridRangeIter};
pub use raycast::{BoundaryHit, GridWalk, Ray, cast};
pub use sampler::DirectionSampler;
pub use sparse::{MAX_DEPTH, SparseVoxelTree};
pub use tracer::{PathTracer, TraceConfig, TraceContext, TraceStats};
pub use volume::Volume;
