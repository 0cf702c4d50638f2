//! Per-axis "steps to the next boundary" field for dense grids.
//!
//! For every axis and both sweep directions the field stores one byte per
//! cell. A sweep walks the grid layer by layer along its axis:
//!
//! 1. The first layer is set to zero.
//! 2. Every later cell gets `previous + 1` when its material equals the cell
//!    one layer back, and zero otherwise.
//! 3. The layer is relaxed until no cell exceeds `1 + min(neighbour)` over
//!    its in-layer neighbours on the other axes.
//!
//! The result at a cell is the L1 distance to the nearest *boundary cell*
//! lying in its layer or behind it, where a boundary cell is a first-layer
//! cell or one whose material differs from the cell one layer back.
//! Values saturate at 255, which only ever understates the distance.
//!
//! A ray moving towards higher indices on an axis reads the
//! [`Sweep::Decreasing`] field, which sees the boundaries ahead of it, and
//! vice versa. Taking the minimum over every axis the ray moves along bounds
//! how many cells it can advance without meeting a different material or
//! leaving the grid.

use nalgebra::SVector;
use tracing::{info, warn};

use crate::coord::VoxelCoord;
use crate::dense::DenseVoxelGrid;
use crate::error::VoxelResult;
use crate::range::GridRange;
use crate::volume::{Volume, check_bounds};

/// Direction in which a sweep visits the layers of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sweep {
    /// Starts at layer 0; distances look towards lower indices.
    Increasing,
    /// Starts at layer `size - 1`; distances look towards higher indices.
    Decreasing,
}

impl Sweep {
    /// Both sweeps.
    pub const ALL: [Self; 2] = [Self::Increasing, Self::Decreasing];

    /// The sweep whose distances look along a ray component of this sign.
    #[must_use]
    pub fn facing(component: f64) -> Self {
        if component > 0.0 {
            Self::Decreasing
        } else {
            Self::Increasing
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Increasing => 0,
            Self::Decreasing => 1,
        }
    }

    /// Layer visited at step `step` of a sweep over `size` layers.
    const fn layer(self, step: u32, size: u32) -> u32 {
        match self {
            Self::Increasing => step,
            Self::Decreasing => size - 1 - step,
        }
    }
}

/// Statistics of the per-layer relaxation passes of one recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelaxationReport {
    /// Number of layers relaxed, over every axis and sweep.
    pub layers: usize,
    /// Relaxation passes summed over all layers.
    pub total_passes: usize,
    /// Most passes any single layer needed, including the final unchanged pass.
    pub max_passes: usize,
    /// Upper bound on passes per layer, `(D - 1) * (size - 1) + 1`.
    pub pass_bound: usize,
    /// Layers that hit `pass_bound` while still changing. Always zero.
    pub unconverged_layers: usize,
}

/// Distance field of a [`DenseVoxelGrid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceField<const D: usize> {
    size: u32,
    strides: [usize; D],
    /// `fields[axis][sweep.slot()]` holds one distance per cell.
    fields: Vec<[Vec<u8>; 2]>,
}

impl<const D: usize> DistanceField<D> {
    /// Computes the full field for `grid`.
    pub(crate) fn compute(grid: &DenseVoxelGrid<D>) -> (Self, RelaxationReport) {
        let size = grid.size();
        let strides = *grid.strides();
        let pass_bound = (D - 1) * (size as usize - 1) + 1;

        info!(dimension = D, size, "Recalculating distance field");

        let mut report = RelaxationReport {
            pass_bound,
            ..RelaxationReport::default()
        };
        let fields = (0..D)
            .map(|axis| Sweep::ALL.map(|sweep| sweep_axis(grid, axis, sweep, &mut report)))
            .collect();

        if report.unconverged_layers > 0 {
            warn!(
                layers = report.unconverged_layers,
                pass_bound, "Distance relaxation hit its pass bound"
            );
        }
        info!(
            layers = report.layers,
            total_passes = report.total_passes,
            max_passes = report.max_passes,
            pass_bound,
            "Distance field ready"
        );

        (
            Self {
                size,
                strides,
                fields,
            },
            report,
        )
    }

    /// Edge length of the grid the field was computed for.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Distance stored for `coord` on `axis` in the given sweep.
    ///
    /// # Errors
    ///
    /// Returns [`crate::VoxelError::OutOfBounds`] if `coord` is outside the grid.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= D`.
    pub fn distance(&self, coord: VoxelCoord<D>, axis: usize, sweep: Sweep) -> VoxelResult<u8> {
        check_bounds(coord, self.size)?;
        Ok(self.fields[axis][sweep.slot()][self.index(coord)])
    }

    /// Minimum distance over the axes `direction` moves along, looking the
    /// way it moves. `None` if the direction has no nonzero component.
    pub(crate) fn clearance(&self, index: usize, direction: &SVector<f64, D>) -> Option<u32> {
        (0..D)
            .filter(|&axis| direction[axis] != 0.0)
            .map(|axis| u32::from(self.fields[axis][Sweep::facing(direction[axis]).slot()][index]))
            .min()
    }

    #[allow(clippy::cast_sign_loss)]
    fn index(&self, coord: VoxelCoord<D>) -> usize {
        coord
            .0
            .iter()
            .zip(self.strides.iter())
            .map(|(&c, &stride)| c as usize * stride)
            .sum()
    }
}

/// Coordinates of one layer of `axis`.
#[allow(clippy::cast_possible_wrap)]
fn layer_range<const D: usize>(size: u32, axis: usize, layer: u32) -> GridRange<D> {
    let full = GridRange::<D>::cube(size);
    GridRange::new(
        full.lo.with_axis(axis, layer as i32),
        full.hi.with_axis(axis, layer as i32 + 1),
    )
}

fn sweep_axis<const D: usize>(
    grid: &DenseVoxelGrid<D>,
    axis: usize,
    sweep: Sweep,
    report: &mut RelaxationReport,
) -> Vec<u8> {
    let size = grid.size();
    let strides = grid.strides();
    let mut field = vec![0u8; grid.cell_count()];

    for step in 0..size {
        let layer = layer_range::<D>(size, axis, sweep.layer(step, size));

        if step > 0 {
            for coord in &layer {
                let index = grid.linear_index(coord);
                let previous = match sweep {
                    Sweep::Increasing => index - strides[axis],
                    Sweep::Decreasing => index + strides[axis],
                };
                field[index] = if grid.cell(index) == grid.cell(previous) {
                    field[previous].saturating_add(1)
                } else {
                    0
                };
            }
        }

        let passes = relax_layer(&mut field, &layer, grid, axis, report.pass_bound);
        report.layers += 1;
        report.total_passes += passes;
        report.max_passes = report.max_passes.max(passes);
        if passes >= report.pass_bound && !layer_is_relaxed(&field, &layer, grid, axis) {
            report.unconverged_layers += 1;
        }
    }

    field
}

/// Runs in-place relaxation passes over one layer until a pass changes
/// nothing or `pass_bound` passes ran. Returns the number of passes.
fn relax_layer<const D: usize>(
    field: &mut [u8],
    layer: &GridRange<D>,
    grid: &DenseVoxelGrid<D>,
    axis: usize,
    pass_bound: usize,
) -> usize {
    let mut passes = 0;
    loop {
        passes += 1;
        let mut changed = false;
        for coord in layer {
            let index = grid.linear_index(coord);
            let bound = neighbour_bound(field, coord, index, grid, axis);
            if bound < field[index] {
                field[index] = bound;
                changed = true;
            }
        }
        if !changed || passes >= pass_bound {
            return passes;
        }
    }
}

fn layer_is_relaxed<const D: usize>(
    field: &[u8],
    layer: &GridRange<D>,
    grid: &DenseVoxelGrid<D>,
    axis: usize,
) -> bool {
    layer.all(|coord| {
        let index = grid.linear_index(coord);
        field[index] <= neighbour_bound(field, coord, index, grid, axis)
    })
}

/// `1 + min(neighbour)` over the in-layer neighbours of `coord`.
fn neighbour_bound<const D: usize>(
    field: &[u8],
    coord: VoxelCoord<D>,
    index: usize,
    grid: &DenseVoxelGrid<D>,
    axis: usize,
) -> u8 {
    let size = grid.size();
    let strides = grid.strides();
    let mut bound = u8::MAX;
    for other in (0..D).filter(|&other| other != axis) {
        if coord[other] > 0 {
            bound = bound.min(field[index - strides[other]].saturating_add(1));
        }
        if coord[other].unsigned_abs() + 1 < size {
            bound = bound.min(field[index + strides[other]].saturating_add(1));
        }
    }
    bound
}
