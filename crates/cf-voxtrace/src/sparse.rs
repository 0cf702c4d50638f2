//! Sparse `2^D`-ary tree storage with monomaterial compression.
//!
//! Every node has `2^D` child slots. A slot either holds a leaf material,
//! covering the whole sub-cube below it, or owns a child node. Writes split
//! leaves on the way down and collapse nodes whose children all became the
//! same leaf on the way back up, so the number of nodes tracks the number of
//! material boundaries rather than the volume.
//!
//! # Example
//!
//! ```
//! use cf_voxtrace::{SparseVoxelTree, Volume, VoxelCoord};
//!
//! let mut tree: SparseVoxelTree<3> = SparseVoxelTree::new(4).unwrap();
//! assert_eq!(tree.size(), 16);
//!
//! let c = VoxelCoord::new([3, 9, 12]);
//! tree.set_material(c, 2).unwrap();
//! assert_eq!(tree.material(c).unwrap(), 2);
//! assert_eq!(tree.node_count(), 4);
//!
//! // Writing the surrounding material back collapses every split node
//! tree.set_material(c, 0).unwrap();
//! assert_eq!(tree.node_count(), 1);
//! ```

use tracing::debug;

use crate::coord::VoxelCoord;
use crate::error::{VoxelError, VoxelResult};
use crate::material::MaterialIndex;
use crate::volume::{Volume, check_bounds};

/// Largest supported tree depth; keeps `size` and coordinates within `i32`.
pub const MAX_DEPTH: u32 = 30;

/// Largest supported dimension; keeps the per-node arity allocatable.
const MAX_DIMENSION: usize = 16;

/// A child slot: either a uniform leaf or an owned subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Leaf(MaterialIndex),
    Branch(Box<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    /// `2^D` slots indexed by [`VoxelCoord::child_index`].
    children: Box<[Slot]>,
}

impl Node {
    fn filled(material: MaterialIndex, arity: usize) -> Self {
        Self {
            children: vec![Slot::Leaf(material); arity].into_boxed_slice(),
        }
    }

    /// The shared material if every child is the same leaf.
    fn uniform_material(&self) -> Option<MaterialIndex> {
        let Some(Slot::Leaf(first)) = self.children.first() else {
            return None;
        };
        self.children
            .iter()
            .all(|slot| matches!(slot, Slot::Leaf(m) if m == first))
            .then_some(*first)
    }

    /// Writes `material` at `coord` below this node, which sits at `level`.
    ///
    /// Returns the shared material when this node became uniform, in which
    /// case the parent replaces it by a leaf.
    fn set<const D: usize>(
        &mut self,
        coord: VoxelCoord<D>,
        level: u32,
        material: MaterialIndex,
    ) -> Option<MaterialIndex> {
        let arity = self.children.len();
        let slot = &mut self.children[coord.child_index(level)];

        if level == 0 {
            *slot = Slot::Leaf(material);
            return self.uniform_material();
        }

        if let Slot::Leaf(old) = *slot {
            if old == material {
                // Nothing changes, and a non-root node is never uniform
                return None;
            }
            *slot = Slot::Branch(Box::new(Self::filled(old, arity)));
        }

        if let Slot::Branch(child) = slot {
            match child.set(coord, level - 1, material) {
                Some(shared) => *slot = Slot::Leaf(shared),
                None => debug_assert!(
                    child.uniform_material().is_none(),
                    "uniform node left uncollapsed"
                ),
            }
        }

        self.uniform_material()
    }

    fn count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|slot| match slot {
                Slot::Leaf(_) => 0,
                Slot::Branch(child) => child.count(),
            })
            .sum::<usize>()
    }

    /// Checks that no node below this one is uniform and that the finest
    /// level only holds leaves.
    fn subtree_compressed(&self, level: u32) -> bool {
        self.children.iter().all(|slot| match slot {
            Slot::Leaf(_) => true,
            Slot::Branch(child) => {
                level > 0
                    && child.uniform_material().is_none()
                    && child.subtree_compressed(level - 1)
            }
        })
    }
}

/// A compressed sparse voxel volume of edge length `2^depth`.
///
/// The root node is always retained; every other node has at least two
/// distinct children. Dropping the tree frees every owned node exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseVoxelTree<const D: usize> {
    depth: u32,
    root: Node,
}

impl<const D: usize> SparseVoxelTree<D> {
    /// Creates a tree of the given depth filled with material 0.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::InvalidDepth`] if `depth` is not in
    /// `1..=MAX_DEPTH`, or [`VoxelError::InvalidDimension`] if `D` is zero or
    /// too large.
    pub fn new(depth: u32) -> VoxelResult<Self> {
        Self::with_material(depth, 0)
    }

    /// Creates a tree of the given depth filled with `material`.
    ///
    /// # Errors
    ///
    /// Same as [`SparseVoxelTree::new`].
    pub fn with_material(depth: u32, material: MaterialIndex) -> VoxelResult<Self> {
        if D == 0 || D > MAX_DIMENSION {
            return Err(VoxelError::InvalidDimension(D));
        }
        if depth == 0 || depth > MAX_DEPTH {
            return Err(VoxelError::InvalidDepth {
                depth,
                max: MAX_DEPTH,
            });
        }

        debug!(dimension = D, depth, material, "Created sparse voxel tree");
        Ok(Self {
            depth,
            root: Node::filled(material, 1 << D),
        })
    }

    /// Number of levels below the root.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of allocated nodes, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    /// Returns `true` if no node other than the root has `2^D` equal leaf
    /// children.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.root.subtree_compressed(self.depth - 1)
    }
}

impl<const D: usize> Volume<D> for SparseVoxelTree<D> {
    fn size(&self) -> u32 {
        1 << self.depth
    }

    fn material(&self, coord: VoxelCoord<D>) -> VoxelResult<MaterialIndex> {
        check_bounds(coord, self.size())?;

        let mut node = &self.root;
        let mut level = self.depth - 1;
        loop {
            match &node.children[coord.child_index(level)] {
                Slot::Leaf(material) => return Ok(*material),
                Slot::Branch(child) => {
                    debug_assert!(level > 0, "branch below the finest level");
                    node = child;
                    level = level.saturating_sub(1);
                }
            }
        }
    }

    fn set_material(&mut self, coord: VoxelCoord<D>, material: MaterialIndex) -> VoxelResult<()> {
        check_bounds(coord, self.size())?;
        // The root is retained even when uniform
        let _ = self.root.set(coord, self.depth - 1, material);
        Ok(())
    }
}
