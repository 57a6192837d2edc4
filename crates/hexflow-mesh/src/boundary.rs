//! Boundary conditions.
//!
//! Elements carry one [`AxisBoundary`] per parametric axis, telling the
//! monotonic-Q limiter where to read the neighbouring gradient on each
//! face. Nodes on the symmetry planes carry a [`SymmetryMask`] that zeroes
//! the acceleration component normal to the plane.

use glam::DVec3;
use hexflow_types::NodeId;
use serde::{Deserialize, Serialize};

/// Parametric axis of a hexahedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Xi,
    Eta,
    Zeta,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Xi, Axis::Eta, Axis::Zeta];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::Xi => 0,
            Axis::Eta => 1,
            Axis::Zeta => 2,
        }
    }
}

/// What lies across one face of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceCondition {
    /// Interior face shared with the given element.
    Neighbor(usize),
    /// Symmetry plane: the element mirrors its own gradient.
    Symmetric,
    /// Free surface: the gradient across the face is zero.
    Free,
}

impl FaceCondition {
    /// Resolves the neighbouring value on this face. `own` is the
    /// element's own value, `neighbor` looks up another element's.
    #[inline]
    pub fn resolve(self, own: f64, neighbor: impl FnOnce(usize) -> f64) -> f64 {
        match self {
            FaceCondition::Neighbor(e) => neighbor(e),
            FaceCondition::Symmetric => own,
            FaceCondition::Free => 0.0,
        }
    }
}

/// Conditions on the minus and plus faces along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisBoundary {
    pub minus: FaceCondition,
    pub plus: FaceCondition,
}

/// Per-axis conditions of one element, indexed by [`Axis::index`].
pub type ElemBoundary = [AxisBoundary; 3];

/// Bit set of the symmetry planes a node lies on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymmetryMask(u8);

impl SymmetryMask {
    pub const NONE: SymmetryMask = SymmetryMask(0);
    pub const X: SymmetryMask = SymmetryMask(0b001);
    pub const Y: SymmetryMask = SymmetryMask(0b010);
    pub const Z: SymmetryMask = SymmetryMask(0b100);

    #[inline]
    pub fn contains(self, other: SymmetryMask) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: SymmetryMask) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Zeroes the components of `a` normal to the node's symmetry planes.
    #[inline]
    pub fn apply(self, mut a: DVec3) -> DVec3 {
        if self.contains(Self::X) {
            a.x = 0.0;
        }
        if self.contains(Self::Y) {
            a.y = 0.0;
        }
        if self.contains(Self::Z) {
            a.z = 0.0;
        }
        a
    }
}

/// Node index sets on the three symmetry planes through the origin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymmetryPlanes {
    /// Nodes on the `x = 0` plane.
    pub x: Vec<NodeId>,
    /// Nodes on the `y = 0` plane.
    pub y: Vec<NodeId>,
    /// Nodes on the `z = 0` plane.
    pub z: Vec<NodeId>,
}

impl SymmetryPlanes {
    /// Folds the three index sets into one mask per node.
    pub fn node_masks(&self, num_node: usize) -> Vec<SymmetryMask> {
        let mut masks = vec![SymmetryMask::NONE; num_node];
        for (set, bit) in [
            (&self.x, SymmetryMask::X),
            (&self.y, SymmetryMask::Y),
            (&self.z, SymmetryMask::Z),
        ] {
            for node in set {
                masks[node.index()].insert(bit);
            }
        }
        masks
    }
}
