//! Static hexahedral mesh.
//!
//! Everything here is fixed once the mesh is built: connectivity,
//! reference volumes, masses, boundary conditions, the node → corner
//! adjacency and region membership. The solver only reads it.

use hexflow_types::{HydroError, HydroResult};
use serde::{Deserialize, Serialize};

use crate::boundary::{ElemBoundary, FaceCondition, SymmetryMask, SymmetryPlanes};
use crate::regions::RegionSet;
use crate::topology::CornerAdjacency;

/// An unstructured mesh of 8-node hexahedra.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexMesh {
    /// Elements along one edge for structured cube meshes (`nx`).
    pub edge_elems: usize,

    // --- Element data ---
    /// Eight node indices per element, in local hex order.
    pub connectivity: Vec<[usize; 8]>,
    /// Per-axis face conditions.
    pub boundary: Vec<ElemBoundary>,
    /// Reference (initial) volume.
    pub volo: Vec<f64>,
    pub elem_mass: Vec<f64>,

    // --- Node data ---
    pub nodal_mass: Vec<f64>,
    /// Symmetry-plane node sets.
    pub symmetry: SymmetryPlanes,
    /// Per-node mask derived from `symmetry`.
    pub node_symmetry: Vec<SymmetryMask>,

    pub adjacency: CornerAdjacency,
    pub regions: RegionSet,
}

impl HexMesh {
    #[inline]
    pub fn num_elem(&self) -> usize {
        self.connectivity.len()
    }

    #[inline]
    pub fn num_node(&self) -> usize {
        self.nodal_mass.len()
    }

    #[inline]
    pub fn num_regions(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn elem_nodes(&self, elem: usize) -> &[usize; 8] {
        &self.connectivity[elem]
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - Element and node arrays have consistent lengths
    /// - Connectivity and neighbour indices are in range
    /// - The adjacency lists exactly the element corners
    /// - Regions partition the element set
    pub fn validate(&self) -> HydroResult<()> {
        let num_elem = self.num_elem();
        let num_node = self.num_node();

        for (name, len) in [
            ("boundary", self.boundary.len()),
            ("volo", self.volo.len()),
            ("elem_mass", self.elem_mass.len()),
        ] {
            if len != num_elem {
                return Err(HydroError::InvalidMesh(format!(
                    "Element array `{}` has {} entries, expected {}",
                    name, len, num_elem
                )));
            }
        }
        if self.node_symmetry.len() != num_node {
            return Err(HydroError::InvalidMesh(format!(
                "Symmetry masks cover {} nodes, expected {}",
                self.node_symmetry.len(),
                num_node
            )));
        }

        for (elem, nodes) in self.connectivity.iter().enumerate() {
            if let Some(&bad) = nodes.iter().find(|&&n| n >= num_node) {
                return Err(HydroError::InvalidMesh(format!(
                    "Element {} references node {} (node count: {})",
                    elem, bad, num_node
                )));
            }
        }

        for (elem, axes) in self.boundary.iter().enumerate() {
            for face in axes.iter().flat_map(|a| [a.minus, a.plus]) {
                if let FaceCondition::Neighbor(other) = face {
                    if other >= num_elem {
                        return Err(HydroError::InvalidMesh(format!(
                            "Element {} has neighbour {} (element count: {})",
                            elem, other, num_elem
                        )));
                    }
                }
            }
        }

        for node in self
            .symmetry
            .x
            .iter()
            .chain(&self.symmetry.y)
            .chain(&self.symmetry.z)
        {
            if node.index() >= num_node {
                return Err(HydroError::InvalidMesh(format!(
                    "Symmetry node {} out of range (node count: {})",
                    node.index(),
                    num_node
                )));
            }
        }

        if self.adjacency.num_nodes() != num_node || self.adjacency.num_corners() != num_elem * 8 {
            return Err(HydroError::InvalidMesh(
                "Corner adjacency does not match the mesh size".into(),
            ));
        }
        for node in 0..num_node {
            for &slot in self.adjacency.corners(node) {
                if self.connectivity[slot / 8][slot % 8] != node {
                    return Err(HydroError::InvalidMesh(format!(
                        "Corner slot {} listed at node {} belongs to node {}",
                        slot,
                        node,
                        self.connectivity[slot / 8][slot % 8]
                    )));
                }
            }
        }

        self.regions.validate_partition(num_elem)
    }
}
