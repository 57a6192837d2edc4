//! Node → element corner adjacency.
//!
//! Element kernels write their eight corner forces into element-indexed
//! scratch (slot `elem * 8 + local`). The combine step then needs, for each
//! node, the list of slots that touch it. That list is static and stored
//! in compressed-row form.

use serde::{Deserialize, Serialize};

/// Compressed node → corner-slot map.
///
/// The slots of node `n` are `corners[start[n]..start[n + 1]]`, in
/// ascending slot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerAdjacency {
    start: Vec<usize>,
    corners: Vec<usize>,
}

impl CornerAdjacency {
    /// Builds the map from element connectivity with a counting sort.
    pub fn build(connectivity: &[[usize; 8]], num_node: usize) -> Self {
        let mut start = vec![0usize; num_node + 1];
        for nodes in connectivity {
            for &n in nodes {
                start[n + 1] += 1;
            }
        }
        for n in 0..num_node {
            start[n + 1] += start[n];
        }

        let mut fill = start.clone();
        let mut corners = vec![0usize; connectivity.len() * 8];
        for (elem, nodes) in connectivity.iter().enumerate() {
            for (local, &n) in nodes.iter().enumerate() {
                corners[fill[n]] = elem * 8 + local;
                fill[n] += 1;
            }
        }

        Self { start, corners }
    }

    /// Corner slots incident on `node`.
    #[inline]
    pub fn corners(&self, node: usize) -> &[usize] {
        &self.corners[self.start[node]..self.start[node + 1]]
    }

    /// Number of element corners at `node`.
    #[inline]
    pub fn valence(&self, node: usize) -> usize {
        self.start[node + 1] - self.start[node]
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.start.len().saturating_sub(1)
    }

    /// Total number of corner slots (`8 * num_elem`).
    #[inline]
    pub fn num_corners(&self) -> usize {
        self.corners.len()
    }
}
