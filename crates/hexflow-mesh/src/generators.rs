//! Procedural problem builders.
//!
//! The Sedov blast wave: a cube of `size³` hexahedra on `[0, 1.125]³`
//! with symmetry planes through the origin, free outer faces and a point
//! energy deposit in the origin element.

use glam::DVec3;
use hexflow_math::volume::elem_volume;
use hexflow_math::gather;
use hexflow_types::constants::{MESH_EXTENT, SEDOV_EBASE, SEDOV_REFERENCE_SIZE};
use hexflow_types::{HydroError, HydroResult, NodeId, RegionId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::boundary::{AxisBoundary, ElemBoundary, FaceCondition, SymmetryPlanes};
use crate::mesh::HexMesh;
use crate::params::HydroParams;
use crate::regions::RegionSet;
use crate::state::{ElemState, MeshState, NodeState, SimClock};
use crate::topology::CornerAdjacency;

/// Sedov problem parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SedovConfig {
    /// Elements along each edge of the cube.
    pub size: usize,
    pub num_regions: usize,
    /// Exponent of the region weights `(i + 1)^balance`.
    pub balance: u32,
    /// Extra relaxation passes for expensive regions.
    pub cost: u32,
    /// Seed of the region assignment generator.
    pub seed: u64,
}

impl Default for SedovConfig {
    fn default() -> Self {
        Self {
            size: 30,
            num_regions: 11,
            balance: 1,
            cost: 1,
            seed: 0,
        }
    }
}

impl SedovConfig {
    /// Small mesh for quick tests.
    pub fn small(size: usize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> HydroResult<()> {
        if self.size == 0 {
            return Err(HydroError::InvalidConfig(
                "Mesh size must be at least 1".into(),
            ));
        }
        if self.num_regions == 0 {
            return Err(HydroError::InvalidConfig(
                "At least one region is required".into(),
            ));
        }
        Ok(())
    }
}

/// Builds the Sedov problem with default [`HydroParams`].
///
/// # Example
/// ```
/// use hexflow_mesh::generators::{sedov_cube, SedovConfig};
/// let state = sedov_cube(&SedovConfig::small(2)).unwrap();
/// assert_eq!(state.num_elem(), 8);
/// assert_eq!(state.num_node(), 27);
/// ```
pub fn sedov_cube(config: &SedovConfig) -> HydroResult<MeshState> {
    sedov_cube_with(config, HydroParams::default())
}

/// Builds the Sedov problem with the given parameters.
pub fn sedov_cube_with(config: &SedovConfig, params: HydroParams) -> HydroResult<MeshState> {
    config.validate()?;

    let nx = config.size;
    let edge_nodes = nx + 1;
    let num_elem = nx * nx * nx;
    let num_node = edge_nodes * edge_nodes * edge_nodes;

    // Node lattice, x fastest
    let mut pos = Vec::with_capacity(num_node);
    for plane in 0..edge_nodes {
        let z = MESH_EXTENT * plane as f64 / nx as f64;
        for row in 0..edge_nodes {
            let y = MESH_EXTENT * row as f64 / nx as f64;
            for col in 0..edge_nodes {
                let x = MESH_EXTENT * col as f64 / nx as f64;
                pos.push(DVec3::new(x, y, z));
            }
        }
    }

    let connectivity = cube_connectivity(nx);
    let boundary = cube_boundary(nx);
    let symmetry = symmetry_planes(nx);
    let node_symmetry = symmetry.node_masks(num_node);
    let adjacency = CornerAdjacency::build(&connectivity, num_node);

    let mut volo = Vec::with_capacity(num_elem);
    let mut nodal_mass = vec![0.0; num_node];
    for nodes in &connectivity {
        let volume = elem_volume(&gather(&pos, nodes));
        volo.push(volume);
        for &n in nodes {
            nodal_mass[n] += volume / 8.0;
        }
    }
    let elem_mass = volo.clone();

    let regions = if config.num_regions == 1 {
        RegionSet::single(num_elem, config.cost)
    } else {
        let region_of = assign_regions(num_elem, config)?;
        RegionSet::from_assignment(region_of, config.num_regions, config.cost)?
    };

    let mesh = HexMesh {
        edge_elems: nx,
        connectivity,
        boundary,
        volo,
        elem_mass,
        nodal_mass,
        symmetry,
        node_symmetry,
        adjacency,
        regions,
    };

    let mut elems = ElemState::undeformed(num_elem);
    let scale = nx as f64 / SEDOV_REFERENCE_SIZE;
    let einit = SEDOV_EBASE * scale * scale * scale;
    elems.e[0] = einit;

    let clock = SimClock {
        deltatime: 0.5 * mesh.volo[0].cbrt() / (2.0 * einit).sqrt(),
        ..SimClock::default()
    };

    tracing::debug!(
        size = nx,
        elements = num_elem,
        nodes = num_node,
        regions = mesh.num_regions(),
        "Built Sedov mesh"
    );

    MeshState::new(mesh, NodeState::at_rest(pos), elems, params, clock)
}

/// Standard hex connectivity of an `nx³` lattice.
pub fn cube_connectivity(nx: usize) -> Vec<[usize; 8]> {
    let e = nx + 1;
    let e2 = e * e;
    let mut connectivity = Vec::with_capacity(nx * nx * nx);
    let mut nidx = 0;
    for _plane in 0..nx {
        for _row in 0..nx {
            for _col in 0..nx {
                connectivity.push([
                    nidx,
                    nidx + 1,
                    nidx + e + 1,
                    nidx + e,
                    nidx + e2,
                    nidx + e2 + 1,
                    nidx + e2 + e + 1,
                    nidx + e2 + e,
                ]);
                nidx += 1;
            }
            nidx += 1;
        }
        nidx += e;
    }
    connectivity
}

/// Face conditions of an `nx³` cube: symmetric on the three faces through
/// the origin, free on the three opposite faces, neighbours inside.
pub fn cube_boundary(nx: usize) -> Vec<ElemBoundary> {
    let strides = [1, nx, nx * nx];
    let mut boundary = Vec::with_capacity(nx * nx * nx);
    for plane in 0..nx {
        for row in 0..nx {
            for col in 0..nx {
                let elem = plane * nx * nx + row * nx + col;
                let coords = [col, row, plane];
                let axes: ElemBoundary = std::array::from_fn(|axis| {
                    let c = coords[axis];
                    let stride = strides[axis];
                    AxisBoundary {
                        minus: if c == 0 {
                            FaceCondition::Symmetric
                        } else {
                            FaceCondition::Neighbor(elem - stride)
                        },
                        plus: if c + 1 == nx {
                            FaceCondition::Free
                        } else {
                            FaceCondition::Neighbor(elem + stride)
                        },
                    }
                });
                boundary.push(axes);
            }
        }
    }
    boundary
}

/// Node sets on the `x = 0`, `y = 0` and `z = 0` planes, in ascending order.
pub fn symmetry_planes(nx: usize) -> SymmetryPlanes {
    let e = nx + 1;
    let mut planes = SymmetryPlanes::default();
    for plane in 0..e {
        for row in 0..e {
            for col in 0..e {
                let node = NodeId::from(plane * e * e + row * e + col);
                if col == 0 {
                    planes.x.push(node);
                }
                if row == 0 {
                    planes.y.push(node);
                }
                if plane == 0 {
                    planes.z.push(node);
                }
            }
        }
    }
    planes
}

/// Random region assignment in runs of consecutive elements.
///
/// Region `i` is drawn with weight `(i + 1)^balance`, never twice in a
/// row; run lengths follow a heavy-tailed bin distribution dominated by
/// short runs of 1–15 elements. The same seed always yields the same
/// assignment.
pub fn assign_regions(num_elem: usize, config: &SedovConfig) -> HydroResult<Vec<RegionId>> {
    let num_regions = config.num_regions;
    if num_regions == 0 {
        return Err(HydroError::InvalidConfig(
            "At least one region is required".into(),
        ));
    }
    if num_regions == 1 {
        return Ok(vec![RegionId(0); num_elem]);
    }

    let mut bin_end = Vec::with_capacity(num_regions);
    let mut cost_denominator: u64 = 0;
    for i in 0..num_regions {
        let weight = (i as u64 + 1).checked_pow(config.balance).ok_or_else(|| {
            HydroError::InvalidConfig(format!(
                "Region weight overflows for balance {}",
                config.balance
            ))
        })?;
        cost_denominator = cost_denominator.checked_add(weight).ok_or_else(|| {
            HydroError::InvalidConfig("Region weights overflow".into())
        })?;
        bin_end.push(cost_denominator);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let draw_region = |rng: &mut ChaCha8Rng| {
        let var = rng.gen_range(0..cost_denominator);
        bin_end.iter().position(|&end| var < end).unwrap_or(num_regions - 1)
    };

    let mut region_of = Vec::with_capacity(num_elem);
    let mut last: Option<usize> = None;
    while region_of.len() < num_elem {
        let mut region = draw_region(&mut rng);
        while Some(region) == last {
            region = draw_region(&mut rng);
        }

        let bin: u32 = rng.gen_range(0..1000);
        let run = match bin {
            0..=772 => rng.gen_range(1..=15),
            773..=936 => rng.gen_range(16..=31),
            937..=969 => rng.gen_range(32..=63),
            970..=973 => rng.gen_range(64..=127),
            974..=977 => rng.gen_range(128..=255),
            978..=980 => rng.gen_range(256..=511),
            _ => rng.gen_range(512..=2048),
        };

        let end = (region_of.len() + run).min(num_elem);
        region_of.resize(end, RegionId::from(region));
        last = Some(region);
    }
    Ok(region_of)
}
