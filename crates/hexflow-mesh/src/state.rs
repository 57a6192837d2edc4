//! Mutable simulation state.
//!
//! Node and element data are stored as Structure-of-Arrays so each phase
//! can hand out disjoint `chunks_mut` slabs of exactly the fields it
//! writes, while sharing the rest read-only.

use std::num::NonZeroUsize;

use glam::DVec3;
use hexflow_math::{gather, HexCorners, StrainRate};
use hexflow_types::constants::UNCONSTRAINED_DT;
use hexflow_types::{HydroError, HydroResult};
use serde::{Deserialize, Serialize};

use crate::mesh::HexMesh;
use crate::params::HydroParams;

/// Per-node kinematic state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub pos: Vec<DVec3>,
    pub vel: Vec<DVec3>,
    pub acc: Vec<DVec3>,
    /// Force accumulated over the node's corners this cycle.
    pub force: Vec<DVec3>,
}

/// Mutable view of one contiguous node range.
#[derive(Debug)]
pub struct NodeSlab<'a> {
    /// Index of the first node in the slab.
    pub start: usize,
    pub pos: &'a mut [DVec3],
    pub vel: &'a mut [DVec3],
    pub acc: &'a mut [DVec3],
    pub force: &'a mut [DVec3],
}

impl NodeSlab<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        self.pos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }
}

impl NodeState {
    /// Nodes at rest at the given positions.
    pub fn at_rest(pos: Vec<DVec3>) -> Self {
        let n = pos.len();
        Self {
            pos,
            vel: vec![DVec3::ZERO; n],
            acc: vec![DVec3::ZERO; n],
            force: vec![DVec3::ZERO; n],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    #[inline]
    pub fn gather_positions(&self, nodes: &[usize; 8]) -> HexCorners {
        gather(&self.pos, nodes)
    }

    #[inline]
    pub fn gather_velocities(&self, nodes: &[usize; 8]) -> HexCorners {
        gather(&self.vel, nodes)
    }

    /// Splits the node arrays into slabs of at most `size` nodes.
    pub fn slabs_mut(&mut self, size: NonZeroUsize) -> impl Iterator<Item = NodeSlab<'_>> {
        let size = size.get();
        self.pos
            .chunks_mut(size)
            .zip(self.vel.chunks_mut(size))
            .zip(self.acc.chunks_mut(size))
            .zip(self.force.chunks_mut(size))
            .enumerate()
            .map(move |(i, (((pos, vel), acc), force))| NodeSlab {
                start: i * size,
                pos,
                vel,
                acc,
                force,
            })
    }
}

/// Per-element thermodynamic and kinematic state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElemState {
    // --- Kinematics ---
    /// Relative volume `V / V0`.
    pub v: Vec<f64>,
    /// Change in relative volume over the last cycle.
    pub delv: Vec<f64>,
    /// Volumetric strain rate.
    pub vdov: Vec<f64>,
    /// Relative volume computed this cycle, before snapping.
    pub vnew: Vec<f64>,
    /// Characteristic length.
    pub arealg: Vec<f64>,
    /// Deviatoric strain rate.
    pub strain: Vec<StrainRate>,

    // --- Thermodynamics ---
    pub e: Vec<f64>,
    pub p: Vec<f64>,
    pub q: Vec<f64>,
    /// Linear artificial-viscosity term.
    pub ql: Vec<f64>,
    /// Quadratic artificial-viscosity term.
    pub qq: Vec<f64>,
    /// Sound speed.
    pub ss: Vec<f64>,
}

/// Mutable view of the kinematic fields of one contiguous element range.
#[derive(Debug)]
pub struct KinematicsSlab<'a> {
    pub start: usize,
    pub v: &'a mut [f64],
    pub delv: &'a mut [f64],
    pub vdov: &'a mut [f64],
    pub vnew: &'a mut [f64],
    pub arealg: &'a mut [f64],
    pub strain: &'a mut [StrainRate],
}

impl KinematicsSlab<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        self.v.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }
}

impl ElemState {
    /// Undeformed, unloaded elements (`v = 1`, everything else zero).
    pub fn undeformed(num_elem: usize) -> Self {
        Self {
            v: vec![1.0; num_elem],
            delv: vec![0.0; num_elem],
            vdov: vec![0.0; num_elem],
            vnew: vec![1.0; num_elem],
            arealg: vec![0.0; num_elem],
            strain: vec![StrainRate::default(); num_elem],
            e: vec![0.0; num_elem],
            p: vec![0.0; num_elem],
            q: vec![0.0; num_elem],
            ql: vec![0.0; num_elem],
            qq: vec![0.0; num_elem],
            ss: vec![0.0; num_elem],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.v.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }

    /// Splits the kinematic fields into slabs of at most `size` elements.
    pub fn kinematics_slabs_mut(
        &mut self,
        size: NonZeroUsize,
    ) -> impl Iterator<Item = KinematicsSlab<'_>> {
        let size = size.get();
        self.v
            .chunks_mut(size)
            .zip(self.delv.chunks_mut(size))
            .zip(self.vdov.chunks_mut(size))
            .zip(self.vnew.chunks_mut(size))
            .zip(self.arealg.chunks_mut(size))
            .zip(self.strain.chunks_mut(size))
            .enumerate()
            .map(
                move |(i, (((((v, delv), vdov), vnew), arealg), strain))| KinematicsSlab {
                    start: i * size,
                    v,
                    delv,
                    vdov,
                    vnew,
                    arealg,
                    strain,
                },
            )
    }

    fn check_lengths(&self) -> HydroResult<()> {
        let n = self.v.len();
        let lens = [
            ("delv", self.delv.len()),
            ("vdov", self.vdov.len()),
            ("vnew", self.vnew.len()),
            ("arealg", self.arealg.len()),
            ("strain", self.strain.len()),
            ("e", self.e.len()),
            ("p", self.p.len()),
            ("q", self.q.len()),
            ("ql", self.ql.len()),
            ("qq", self.qq.len()),
            ("ss", self.ss.len()),
        ];
        for (name, len) in lens {
            if len != n {
                return Err(HydroError::InvalidMesh(format!(
                    "Element field `{}` has {} entries, expected {}",
                    name, len, n
                )));
            }
        }
        Ok(())
    }
}

/// Simulation time and the timestep bounds fed back by each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    pub time: f64,
    pub deltatime: f64,
    pub cycle: u64,
    pub dtcourant: f64,
    pub dthydro: f64,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            time: 0.0,
            deltatime: 0.0,
            cycle: 0,
            dtcourant: UNCONSTRAINED_DT,
            dthydro: UNCONSTRAINED_DT,
        }
    }
}

/// Everything a cycle reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshState {
    pub mesh: HexMesh,
    pub nodes: NodeState,
    pub elems: ElemState,
    pub params: HydroParams,
    pub clock: SimClock,
}

impl MeshState {
    /// Assembles a state and validates that all arrays agree with the mesh.
    pub fn new(
        mesh: HexMesh,
        nodes: NodeState,
        elems: ElemState,
        params: HydroParams,
        clock: SimClock,
    ) -> HydroResult<Self> {
        let state = Self {
            mesh,
            nodes,
            elems,
            params,
            clock,
        };
        state.validate()?;
        Ok(state)
    }

    #[inline]
    pub fn num_elem(&self) -> usize {
        self.mesh.num_elem()
    }

    #[inline]
    pub fn num_node(&self) -> usize {
        self.mesh.num_node()
    }

    pub fn validate(&self) -> HydroResult<()> {
        self.mesh.validate()?;
        self.params.validate()?;

        let n = self.nodes.pos.len();
        if n != self.mesh.num_node()
            || self.nodes.vel.len() != n
            || self.nodes.acc.len() != n
            || self.nodes.force.len() != n
        {
            return Err(HydroError::InvalidMesh(format!(
                "Node state arrays do not match node count {}",
                self.mesh.num_node()
            )));
        }

        self.elems.check_lengths()?;
        if self.elems.len() != self.mesh.num_elem() {
            return Err(HydroError::InvalidMesh(format!(
                "Element state has {} entries, mesh has {} elements",
                self.elems.len(),
                self.mesh.num_elem()
            )));
        }
        Ok(())
    }
}
