//! Strongly-typed identifiers for mesh entities.
//!
//! Newtype wrappers prevent accidental mixing of node indices
//! with element indices or region indices. Hot loops work on raw
//! `usize`; ids appear at API boundaries (errors, region tables,
//! symmetry-plane node sets).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index into the per-node arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Index into the per-element arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElemId(pub u32);

/// Index into the region table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub u16);

impl NodeId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ElemId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl RegionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for NodeId {
    fn from(val: usize) -> Self {
        Self(val as u32)
    }
}

impl From<usize> for ElemId {
    fn from(val: usize) -> Self {
        Self(val as u32)
    }
}

impl From<usize> for RegionId {
    fn from(val: usize) -> Self {
        Self(val as u16)
    }
}

impl fmt::Display for ElemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
