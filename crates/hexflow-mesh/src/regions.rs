//! Region membership.
//!
//! A region is an ordered list of elements sharing a cost class. The
//! material phase walks regions one by one and inflates the work of the
//! expensive ones; the set of regions must cover every element exactly once.

use hexflow_types::{HydroError, HydroResult, RegionId};
use serde::{Deserialize, Serialize};

/// One region: its elements in ascending order and its cost multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub elems: Vec<usize>,
    pub cost: u32,
}

impl Region {
    #[inline]
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }
}

/// All regions of a mesh plus the reverse element → region map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSet {
    regions: Vec<Region>,
    region_of: Vec<RegionId>,
}

impl RegionSet {
    /// Builds the region lists from a per-element assignment. Elements are
    /// listed in ascending index order within each region.
    pub fn from_assignment(
        region_of: Vec<RegionId>,
        num_regions: usize,
        cost: u32,
    ) -> HydroResult<Self> {
        if num_regions == 0 {
            return Err(HydroError::InvalidConfig(
                "At least one region is required".into(),
            ));
        }
        if num_regions > u16::MAX as usize {
            return Err(HydroError::InvalidConfig(format!(
                "Region count {} exceeds {}",
                num_regions,
                u16::MAX
            )));
        }

        let mut regions: Vec<Region> = (0..num_regions)
            .map(|r| Region {
                id: RegionId::from(r),
                elems: Vec::new(),
                cost,
            })
            .collect();

        for (elem, reg) in region_of.iter().enumerate() {
            let slot = regions.get_mut(reg.index()).ok_or_else(|| {
                HydroError::InvalidMesh(format!(
                    "Element {} assigned to region {} of {}",
                    elem, reg, num_regions
                ))
            })?;
            slot.elems.push(elem);
        }

        Ok(Self { regions, region_of })
    }

    /// Every element in region 0.
    pub fn single(num_elem: usize, cost: u32) -> Self {
        Self {
            regions: vec![Region {
                id: RegionId(0),
                elems: (0..num_elem).collect(),
                cost,
            }],
            region_of: vec![RegionId(0); num_elem],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    #[inline]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    #[inline]
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    #[inline]
    pub fn region_of(&self, elem: usize) -> RegionId {
        self.region_of[elem]
    }

    /// Checks that the regions partition `[0, num_elem)`: every element
    /// appears in exactly one list, and that list agrees with `region_of`.
    pub fn validate_partition(&self, num_elem: usize) -> HydroResult<()> {
        if self.region_of.len() != num_elem {
            return Err(HydroError::InvalidMesh(format!(
                "Region map covers {} elements, mesh has {}",
                self.region_of.len(),
                num_elem
            )));
        }

        let mut seen = vec![false; num_elem];
        for region in &self.regions {
            for &elem in &region.elems {
                if elem >= num_elem {
                    return Err(HydroError::InvalidMesh(format!(
                        "Region {} lists element {} (element count: {})",
                        region.id, elem, num_elem
                    )));
                }
                if seen[elem] {
                    return Err(HydroError::InvalidMesh(format!(
                        "Element {} appears in more than one region",
                        elem
                    )));
                }
                if self.region_of[elem] != region.id {
                    return Err(HydroError::InvalidMesh(format!(
                        "Element {} listed in region {} but mapped to region {}",
                        elem, region.id, self.region_of[elem]
                    )));
                }
                seen[elem] = true;
            }
        }

        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(HydroError::InvalidMesh(format!(
                "Element {} belongs to no region",
                missing
            )));
        }
        Ok(())
    }
}
