//! Location registry
//!
//! Every physical slot has a registry row carrying its display name and an
//! active flag. Deactivating a location takes it out of allocation without
//! touching the topology, so a blocked or damaged slot keeps its identity
//! and its history.

use crate::warehouse::{RackTopology, SlotFilter, SlotId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a location may receive parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationStatus {
    Active,
    Inactive,
}

impl fmt::Display for LocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationStatus::Active => write!(f, "active"),
            LocationStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Registry row for one physical slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub slot: SlotId,
    /// Group label of the owning rack
    pub rack: String,
    /// Display name shown on listings and labels
    pub name: String,
    pub status: LocationStatus,
}

impl Location {
    /// Registry rows for every slot of a topology, all starting active,
    /// named after their rack's group label.
    pub fn seed_from(topology: &RackTopology) -> Vec<Location> {
        topology
            .candidate_order()
            .map(|candidate| Location {
                slot: candidate.slot,
                rack: candidate.label.to_string(),
                name: candidate.label.to_string(),
                status: LocationStatus::Active,
            })
            .collect()
    }
}

/// Build the allocator filter from registry rows.
///
/// An empty registry means the registry is not in use and every topology
/// slot stays eligible; otherwise only rows marked active are candidates.
pub fn active_filter(locations: &[Location]) -> SlotFilter {
    if locations.is_empty() {
        return SlotFilter::All;
    }
    locations
        .iter()
        .filter(|l| l.status == LocationStatus::Active)
        .map(|l| l.slot)
        .collect()
}
