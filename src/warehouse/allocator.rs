//! Next-free-slot selection
//!
//! The allocator is a pure function over a topology, an occupancy snapshot
//! and an active-slot filter. It performs no I/O and keeps no state: batch
//! callers fold each returned slot into their occupancy set before asking
//! for the next one.

use crate::warehouse::rack::DEFAULT_RACK_LABEL;
use crate::warehouse::slot::SlotId;
use crate::warehouse::topology::RackTopology;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Slots considered taken for one allocation pass.
///
/// Seeded by the caller from persisted records (shelved and staged parts),
/// then grown with each assignment made during the same batch.
pub type OccupancySet = HashSet<SlotId>;

/// Restricts candidates to the slots currently active on the floor.
///
/// A slot can be deactivated without being removed from the topology; an
/// inactive slot is skipped entirely, not just deprioritized.
#[derive(Debug, Clone, Default)]
pub enum SlotFilter {
    /// Every topology slot is a candidate
    #[default]
    All,
    /// Only the listed slots are candidates
    Active(HashSet<SlotId>),
}

impl SlotFilter {
    /// Whether the given slot may receive parts
    pub fn admits(&self, slot: SlotId) -> bool {
        match self {
            SlotFilter::All => true,
            SlotFilter::Active(slots) => slots.contains(&slot),
        }
    }
}

impl FromIterator<SlotId> for SlotFilter {
    fn from_iter<I: IntoIterator<Item = SlotId>>(iter: I) -> Self {
        SlotFilter::Active(iter.into_iter().collect())
    }
}

/// Result of one allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Assigned slot
    pub slot: SlotId,
    /// Group label of the owning rack
    pub rack_label: String,
    /// True when no free active slot existed and the documented fallback
    /// pair was returned instead of a fresh assignment. Callers should
    /// surface this to an operator as a capacity alert; the slot value is
    /// a signal, not a usable new assignment.
    pub exhausted: bool,
}

impl Assignment {
    /// The hardcoded pair returned when the topology itself offers no
    /// candidates at all.
    pub fn default_fallback() -> Self {
        Self {
            slot: SlotId::new('E', 1),
            rack_label: DEFAULT_RACK_LABEL.to_string(),
            exhausted: true,
        }
    }
}

/// Select the next free slot.
///
/// Walks the topology's candidate order restricted to `filter`, returning
/// the first slot absent from `occupied` together with its rack's group
/// label. Deterministic: the same inputs always produce the same result.
///
/// Never fails. When every active candidate is occupied the head of the
/// (filtered) candidate order is returned with `exhausted` set; when the
/// filter admits nothing, the hardcoded default pair is returned. `occupied`
/// is not mutated; folding the result back in is the caller's step.
pub fn allocate_next(
    topology: &RackTopology,
    occupied: &OccupancySet,
    filter: &SlotFilter,
) -> Assignment {
    let mut head = None;
    for candidate in topology.candidate_order() {
        if !filter.admits(candidate.slot) {
            continue;
        }
        if head.is_none() {
            head = Some(candidate);
        }
        if !occupied.contains(&candidate.slot) {
            debug!(slot = %candidate.slot, rack = candidate.rack_name, "slot assigned");
            return Assignment {
                slot: candidate.slot,
                rack_label: candidate.label.to_string(),
                exhausted: false,
            };
        }
    }

    match head {
        Some(candidate) => {
            warn!(
                slot = %candidate.slot,
                "no free slot available, returning fallback"
            );
            Assignment {
                slot: candidate.slot,
                rack_label: candidate.label.to_string(),
                exhausted: true,
            }
        }
        None => {
            warn!("no active slots in topology, returning default fallback");
            Assignment::default_fallback()
        }
    }
}

/// Assign slots for `count` requests in one batch.
///
/// Calls [`allocate_next`] once per request in order, folding each returned
/// slot into `occupied` before the next call, so no two requests in the
/// batch receive the same slot while free slots remain.
pub fn assign_batch(
    topology: &RackTopology,
    occupied: &mut OccupancySet,
    filter: &SlotFilter,
    count: usize,
) -> Vec<Assignment> {
    let mut assignments = Vec::with_capacity(count);
    for _ in 0..count {
        let assignment = allocate_next(topology, occupied, filter);
        occupied.insert(assignment.slot);
        assignments.push(assignment);
    }
    assignments
}
