//! Warehouse topology: the ordered universe of candidate slots

use crate::error::{Error, Result};
use crate::warehouse::rack::{Rack, RackConfig};
use crate::warehouse::slot::SlotId;

/// A candidate slot together with its owning rack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub slot: SlotId,
    /// Rack name (`RACK1`, ...)
    pub rack_name: &'a str,
    /// Group label stamped on assignments
    pub label: &'a str,
}

/// The complete, ordered set of racks available for storage
///
/// Racks are loaded once from configuration and never change afterwards.
/// Rack priority is their order of appearance: every slot of the first
/// rack is offered before any slot of the second.
#[derive(Debug, Clone)]
pub struct RackTopology {
    racks: Vec<Rack>,
}

impl RackTopology {
    /// Build a topology from rack configuration entries.
    ///
    /// Rejects duplicate rack names and overlapping position ranges, since
    /// either would make slot identifiers ambiguous. An empty rack list is
    /// accepted and yields an empty candidate order.
    pub fn new(configs: Vec<RackConfig>) -> Result<Self> {
        let mut racks = Vec::with_capacity(configs.len());
        for config in configs {
            racks.push(Rack::from_config(config)?);
        }

        for (i, a) in racks.iter().enumerate() {
            for b in racks.iter().skip(i + 1) {
                if a.name() == b.name() {
                    return Err(Error::Config(format!(
                        "duplicate rack name '{}'",
                        a.name()
                    )));
                }
                let (pa, pb) = (a.positions(), b.positions());
                if pa.start < pb.end && pb.start < pa.end {
                    return Err(Error::Config(format!(
                        "racks '{}' and '{}' have overlapping position ranges",
                        a.name(),
                        b.name()
                    )));
                }
            }
        }

        Ok(Self { racks })
    }

    /// Topology with the plant's standard three-rack layout
    pub fn standard() -> Self {
        // The standard layout is statically valid
        Self::new(RackConfig::standard_layout()).expect("standard layout is valid")
    }

    /// Configured racks, in priority order
    pub fn racks(&self) -> &[Rack] {
        &self.racks
    }

    /// Total number of slots across all racks
    pub fn slot_count(&self) -> usize {
        self.racks.iter().map(|r| r.slot_count()).sum()
    }

    /// Whether any rack owns the given slot
    pub fn contains(&self, slot: SlotId) -> bool {
        self.racks.iter().any(|r| r.contains(slot))
    }

    /// The rack owning a slot, if any
    pub fn rack_of(&self, slot: SlotId) -> Option<&Rack> {
        self.racks.iter().find(|r| r.contains(slot))
    }

    /// Walk every slot of every rack in fill order.
    ///
    /// The sequence is lazy, finite and restartable: two walks over the
    /// same topology yield identical sequences.
    pub fn candidate_order(&self) -> impl Iterator<Item = Candidate<'_>> + '_ {
        self.racks.iter().flat_map(|rack| {
            rack.fill_order().map(move |slot| Candidate {
                slot,
                rack_name: rack.name(),
                label: rack.label(),
            })
        })
    }

    /// Head of the candidate order, if the topology is non-empty
    pub fn first_candidate(&self) -> Option<Candidate<'_>> {
        self.candidate_order().next()
    }
}

impl Default for RackTopology {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::rack::DEFAULT_RACK_LABEL;

    fn config(name: &str, first: u32, end: u32) -> RackConfig {
        RackConfig {
            name: name.to_string(),
            label: DEFAULT_RACK_LABEL.to_string(),
            first_position: first,
            end_position: end,
            first_column: 'A',
            last_column: 'M',
        }
    }

    #[test]
    fn test_standard_topology_order() {
        let topology = RackTopology::standard();
        assert_eq!(topology.slot_count(), 81 * 13);

        let first = topology.first_candidate().unwrap();
        assert_eq!(first.slot.to_string(), "E1");
        assert_eq!(first.rack_name, "RACK1");
        assert_eq!(first.label, DEFAULT_RACK_LABEL);

        // RACK1 is exhausted before RACK2 begins
        let order: Vec<_> = topology.candidate_order().collect();
        let rack1_slots = 28 * 13;
        assert!(order[..rack1_slots].iter().all(|c| c.rack_name == "RACK1"));
        assert_eq!(order[rack1_slots].rack_name, "RACK2");
        assert_eq!(order[rack1_slots].slot.to_string(), "E29");
    }

    #[test]
    fn test_candidate_order_is_restartable() {
        let topology = RackTopology::standard();
        let a: Vec<_> = topology.candidate_order().map(|c| c.slot).collect();
        let b: Vec<_> = topology.candidate_order().map(|c| c.slot).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_candidate_order_has_no_duplicates() {
        let topology = RackTopology::standard();
        let mut seen = std::collections::HashSet::new();
        for candidate in topology.candidate_order() {
            assert!(seen.insert(candidate.slot), "duplicate {}", candidate.slot);
        }
        assert_eq!(seen.len(), topology.slot_count());
    }

    #[test]
    fn test_empty_topology() {
        let topology = RackTopology::new(Vec::new()).unwrap();
        assert_eq!(topology.slot_count(), 0);
        assert!(topology.first_candidate().is_none());
    }

    #[test]
    fn test_duplicate_rack_names_rejected() {
        let result = RackTopology::new(vec![config("RACK1", 1, 10), config("RACK1", 10, 20)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overlapping_position_ranges_rejected() {
        let result = RackTopology::new(vec![config("RACK1", 1, 30), config("RACK2", 29, 57)]);
        assert!(result.is_err());

        // Touching half-open ranges are fine
        let result = RackTopology::new(vec![config("RACK1", 1, 29), config("RACK2", 29, 57)]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_rack_of() {
        let topology = RackTopology::standard();
        assert_eq!(
            topology.rack_of(SlotId::new('E', 30)).unwrap().name(),
            "RACK2"
        );
        assert!(topology.rack_of(SlotId::new('E', 82)).is_none());
    }
}
