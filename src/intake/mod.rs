//! Production feed intake
//!
//! Parts reported by the external production-tracking feed arrive here as
//! plain [`FeedItem`]s. Intake drops parts the inventory already knows,
//! then runs one allocation batch over the survivors: the occupancy
//! snapshot is read once, and every suggested slot is folded back into it
//! before the next part is placed, so a single feed never suggests the
//! same slot twice.
//!
//! Reading the snapshot and computing suggestions are separate steps;
//! nothing is written here. Callers stage the suggestions they accept.

use crate::error::Result;
use crate::inventory::{Inventory, LayerCounts, PartDetails, StageItem};
use crate::warehouse::{allocate_next, Assignment, RackTopology, SlotId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One part reported by the production feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub op: String,
    pub part: String,
    pub project: String,
    pub vehicle: String,
    #[serde(default)]
    pub reported_at: Option<DateTime<Utc>>,
}

impl FeedItem {
    /// Part identity for this feed item; feed parts have no parent order
    pub fn details(&self) -> PartDetails {
        PartDetails {
            parent_op: "0".to_string(),
            op: self.op.clone(),
            part: self.part.clone(),
            project: self.project.clone(),
            vehicle: self.vehicle.clone(),
        }
    }
}

/// A feed item with its suggested storage slot
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub item: FeedItem,
    pub slot: SlotId,
    pub rack: String,
    /// True when the slot is the exhaustion fallback, not a fresh
    /// assignment
    pub exhausted: bool,
}

impl Suggestion {
    /// Turn an accepted suggestion into a staging request
    pub fn into_stage_item(self, layers: LayerCounts) -> StageItem {
        StageItem {
            details: self.item.details(),
            slot: self.slot,
            rack: self.rack,
            layers,
        }
    }
}

/// Outcome of one intake pass
#[derive(Debug, Clone, Serialize)]
pub struct IntakeReport {
    /// Suggestions in feed order
    pub suggestions: Vec<Suggestion>,
    /// Items dropped because the inventory already knows them
    pub skipped: usize,
}

impl IntakeReport {
    /// Whether any suggestion degraded to the exhaustion fallback.
    /// Surfaced to the operator as a rack-capacity alert.
    pub fn any_exhausted(&self) -> bool {
        self.suggestions.iter().any(|s| s.exhausted)
    }
}

/// Runs intake passes against one topology and one inventory
pub struct IntakeService<'a> {
    topology: &'a RackTopology,
    inventory: &'a Inventory,
}

impl<'a> IntakeService<'a> {
    pub fn new(topology: &'a RackTopology, inventory: &'a Inventory) -> Self {
        Self {
            topology,
            inventory,
        }
    }

    /// Process one feed batch into slot suggestions.
    ///
    /// Known parts (already staged or stored) are skipped. The remaining
    /// items are assigned slots in feed order with cumulative occupancy,
    /// starting from the persisted snapshot.
    pub async fn suggest(&self, feed: Vec<FeedItem>) -> Result<IntakeReport> {
        let known = self.inventory.known_part_keys().await?;
        let mut occupied = self.inventory.occupied_slots().await?;
        let filter = self.inventory.slot_filter().await?;

        let mut suggestions = Vec::new();
        let mut skipped = 0;

        for item in feed {
            if known.contains(&item.details().key()) {
                debug!(op = %item.op, part = %item.part, "feed item already known, skipped");
                skipped += 1;
                continue;
            }

            let assignment = allocate_next(self.topology, &occupied, &filter);
            occupied.insert(assignment.slot);
            suggestions.push(Suggestion {
                item,
                slot: assignment.slot,
                rack: assignment.rack_label,
                exhausted: assignment.exhausted,
            });
        }

        info!(
            suggested = suggestions.len(),
            skipped, "intake pass complete"
        );
        Ok(IntakeReport {
            suggestions,
            skipped,
        })
    }
}

/// Entry created by hand at the terminal, outside the feed.
///
/// Gets the default slot pair; the operator relocates it during staging if
/// needed.
pub fn manual_entry(op: &str, part: &str, project: &str, vehicle: &str) -> Suggestion {
    let fallback = Assignment::default_fallback();
    Suggestion {
        item: FeedItem {
            op: op.to_string(),
            part: part.to_string(),
            project: project.to_string(),
            vehicle: vehicle.to_string(),
            reported_at: None,
        },
        slot: fallback.slot,
        rack: fallback.rack_label,
        exhausted: false,
    }
}
