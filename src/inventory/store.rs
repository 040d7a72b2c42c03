//! Inventory persistence seam
//!
//! [`InventoryStore`] is the narrow trait a backing store implements:
//! plain table operations on locations, staged parts, stored parts and the
//! two logs. The [`Inventory`] facade layers the lifecycle rules on top so
//! every store behaves identically.

use crate::error::{Error, Result};
use crate::inventory::locations::{active_filter, Location, LocationStatus};
use crate::inventory::{
    AuditEntry, ExitReason, ExitRecord, Layer, PartRecord, SlotSummary, StageItem,
};
use crate::warehouse::{OccupancySet, RackTopology, SlotFilter, SlotId};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

/// Table operations a backing store must provide
#[async_trait]
pub trait InventoryStore: Send + Sync {
    // Location registry
    async fn list_locations(&self) -> Result<Vec<Location>>;
    async fn add_location(&self, location: Location) -> Result<()>;
    async fn set_location_status(&self, slot: SlotId, status: LocationStatus) -> Result<()>;

    // Staged parts (slot reserved, not yet shelved)
    async fn insert_staged(&self, records: Vec<PartRecord>) -> Result<()>;
    async fn list_staged(&self) -> Result<Vec<PartRecord>>;

    /// Remove and return the staged records with the given ids.
    /// Unknown ids are skipped.
    async fn take_staged(&self, ids: &[Uuid]) -> Result<Vec<PartRecord>>;

    // Stored parts (on the shelf)
    async fn insert_stored(&self, records: Vec<PartRecord>) -> Result<()>;
    async fn list_stored(&self) -> Result<Vec<PartRecord>>;

    /// Remove and return the stored records with the given ids.
    /// Unknown ids are skipped.
    async fn take_stored(&self, ids: &[Uuid]) -> Result<Vec<PartRecord>>;

    // Exit log and operator action log
    async fn insert_exits(&self, records: Vec<ExitRecord>) -> Result<()>;
    async fn list_exits(&self) -> Result<Vec<ExitRecord>>;
    async fn record_action(&self, entry: AuditEntry) -> Result<()>;
    async fn recent_actions(&self, limit: usize) -> Result<Vec<AuditEntry>>;
}

/// Main inventory interface
pub struct Inventory {
    store: Box<dyn InventoryStore>,
}

impl std::fmt::Debug for Inventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inventory").finish()
    }
}

impl Inventory {
    pub fn new(store: Box<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Seed the location registry from a topology if it is empty.
    ///
    /// Returns the number of rows created (zero when the registry already
    /// has entries).
    pub async fn seed_locations(&self, topology: &RackTopology) -> Result<usize> {
        if !self.store.list_locations().await?.is_empty() {
            return Ok(0);
        }
        let rows = Location::seed_from(topology);
        let count = rows.len();
        for row in rows {
            self.store.add_location(row).await?;
        }
        info!(count, "location registry seeded from topology");
        Ok(count)
    }

    pub async fn locations(&self) -> Result<Vec<Location>> {
        self.store.list_locations().await
    }

    pub async fn add_location(&self, location: Location) -> Result<()> {
        info!(slot = %location.slot, name = %location.name, "location added");
        self.store.add_location(location).await
    }

    pub async fn set_location_status(&self, slot: SlotId, status: LocationStatus) -> Result<()> {
        info!(%slot, %status, "location status changed");
        self.store.set_location_status(slot, status).await
    }

    /// Allocator filter for the current registry state
    pub async fn slot_filter(&self) -> Result<SlotFilter> {
        Ok(active_filter(&self.store.list_locations().await?))
    }

    /// Slots currently reserved or occupied: the union of staged and
    /// stored assignments. This is the persisted half of an allocation
    /// batch's occupancy snapshot.
    pub async fn occupied_slots(&self) -> Result<OccupancySet> {
        let mut occupied: OccupancySet =
            self.store.list_staged().await?.iter().map(|r| r.slot).collect();
        occupied.extend(self.store.list_stored().await?.iter().map(|r| r.slot));
        Ok(occupied)
    }

    /// Dedup keys of every part already staged or stored
    pub async fn known_part_keys(&self) -> Result<HashSet<String>> {
        let mut keys: HashSet<String> = self
            .store
            .list_staged()
            .await?
            .iter()
            .map(|r| r.details.key())
            .collect();
        keys.extend(self.store.list_stored().await?.iter().map(|r| r.details.key()));
        Ok(keys)
    }

    /// Stage parts with their assigned slots.
    ///
    /// A part with layer quantities becomes one staged row per layer unit;
    /// a part without layer info becomes a single row. Returns the number
    /// of rows created.
    pub async fn stage(&self, items: Vec<StageItem>, user: &str) -> Result<usize> {
        let now = Utc::now();
        let records: Vec<PartRecord> = items
            .into_iter()
            .flat_map(|item| expand_stage_item(item, user, now))
            .collect();
        let count = records.len();
        debug!(rows = count, user, "staging parts");
        self.store.insert_staged(records).await?;
        Ok(count)
    }

    pub async fn staged(&self) -> Result<Vec<PartRecord>> {
        self.store.list_staged().await
    }

    pub async fn stored(&self) -> Result<Vec<PartRecord>> {
        self.store.list_stored().await
    }

    pub async fn exits(&self) -> Result<Vec<ExitRecord>> {
        self.store.list_exits().await
    }

    /// Move staged parts onto the shelf.
    ///
    /// The slot assigned at staging time travels with the part. Returns
    /// the number of parts moved.
    pub async fn commit_to_stock(&self, ids: &[Uuid], user: &str) -> Result<usize> {
        let parts = self.store.take_staged(ids).await?;
        let count = parts.len();
        let now = Utc::now();

        let records: Vec<PartRecord> = parts
            .into_iter()
            .map(|mut record| {
                record.recorded_by = user.to_string();
                record.recorded_at = now;
                record
            })
            .collect();
        self.store.insert_stored(records).await?;

        self.store
            .record_action(AuditEntry::new(
                user,
                "SEND_TO_STOCK",
                format!("moved {} part(s) to stock", count),
            ))
            .await?;
        info!(count, user, "staged parts committed to stock");
        Ok(count)
    }

    /// Discard staged parts before they reach the shelf.
    ///
    /// A reason is mandatory; it is preserved in the exit log.
    pub async fn discard_staged(&self, ids: &[Uuid], reason: &str, user: &str) -> Result<usize> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::InvalidArgument(
                "a discard reason is required".to_string(),
            ));
        }

        let parts = self.store.take_staged(ids).await?;
        let count = parts.len();
        let now = Utc::now();

        let exits = parts
            .into_iter()
            .map(|record| {
                exit_record(record, ExitReason::Discarded(reason.to_string()), user, now)
            })
            .collect();
        self.store.insert_exits(exits).await?;
        info!(count, user, reason, "staged parts discarded");
        Ok(count)
    }

    /// Remove parts from the shelf, freeing their slots
    pub async fn remove_from_stock(&self, ids: &[Uuid], user: &str) -> Result<usize> {
        let parts = self.store.take_stored(ids).await?;
        let count = parts.len();
        let now = Utc::now();

        let exits = parts
            .into_iter()
            .map(|record| exit_record(record, ExitReason::Shipped, user, now))
            .collect();
        self.store.insert_exits(exits).await?;
        info!(count, user, "parts removed from stock");
        Ok(count)
    }

    /// Part counts per occupied slot, in slot order
    pub async fn slot_counts(&self) -> Result<Vec<SlotSummary>> {
        let mut counts = std::collections::BTreeMap::new();
        for record in self.store.list_stored().await? {
            *counts.entry(record.slot).or_insert(0usize) += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(slot, total)| SlotSummary { slot, total })
            .collect())
    }

    /// Parts currently shelved at one slot
    pub async fn parts_at(&self, slot: SlotId) -> Result<Vec<PartRecord>> {
        Ok(self
            .store
            .list_stored()
            .await?
            .into_iter()
            .filter(|r| r.slot == slot)
            .collect())
    }

    pub async fn recent_actions(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        self.store.recent_actions(limit).await
    }
}

/// One staged row per layer unit, or a single layerless row
fn expand_stage_item(
    item: StageItem,
    user: &str,
    now: chrono::DateTime<Utc>,
) -> Vec<PartRecord> {
    let mut layers: Vec<Option<Layer>> = Vec::new();
    for _ in 0..item.layers.l1 {
        layers.push(Some(Layer::L1));
    }
    for _ in 0..item.layers.l3 {
        layers.push(Some(Layer::L3));
    }
    if layers.is_empty() {
        layers.push(None);
    }

    layers
        .into_iter()
        .map(|layer| PartRecord {
            id: Uuid::new_v4(),
            details: item.details.clone(),
            slot: item.slot,
            rack: item.rack.clone(),
            layer,
            recorded_by: user.to_string(),
            recorded_at: now,
        })
        .collect()
}

fn exit_record(
    record: PartRecord,
    reason: ExitReason,
    user: &str,
    now: chrono::DateTime<Utc>,
) -> ExitRecord {
    ExitRecord {
        id: record.id,
        details: record.details,
        slot: record.slot,
        rack: record.rack,
        reason,
        removed_by: user.to_string(),
        removed_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{LayerCounts, MemoryStore, PartDetails};

    fn details(op: &str, part: &str) -> PartDetails {
        PartDetails {
            parent_op: "0".to_string(),
            op: op.to_string(),
            part: part.to_string(),
            project: "P01".to_string(),
            vehicle: "V40".to_string(),
        }
    }

    fn item(op: &str, part: &str, slot: &str, layers: LayerCounts) -> StageItem {
        StageItem {
            details: details(op, part),
            slot: slot.parse().unwrap(),
            rack: "COLMEIA".to_string(),
            layers,
        }
    }

    fn inventory() -> Inventory {
        Inventory::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_layer_expansion() {
        let rows = expand_stage_item(
            item("1", "PU-1", "E1", LayerCounts { l1: 2, l3: 1 }),
            "ana",
            Utc::now(),
        );
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows.iter().filter(|r| r.layer == Some(Layer::L1)).count(),
            2
        );
        assert_eq!(
            rows.iter().filter(|r| r.layer == Some(Layer::L3)).count(),
            1
        );

        let rows = expand_stage_item(
            item("1", "PU-1", "E1", LayerCounts::default()),
            "ana",
            Utc::now(),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].layer, None);
    }

    #[tokio::test]
    async fn test_occupancy_is_union_of_staged_and_stored() {
        let inv = inventory();
        inv.stage(
            vec![item("1", "PU-1", "E1", LayerCounts::default())],
            "ana",
        )
        .await
        .unwrap();

        let staged = inv.staged().await.unwrap();
        inv.commit_to_stock(&[staged[0].id], "ana").await.unwrap();

        inv.stage(
            vec![item("2", "PU-2", "F1", LayerCounts::default())],
            "ana",
        )
        .await
        .unwrap();

        let occupied = inv.occupied_slots().await.unwrap();
        assert!(occupied.contains(&"E1".parse().unwrap()));
        assert!(occupied.contains(&"F1".parse().unwrap()));
        assert_eq!(occupied.len(), 2);
    }

    #[tokio::test]
    async fn test_commit_records_audit_entry() {
        let inv = inventory();
        inv.stage(
            vec![item("1", "PU-1", "E1", LayerCounts::default())],
            "ana",
        )
        .await
        .unwrap();
        let ids: Vec<Uuid> = inv.staged().await.unwrap().iter().map(|r| r.id).collect();

        inv.commit_to_stock(&ids, "ana").await.unwrap();

        let actions = inv.recent_actions(10).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, "SEND_TO_STOCK");
        assert_eq!(actions[0].user, "ana");
    }

    #[tokio::test]
    async fn test_discard_requires_reason() {
        let inv = inventory();
        let err = inv.discard_staged(&[], "  ", "ana").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_discard_moves_parts_to_exit_log() {
        let inv = inventory();
        inv.stage(
            vec![item("1", "PU-1", "E1", LayerCounts::default())],
            "ana",
        )
        .await
        .unwrap();
        let ids: Vec<Uuid> = inv.staged().await.unwrap().iter().map(|r| r.id).collect();

        let count = inv.discard_staged(&ids, "damaged edge", "ana").await.unwrap();
        assert_eq!(count, 1);
        assert!(inv.staged().await.unwrap().is_empty());

        let exits = inv.exits().await.unwrap();
        assert_eq!(exits.len(), 1);
        assert_eq!(
            exits[0].reason,
            ExitReason::Discarded("damaged edge".to_string())
        );
        // The discarded slot is free again
        assert!(inv.occupied_slots().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slot_counts_and_parts_at() {
        let inv = inventory();
        inv.stage(
            vec![
                item("1", "PU-1", "E1", LayerCounts { l1: 2, l3: 0 }),
                item("2", "PU-2", "F1", LayerCounts::default()),
            ],
            "ana",
        )
        .await
        .unwrap();
        let ids: Vec<Uuid> = inv.staged().await.unwrap().iter().map(|r| r.id).collect();
        inv.commit_to_stock(&ids, "ana").await.unwrap();

        let counts = inv.slot_counts().await.unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].slot.to_string(), "E1");
        assert_eq!(counts[0].total, 2);
        assert_eq!(counts[1].total, 1);

        let at_e1 = inv.parts_at("E1".parse().unwrap()).await.unwrap();
        assert_eq!(at_e1.len(), 2);
        assert!(at_e1.iter().all(|r| r.details.op == "1"));
    }
}
