//! In-memory inventory store
//!
//! Backs tests, demos and single-node deployments where durability is
//! handled upstream. Keyed tables live in [`DashMap`]s; the append-only
//! logs behind [`parking_lot::Mutex`].

use crate::error::{Error, Result};
use crate::inventory::locations::{Location, LocationStatus};
use crate::inventory::store::InventoryStore;
use crate::inventory::{AuditEntry, ExitRecord, PartRecord};
use crate::warehouse::SlotId;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

/// In-memory [`InventoryStore`] implementation
#[derive(Default)]
pub struct MemoryStore {
    locations: DashMap<SlotId, Location>,
    staged: DashMap<Uuid, PartRecord>,
    stored: DashMap<Uuid, PartRecord>,
    exits: Mutex<Vec<ExitRecord>>,
    actions: Mutex<Vec<AuditEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
            && self.staged.is_empty()
            && self.stored.is_empty()
            && self.exits.lock().is_empty()
    }
}

/// Newest first, ids as the tie-breaker so listings are stable
fn sorted_records(map: &DashMap<Uuid, PartRecord>) -> Vec<PartRecord> {
    let mut records: Vec<PartRecord> = map.iter().map(|r| r.value().clone()).collect();
    records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
    records
}

fn take_records(map: &DashMap<Uuid, PartRecord>, ids: &[Uuid]) -> Vec<PartRecord> {
    ids.iter()
        .filter_map(|id| map.remove(id).map(|(_, record)| record))
        .collect()
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn list_locations(&self) -> Result<Vec<Location>> {
        let mut rows: Vec<Location> = self.locations.iter().map(|r| r.value().clone()).collect();
        rows.sort_by_key(|l| l.slot);
        Ok(rows)
    }

    async fn add_location(&self, location: Location) -> Result<()> {
        match self.locations.entry(location.slot) {
            Entry::Occupied(_) => Err(Error::AlreadyExists(format!(
                "location {}",
                location.slot
            ))),
            Entry::Vacant(entry) => {
                entry.insert(location);
                Ok(())
            }
        }
    }

    async fn set_location_status(&self, slot: SlotId, status: LocationStatus) -> Result<()> {
        match self.locations.get_mut(&slot) {
            Some(mut row) => {
                row.status = status;
                Ok(())
            }
            None => Err(Error::NotFound(format!("location {}", slot))),
        }
    }

    async fn insert_staged(&self, records: Vec<PartRecord>) -> Result<()> {
        for record in records {
            self.staged.insert(record.id, record);
        }
        Ok(())
    }

    async fn list_staged(&self) -> Result<Vec<PartRecord>> {
        Ok(sorted_records(&self.staged))
    }

    async fn take_staged(&self, ids: &[Uuid]) -> Result<Vec<PartRecord>> {
        Ok(take_records(&self.staged, ids))
    }

    async fn insert_stored(&self, records: Vec<PartRecord>) -> Result<()> {
        for record in records {
            self.stored.insert(record.id, record);
        }
        Ok(())
    }

    async fn list_stored(&self) -> Result<Vec<PartRecord>> {
        Ok(sorted_records(&self.stored))
    }

    async fn take_stored(&self, ids: &[Uuid]) -> Result<Vec<PartRecord>> {
        Ok(take_records(&self.stored, ids))
    }

    async fn insert_exits(&self, records: Vec<ExitRecord>) -> Result<()> {
        self.exits.lock().extend(records);
        Ok(())
    }

    async fn list_exits(&self) -> Result<Vec<ExitRecord>> {
        Ok(self.exits.lock().clone())
    }

    async fn record_action(&self, entry: AuditEntry) -> Result<()> {
        self.actions.lock().push(entry);
        Ok(())
    }

    async fn recent_actions(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        let actions = self.actions.lock();
        Ok(actions.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::PartDetails;
    use chrono::Utc;

    fn record(op: &str, slot: &str) -> PartRecord {
        PartRecord {
            id: Uuid::new_v4(),
            details: PartDetails {
                parent_op: "0".to_string(),
                op: op.to_string(),
                part: format!("PU-{}", op),
                project: "P01".to_string(),
                vehicle: "V40".to_string(),
            },
            slot: slot.parse().unwrap(),
            rack: "COLMEIA".to_string(),
            layer: None,
            recorded_by: "ana".to_string(),
            recorded_at: Utc::now(),
        }
    }

    fn location(slot: &str) -> Location {
        Location {
            slot: slot.parse().unwrap(),
            rack: "COLMEIA".to_string(),
            name: "COLMEIA".to_string(),
            status: LocationStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_duplicate_location_rejected() {
        let store = MemoryStore::new();
        store.add_location(location("E1")).await.unwrap();
        let err = store.add_location(location("E1")).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_set_status_unknown_location() {
        let store = MemoryStore::new();
        let err = store
            .set_location_status("E1".parse().unwrap(), LocationStatus::Inactive)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_take_skips_unknown_ids() {
        let store = MemoryStore::new();
        let a = record("1", "E1");
        let a_id = a.id;
        store.insert_staged(vec![a]).await.unwrap();

        let taken = store.take_staged(&[a_id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(taken.len(), 1);
        assert!(store.list_staged().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_locations_listed_in_slot_order() {
        let store = MemoryStore::new();
        store.add_location(location("F2")).await.unwrap();
        store.add_location(location("E1")).await.unwrap();
        store.add_location(location("E2")).await.unwrap();

        let rows = store.list_locations().await.unwrap();
        let slots: Vec<String> = rows.iter().map(|l| l.slot.to_string()).collect();
        assert_eq!(slots, vec!["E1", "E2", "F2"]);
    }

    #[tokio::test]
    async fn test_recent_actions_newest_first() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .record_action(AuditEntry::new("ana", "ACTION", format!("step {}", i)))
                .await
                .unwrap();
        }

        let recent = store.recent_actions(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].details, "step 4");
        assert_eq!(recent[1].details, "step 3");
    }
}
