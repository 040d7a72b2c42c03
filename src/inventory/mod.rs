//! Part inventory
//!
//! # Overview
//!
//! Parts move through three persisted states on their way through the
//! plant:
//!
//! ```text
//! staged (optimized, slot reserved)
//!   └─→ stored (physically on the shelf)
//!        └─→ exited (shipped out, terminal log)
//! ```
//!
//! A staged part already owns its slot: the union of staged and stored
//! slots is the persisted occupancy fed to the allocator, which is what
//! keeps a reserved-but-not-yet-shelved slot from being assigned twice.
//!
//! The [`InventoryStore`] trait is the persistence seam; [`MemoryStore`]
//! is the bundled implementation. The [`Inventory`] facade owns the
//! lifecycle rules (layer expansion, exit reasons, audit entries) so store
//! implementations stay plain table operations.

pub mod locations;
pub mod memory;
pub mod store;

pub use locations::{active_filter, Location, LocationStatus};
pub use memory::MemoryStore;
pub use store::{Inventory, InventoryStore};

use crate::warehouse::SlotId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of a manufactured part as reported by production
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDetails {
    /// Parent production order ("0" when the part has none)
    pub parent_op: String,
    /// Production order number
    pub op: String,
    /// Part number
    pub part: String,
    /// Project code
    pub project: String,
    /// Vehicle model
    pub vehicle: String,
}

impl PartDetails {
    /// Deduplication key: a production order produces one row per part
    /// number, so `(op, part)` identifies a part across feeds.
    pub fn key(&self) -> String {
        format!("{}_{}", self.op, self.part)
    }
}

/// Foam layer a part was cut from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    L1,
    L3,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::L1 => write!(f, "L1"),
            Layer::L3 => write!(f, "L3"),
        }
    }
}

/// A part bound to a slot, either staged or on the shelf
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: PartDetails,
    /// Assigned slot
    pub slot: SlotId,
    /// Group label of the slot's rack
    pub rack: String,
    /// Layer the part was cut from, when known
    pub layer: Option<Layer>,
    /// User who created this record
    pub recorded_by: String,
    pub recorded_at: DateTime<Utc>,
}

/// Why a part left the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// Normal removal from stock
    Shipped,
    /// Discarded while still staged, with the operator's reason
    Discarded(String),
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Shipped => write!(f, "shipped"),
            ExitReason::Discarded(reason) => write!(f, "discarded: {}", reason),
        }
    }
}

/// Terminal log entry for a part that left the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: PartDetails,
    pub slot: SlotId,
    pub rack: String,
    pub reason: ExitReason,
    pub removed_by: String,
    pub removed_at: DateTime<Utc>,
}

/// One entry of the operator action log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub user: String,
    pub action: String,
    pub details: String,
    pub at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(user: &str, action: &str, details: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: user.to_string(),
            action: action.to_string(),
            details,
            at: Utc::now(),
        }
    }
}

/// Quantities of a part per cut layer, from the cut-file metadata
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerCounts {
    pub l1: u32,
    pub l3: u32,
}

impl LayerCounts {
    pub fn is_empty(&self) -> bool {
        self.l1 == 0 && self.l3 == 0
    }
}

/// A part selected for staging, with its suggested slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageItem {
    #[serde(flatten)]
    pub details: PartDetails,
    pub slot: SlotId,
    pub rack: String,
    /// One staged row is created per layer unit; no layer info creates a
    /// single row without a layer.
    #[serde(default)]
    pub layers: LayerCounts,
}

/// Number of parts shelved at one slot
#[derive(Debug, Clone, Serialize)]
pub struct SlotSummary {
    pub slot: SlotId,
    pub total: usize,
}
