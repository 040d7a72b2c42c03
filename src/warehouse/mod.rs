//! Warehouse model and slot allocation
//!
//! # Architecture
//!
//! The warehouse is a fixed set of racks, each owning a contiguous range of
//! numbered positions crossed with a range of column letters:
//!
//! ```text
//! RackTopology (ordered racks, loaded once from config)
//!   └─→ Rack (RACK1: positions 1..29 × columns A..M)
//!        └─→ SlotId (column letter + position, e.g. E1)
//! ```
//!
//! ## Fill order
//!
//! Each rack is offered in two phases: outer columns (E..M) position by
//! position across the whole rack, then inner columns (D down to A) one
//! column at a time. Racks are exhausted in priority order.
//!
//! ## Allocation
//!
//! [`allocate_next`] is a pure function from (topology, occupancy snapshot,
//! active-slot filter) to the next free slot. All I/O happens in the caller
//! before a batch runs; the caller folds each assignment back into its
//! occupancy set, which is what keeps a batch collision-free. Concurrent
//! batches against the same persisted occupancy must be serialized by the
//! caller (single writer or a serializable transaction around
//! read-compute-commit).

pub mod allocator;
pub mod rack;
pub mod slot;
pub mod topology;

pub use allocator::{allocate_next, assign_batch, Assignment, OccupancySet, SlotFilter};
pub use rack::{Rack, RackConfig, DEFAULT_RACK_LABEL};
pub use slot::SlotId;
pub use topology::{Candidate, RackTopology};
