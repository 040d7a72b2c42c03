// Colmeia - Warehouse slot allocation and part inventory engine
// Tracks manufactured parts from production intake to rack storage to exit

#![warn(rust_2018_idioms)]

pub mod config;
pub mod intake;
pub mod inventory;
pub mod warehouse;

// Re-exports for convenience
pub use config::EngineConfig;
pub use intake::{FeedItem, IntakeService};
pub use inventory::{Inventory, InventoryStore, MemoryStore};
pub use warehouse::{
    allocate_next, Assignment, OccupancySet, RackConfig, RackTopology, SlotFilter, SlotId,
};

/// Colmeia error types
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Configuration error: {0}")]
        Config(String),

        #[error("Store error: {0}")]
        Store(String),

        #[error("Not found: {0}")]
        NotFound(String),

        #[error("Already exists: {0}")]
        AlreadyExists(String),

        #[error("Invalid argument: {0}")]
        InvalidArgument(String),
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
