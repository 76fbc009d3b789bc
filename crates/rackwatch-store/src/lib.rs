//! rackwatch-store — inventory persistence for Rackwatch.
//!
//! The inventory lives in a hosted PostgREST-style table of server
//! records. This crate owns the row types, the `InventoryStore` trait
//! consumed by the sweep engine and the API, and two backends:
//!
//! - [`RestStore`] — the real client, speaking PostgREST filters
//!   (`id=eq.`, `id=in.(…)`) over reqwest with an `apikey` credential.
//! - [`MemoryStore`] — an in-process fake for tests and local runs,
//!   with failure injection and a write log for ordering assertions.
//!
//! The store client is injectable everywhere (`Arc<dyn InventoryStore>`)
//! rather than a process-global handle, so tests never touch the network.

pub mod config;
pub mod error;
pub mod memory;
pub mod rest;
pub mod store;
pub mod types;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use store::{InventoryStore, UpdateFields};
pub use types::*;
