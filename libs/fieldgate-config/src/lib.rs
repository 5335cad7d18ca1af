//! Configuration-document model for the fieldgate gateway
//!
//! This crate owns the typed shape of one gateway configuration document:
//! the IO hierarchy (ports, devices, IO tags), the derived tag kinds
//! (calculation tags, stats tags), and the communication-forward bridges.
//! It also carries the SQLite DDL for the entity tables the deployment
//! pipeline normalizes into, and the typed `ConfigStore` used by document
//! producers.

pub mod document;
pub mod schema;
pub mod serde_defaults;
pub mod store;

pub use document::{
    BlockConfig, BridgeConfig, CalculationTagConfig, CommunicationForward, ConfigDocument,
    DeviceConfig, IoSetup, IoTagConfig, PortConfig, StatsTagConfig,
};
pub use store::ConfigStore;
