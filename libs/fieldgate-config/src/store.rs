//! Typed configuration state container
//!
//! Document producers (an editor UI, a provisioning script) work against a
//! `ConfigStore` with named section updaters instead of mutating a shared
//! object by key path. The deployment service only ever sees the serialized
//! text this store produces.

use crate::document::{
    BridgeConfig, CalculationTagConfig, ConfigDocument, IoSetup, PortConfig, StatsTagConfig,
};

/// Typed holder for one in-progress configuration document
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    document: ConfigDocument,
}

impl ConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from an existing document
    pub fn from_document(document: ConfigDocument) -> Self {
        Self { document }
    }

    /// Load a store from serialized YAML or JSON text
    pub fn load(text: &str) -> Result<Self, serde_yaml::Error> {
        let document = serde_yaml::from_str(text)?;
        Ok(Self { document })
    }

    /// Borrow the current document
    pub fn get(&self) -> &ConfigDocument {
        &self.document
    }

    /// Replace the IO hierarchy wholesale
    pub fn set_io_setup(&mut self, io_setup: IoSetup) {
        self.document.io_setup = io_setup;
    }

    /// Append one port to the IO hierarchy
    pub fn add_port(&mut self, port: PortConfig) {
        self.document.io_setup.ports.push(port);
    }

    /// Replace the calculation tag list
    pub fn set_calculation_tags(&mut self, tags: Vec<CalculationTagConfig>) {
        self.document.calculation_tags = tags;
    }

    /// Replace the stats tag list
    pub fn set_stats_tags(&mut self, tags: Vec<StatsTagConfig>) {
        self.document.stats_tags = tags;
    }

    /// Replace the communication-forward bridge list
    pub fn set_bridges(&mut self, bridges: Vec<BridgeConfig>) {
        self.document.communication_forward.bridges = bridges;
    }

    /// Reset to an empty document
    pub fn reset(&mut self) {
        self.document = ConfigDocument::default();
    }

    /// Serialize the document to YAML text for deployment
    pub fn serialize(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.document)
    }
}
