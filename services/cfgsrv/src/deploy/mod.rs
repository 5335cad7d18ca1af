//! Configuration deployment pipeline
//!
//! One deployment is a single sequential pass:
//! decode → snapshot → build reference index → normalize → report.
//!
//! The snapshot is written before normalization so the submitted text
//! survives a failed import. The whole delete/reinsert runs inside one
//! transaction; a mid-import failure rolls every entity table back and the
//! store keeps its previous contents.

pub mod decoder;
pub mod index;
pub mod normalizer;
pub mod snapshot;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::config::ImportSection;
use crate::error::{CfgSrvError, Result};

use self::index::ReferenceIndex;
use self::normalizer::EntityCounts;

/// Result of one deployment, in the wire shape callers confirm against
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReport {
    pub success: bool,
    pub io_ports: usize,
    pub devices: usize,
    pub tags: usize,
    pub calculation_tags: usize,
    pub stats_tags: usize,
    pub bridges: usize,
    pub blocks: usize,
    /// Non-fatal anomalies: unresolved references, duplicate tag keys,
    /// skipped malformed entries
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl DeployReport {
    fn new(counts: EntityCounts, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            io_ports: counts.io_ports,
            devices: counts.devices,
            tags: counts.tags,
            calculation_tags: counts.calculation_tags,
            stats_tags: counts.stats_tags,
            bridges: counts.bridges,
            blocks: counts.blocks,
            warnings,
        }
    }
}

/// Run one full deployment of the submitted document text
pub async fn run_deployment(
    pool: &SqlitePool,
    raw: &str,
    policy: &ImportSection,
) -> Result<DeployReport> {
    // Decode first: a rejected document must leave no trace, not even a
    // snapshot.
    let doc = decoder::decode(raw)?;

    snapshot::save(pool, raw).await?;

    let index = ReferenceIndex::build(&doc);
    let mut warnings: Vec<String> = index
        .duplicates()
        .iter()
        .map(|key| format!("duplicate tag key '{}': last definition wins", key))
        .collect();

    if policy.strict_duplicates && !index.duplicates().is_empty() {
        return Err(CfgSrvError::StrictMode(format!(
            "duplicate tag keys: {}",
            index.duplicates().join(", ")
        )));
    }

    let mut tx = pool.begin().await?;
    let (counts, normalize_warnings) = normalizer::normalize(&mut tx, &doc, &index, policy).await?;
    tx.commit().await?;

    warnings.extend(normalize_warnings.iter().map(ToString::to_string));
    for warning in &warnings {
        warn!("Deploy warning: {}", warning);
    }

    info!(
        "Deployed config: {} ports, {} devices, {} tags, {} calc tags, {} stats tags, {} bridges, {} blocks",
        counts.io_ports,
        counts.devices,
        counts.tags,
        counts.calculation_tags,
        counts.stats_tags,
        counts.bridges,
        counts.blocks
    );

    Ok(DeployReport::new(counts, warnings))
}
