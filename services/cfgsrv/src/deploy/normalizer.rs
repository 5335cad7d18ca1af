//! Entity normalizer
//!
//! Fans one decoded configuration document out into the seven entity
//! tables. Every import is a full replace: all seven tables are cleared in
//! fixed dependency order inside the caller's transaction, then repopulated
//! from the document. Malformed entries are skipped with a warning rather
//! than failing the import; genuine storage failures propagate and roll the
//! whole transaction back.

use fieldgate_config::document::{
    BlockConfig, BridgeConfig, CalculationTagConfig, DeviceConfig, IoTagConfig, PortConfig,
    StatsTagConfig,
};
use serde_json::Value as JsonValue;
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use super::index::{member_array, section_array, ReferenceIndex};
use crate::config::ImportSection;
use crate::error::{CfgSrvError, Result};

/// Per-entity insert counters for the deployment report
#[derive(Debug, Default, Clone, Copy)]
pub struct EntityCounts {
    pub io_ports: usize,
    pub devices: usize,
    pub tags: usize,
    pub calculation_tags: usize,
    pub stats_tags: usize,
    pub bridges: usize,
    pub blocks: usize,
}

/// A non-fatal anomaly encountered during normalization
#[derive(Debug, Clone)]
pub struct ImportWarning {
    /// Item that caused the warning
    pub item: String,
    /// What happened
    pub detail: String,
}

impl ImportWarning {
    fn new(item: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.item, self.detail)
    }
}

/// Replace the full contents of the entity tables from the document
pub async fn normalize(
    tx: &mut Transaction<'_, Sqlite>,
    doc: &JsonValue,
    index: &ReferenceIndex,
    policy: &ImportSection,
) -> Result<(EntityCounts, Vec<ImportWarning>)> {
    clear_tables(tx).await?;

    let mut counts = EntityCounts::default();
    let mut warnings = Vec::new();

    insert_io_hierarchy(tx, doc, &mut counts, &mut warnings).await?;
    insert_calculation_tags(tx, doc, index, policy, &mut counts, &mut warnings).await?;
    insert_stats_tags(tx, doc, index, policy, &mut counts, &mut warnings).await?;
    insert_bridges(tx, doc, &mut counts, &mut warnings).await?;

    Ok((counts, warnings))
}

/// Clear all entity tables, children before parents
async fn clear_tables(tx: &mut Transaction<'_, Sqlite>) -> Result<()> {
    for table in [
        "stats_tags",
        "calculation_tags",
        "io_tags",
        "devices",
        "io_ports",
        "bridge_blocks",
        "bridges",
    ] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

/// Insert ports, their devices, and their IO tags in hierarchy order
async fn insert_io_hierarchy(
    tx: &mut Transaction<'_, Sqlite>,
    doc: &JsonValue,
    counts: &mut EntityCounts,
    warnings: &mut Vec<ImportWarning>,
) -> Result<()> {
    for (port_idx, port_value) in section_array(doc, &["io_setup", "ioSetup"], "ports")
        .iter()
        .enumerate()
    {
        // Parse the port itself without its device subtree so one bad
        // device cannot take the whole port down.
        let port: PortConfig = match from_value_stripped(port_value, "devices") {
            Ok(port) => port,
            Err(e) => {
                warnings.push(ImportWarning::new(format!("port[{}]", port_idx), e));
                continue;
            },
        };
        if port.id.is_empty() {
            warnings.push(ImportWarning::new(
                format!("port[{}]", port_idx),
                "missing id, skipped",
            ));
            continue;
        }

        let serial_settings = port
            .serial_settings
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let inserted = sqlx::query(
            "INSERT INTO io_ports (id, type, name, description, scan_time, time_out, \
             retry_count, auto_recover_time, scan_mode, enabled, serial_settings)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&port.id)
        .bind(&port.port_type)
        .bind(&port.name)
        .bind(&port.description)
        .bind(port.scan_time)
        .bind(port.time_out)
        .bind(port.retry_count)
        .bind(port.auto_recover_time)
        .bind(&port.scan_mode)
        .bind(port.enabled)
        .bind(&serial_settings)
        .execute(&mut **tx)
        .await;

        if let Err(e) = inserted {
            warnings.push(ImportWarning::new(format!("port {}", port.id), e.to_string()));
            continue;
        }
        counts.io_ports += 1;

        for (device_idx, device_value) in member_array(port_value, "devices").iter().enumerate() {
            insert_device(tx, &port.id, device_idx, device_value, counts, warnings).await?;
        }
    }

    Ok(())
}

/// Insert one device and its IO tags
async fn insert_device(
    tx: &mut Transaction<'_, Sqlite>,
    port_id: &str,
    device_idx: usize,
    device_value: &JsonValue,
    counts: &mut EntityCounts,
    warnings: &mut Vec<ImportWarning>,
) -> Result<()> {
    let device: DeviceConfig = match from_value_stripped(device_value, "tags") {
        Ok(device) => device,
        Err(e) => {
            warnings.push(ImportWarning::new(
                format!("port {}/device[{}]", port_id, device_idx),
                e,
            ));
            return Ok(());
        },
    };
    if device.id.is_empty() {
        warnings.push(ImportWarning::new(
            format!("port {}/device[{}]", port_id, device_idx),
            "missing id, skipped",
        ));
        return Ok(());
    }

    let inserted = sqlx::query(
        "INSERT INTO devices (id, port_id, name, device_type, unit_number, tag_write_type, \
         description, add_device_name_as_prefix, use_ascii_protocol, packet_delay, \
         digital_block_size, analog_block_size, enabled)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&device.id)
    .bind(port_id)
    .bind(&device.name)
    .bind(&device.device_type)
    .bind(device.unit_number)
    .bind(&device.tag_write_type)
    .bind(&device.description)
    .bind(device.add_device_name_as_prefix)
    .bind(device.use_ascii_protocol)
    .bind(device.packet_delay)
    .bind(device.digital_block_size)
    .bind(device.analog_block_size)
    .bind(device.enabled)
    .execute(&mut **tx)
    .await;

    if let Err(e) = inserted {
        warnings.push(ImportWarning::new(
            format!("device {}", device.id),
            e.to_string(),
        ));
        return Ok(());
    }
    counts.devices += 1;

    for (tag_idx, tag_value) in member_array(device_value, "tags").iter().enumerate() {
        let tag: IoTagConfig = match serde_json::from_value(tag_value.clone()) {
            Ok(tag) => tag,
            Err(e) => {
                warnings.push(ImportWarning::new(
                    format!("device {}/tag[{}]", device.id, tag_idx),
                    e.to_string(),
                ));
                continue;
            },
        };
        if tag.id.is_empty() {
            warnings.push(ImportWarning::new(
                format!("device {}/tag[{}]", device.id, tag_idx),
                "missing id, skipped",
            ));
            continue;
        }

        let inserted = sqlx::query(
            "INSERT INTO io_tags (id, device_id, name, data_type, register_type, \
             conversion_type, address, start_bit, length_bit, span_low, span_high, \
             default_value, scan_rate, read_write, scale_type, formula, scale, offset, \
             clamp_to_low, clamp_to_high, clamp_to_zero, description)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&tag.id)
        .bind(&device.id)
        .bind(&tag.name)
        .bind(&tag.data_type)
        .bind(&tag.register_type)
        .bind(&tag.conversion_type)
        .bind(&tag.address)
        .bind(tag.start_bit)
        .bind(tag.length_bit)
        .bind(tag.span_low)
        .bind(tag.span_high)
        .bind(tag.default_value)
        .bind(tag.scan_rate)
        .bind(&tag.read_write)
        .bind(&tag.scale_type)
        .bind(&tag.formula)
        .bind(tag.scale)
        .bind(tag.offset)
        .bind(tag.clamp_to_low)
        .bind(tag.clamp_to_high)
        .bind(tag.clamp_to_zero)
        .bind(&tag.description)
        .execute(&mut **tx)
        .await;

        if let Err(e) = inserted {
            warnings.push(ImportWarning::new(format!("tag {}", tag.id), e.to_string()));
            continue;
        }
        counts.tags += 1;
    }

    Ok(())
}

/// Insert calculation tags, resolving operand slots a..h against the index
async fn insert_calculation_tags(
    tx: &mut Transaction<'_, Sqlite>,
    doc: &JsonValue,
    index: &ReferenceIndex,
    policy: &ImportSection,
    counts: &mut EntityCounts,
    warnings: &mut Vec<ImportWarning>,
) -> Result<()> {
    let tags = doc
        .get("calculation_tags")
        .or_else(|| doc.get("calculationTags"))
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    for (idx, tag_value) in tags.iter().enumerate() {
        let tag: CalculationTagConfig = match serde_json::from_value(tag_value.clone()) {
            Ok(tag) => tag,
            Err(e) => {
                warnings.push(ImportWarning::new(
                    format!("calculation_tag[{}]", idx),
                    e.to_string(),
                ));
                continue;
            },
        };
        if tag.id.is_empty() {
            warnings.push(ImportWarning::new(
                format!("calculation_tag[{}]", idx),
                "missing id, skipped",
            ));
            continue;
        }

        // Resolve the eight operand slots; an unresolvable reference keeps
        // the slot text but inserts a null tag id.
        let mut resolved: [Option<String>; 8] = Default::default();
        for (slot, operand) in tag.operands().into_iter().enumerate() {
            if let Some(reference) = operand {
                match index.resolve(reference) {
                    Some(tag_id) => resolved[slot] = Some(tag_id.to_string()),
                    None => {
                        let warning = ImportWarning::new(
                            format!("calculation_tag {}", tag.id),
                            format!(
                                "operand '{}' reference '{}' did not resolve",
                                char::from(b'a' + slot as u8),
                                reference
                            ),
                        );
                        if policy.strict_references {
                            return Err(CfgSrvError::StrictMode(warning.to_string()));
                        }
                        warnings.push(warning);
                    },
                }
            }
        }

        let operands = tag.operands();
        let inserted = sqlx::query(
            "INSERT INTO calculation_tags (id, name, default_value, formula, \
             a, b, c, d, e, f, g, h, \
             a_tag_id, b_tag_id, c_tag_id, d_tag_id, e_tag_id, f_tag_id, g_tag_id, h_tag_id, \
             period, read_write, span_low, span_high, is_parent, description)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&tag.id)
        .bind(&tag.name)
        .bind(tag.default_value)
        .bind(&tag.formula)
        .bind(operands[0].as_deref())
        .bind(operands[1].as_deref())
        .bind(operands[2].as_deref())
        .bind(operands[3].as_deref())
        .bind(operands[4].as_deref())
        .bind(operands[5].as_deref())
        .bind(operands[6].as_deref())
        .bind(operands[7].as_deref())
        .bind(&resolved[0])
        .bind(&resolved[1])
        .bind(&resolved[2])
        .bind(&resolved[3])
        .bind(&resolved[4])
        .bind(&resolved[5])
        .bind(&resolved[6])
        .bind(&resolved[7])
        .bind(tag.period)
        .bind(&tag.read_write)
        .bind(tag.span_low)
        .bind(tag.span_high)
        .bind(tag.is_parent)
        .bind(&tag.description)
        .execute(&mut **tx)
        .await;

        if let Err(e) = inserted {
            warnings.push(ImportWarning::new(
                format!("calculation_tag {}", tag.id),
                e.to_string(),
            ));
            continue;
        }
        counts.calculation_tags += 1;
    }

    Ok(())
}

/// Insert stats tags, resolving the referenced IO tag against the index
async fn insert_stats_tags(
    tx: &mut Transaction<'_, Sqlite>,
    doc: &JsonValue,
    index: &ReferenceIndex,
    policy: &ImportSection,
    counts: &mut EntityCounts,
    warnings: &mut Vec<ImportWarning>,
) -> Result<()> {
    let tags = doc
        .get("stats_tags")
        .or_else(|| doc.get("statsTags"))
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    for (idx, tag_value) in tags.iter().enumerate() {
        let tag: StatsTagConfig = match serde_json::from_value(tag_value.clone()) {
            Ok(tag) => tag,
            Err(e) => {
                warnings.push(ImportWarning::new(
                    format!("stats_tag[{}]", idx),
                    e.to_string(),
                ));
                continue;
            },
        };
        if tag.id.is_empty() {
            warnings.push(ImportWarning::new(
                format!("stats_tag[{}]", idx),
                "missing id, skipped",
            ));
            continue;
        }

        let refer_tag_id = match tag.refer_tag.as_deref() {
            Some(reference) => match index.resolve(reference) {
                Some(tag_id) => Some(tag_id.to_string()),
                None => {
                    let warning = ImportWarning::new(
                        format!("stats_tag {}", tag.id),
                        format!("reference '{}' did not resolve", reference),
                    );
                    if policy.strict_references {
                        return Err(CfgSrvError::StrictMode(warning.to_string()));
                    }
                    warnings.push(warning);
                    None
                },
            },
            None => None,
        };

        let inserted = sqlx::query(
            "INSERT INTO stats_tags (id, name, refer_tag, refer_tag_id, type, \
             update_cycle_value, update_cycle_unit, description)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&tag.id)
        .bind(&tag.name)
        .bind(&tag.refer_tag)
        .bind(&refer_tag_id)
        .bind(&tag.stats_type)
        .bind(tag.update_cycle_value)
        .bind(&tag.update_cycle_unit)
        .bind(&tag.description)
        .execute(&mut **tx)
        .await;

        if let Err(e) = inserted {
            warnings.push(ImportWarning::new(
                format!("stats_tag {}", tag.id),
                e.to_string(),
            ));
            continue;
        }
        counts.stats_tags += 1;
    }

    Ok(())
}

/// Insert communication bridges and their ordered blocks
///
/// A bridge or block without an id is skipped silently: not an error, not
/// counted. Sibling entries with ids are still inserted.
async fn insert_bridges(
    tx: &mut Transaction<'_, Sqlite>,
    doc: &JsonValue,
    counts: &mut EntityCounts,
    warnings: &mut Vec<ImportWarning>,
) -> Result<()> {
    for bridge_value in section_array(
        doc,
        &["communication_forward", "communicationForward"],
        "bridges",
    ) {
        let bridge: BridgeConfig = match from_value_stripped(bridge_value, "blocks") {
            Ok(bridge) => bridge,
            Err(e) => {
                warnings.push(ImportWarning::new("bridge", e));
                continue;
            },
        };
        let bridge_id = match bridge.id {
            Some(id) => id,
            None => {
                debug!("Bridge entry without id: skip");
                continue;
            },
        };

        let inserted = sqlx::query("INSERT INTO bridges (id) VALUES (?)")
            .bind(&bridge_id)
            .execute(&mut **tx)
            .await;

        if let Err(e) = inserted {
            warnings.push(ImportWarning::new(
                format!("bridge {}", bridge_id),
                e.to_string(),
            ));
            continue;
        }
        counts.bridges += 1;

        for (position, block_value) in member_array(bridge_value, "blocks").iter().enumerate() {
            let block: BlockConfig = match serde_json::from_value(block_value.clone()) {
                Ok(block) => block,
                Err(e) => {
                    warnings.push(ImportWarning::new(
                        format!("bridge {}/block[{}]", bridge_id, position),
                        e.to_string(),
                    ));
                    continue;
                },
            };
            let block_id = match block.id {
                Some(id) => id,
                None => {
                    debug!("Block entry without id in bridge {}: skip", bridge_id);
                    continue;
                },
            };

            let config_json = block
                .config
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;

            let inserted = sqlx::query(
                "INSERT INTO bridge_blocks (id, bridge_id, type, sub_type, label, \
                 config_json, sort_order)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&block_id)
            .bind(&bridge_id)
            .bind(&block.block_type)
            .bind(&block.sub_type)
            .bind(&block.label)
            .bind(&config_json)
            .bind(position as i64)
            .execute(&mut **tx)
            .await;

            if let Err(e) = inserted {
                warnings.push(ImportWarning::new(
                    format!("block {}", block_id),
                    e.to_string(),
                ));
                continue;
            }
            counts.blocks += 1;
        }
    }

    Ok(())
}

/// Deserialize an entity from a document value with one child array removed,
/// so child-level problems stay at the child level
fn from_value_stripped<T: serde::de::DeserializeOwned>(
    value: &JsonValue,
    child_key: &str,
) -> std::result::Result<T, String> {
    let mut stripped = value.clone();
    if let Some(obj) = stripped.as_object_mut() {
        obj.remove(child_key);
    }
    serde_json::from_value(stripped).map_err(|e| e.to_string())
}
