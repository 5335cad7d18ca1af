//! Typed configuration-document aggregate
//!
//! One `ConfigDocument` is the complete gateway configuration as produced by
//! an editor UI and consumed by the deployment pipeline. Section keys are
//! snake_case (`io_setup.ports`); camelCase aliases are accepted so
//! documents serialized by a JavaScript front end decode to the same shape.
//!
//! Defaulting policy: `enabled`-style flags default to true, numeric
//! timing/scan fields default to 0, free-text fields default to the empty
//! string, opaque blobs to null.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::serde_defaults::{
    bool_true, deserialize_bool_flexible, deserialize_enabled, deserialize_f64_flexible,
    deserialize_i64_flexible, deserialize_id, deserialize_opt_id, deserialize_scale,
    deserialize_text, scale_one,
};

/// Complete gateway configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// IO hierarchy: ports, devices, IO tags
    #[serde(default, alias = "ioSetup")]
    pub io_setup: IoSetup,

    /// Calculation tags (derived values over IO tags)
    #[serde(default, alias = "calculationTags")]
    pub calculation_tags: Vec<CalculationTagConfig>,

    /// Stats tags (rolling statistics over one IO tag)
    #[serde(default, alias = "statsTags")]
    pub stats_tags: Vec<StatsTagConfig>,

    /// Communication-forward bridges
    #[serde(default, alias = "communicationForward")]
    pub communication_forward: CommunicationForward,
}

/// IO hierarchy root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IoSetup {
    /// Physical/logical ports owning the device tree
    #[serde(default)]
    pub ports: Vec<PortConfig>,
}

/// One IO port (serial line, TCP endpoint, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConfig {
    /// Port id (stable across imports)
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    /// Port kind (e.g. serial, tcpip)
    #[serde(rename = "type", default, deserialize_with = "deserialize_text")]
    pub port_type: String,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: String,

    /// Scan interval in milliseconds
    #[serde(
        default,
        alias = "scanTime",
        deserialize_with = "deserialize_i64_flexible"
    )]
    pub scan_time: i64,

    /// Response timeout in milliseconds
    #[serde(
        default,
        alias = "timeOut",
        deserialize_with = "deserialize_i64_flexible"
    )]
    pub time_out: i64,

    #[serde(
        default,
        alias = "retryCount",
        deserialize_with = "deserialize_i64_flexible"
    )]
    pub retry_count: i64,

    /// Seconds before a failed port is scanned again
    #[serde(
        default,
        alias = "autoRecoverTime",
        deserialize_with = "deserialize_i64_flexible"
    )]
    pub auto_recover_time: i64,

    #[serde(
        default,
        alias = "scanMode",
        deserialize_with = "deserialize_text"
    )]
    pub scan_mode: String,

    #[serde(default = "bool_true", deserialize_with = "deserialize_enabled")]
    pub enabled: bool,

    /// Serial line settings, kept opaque (baud rate, parity, ...)
    #[serde(default, alias = "serialSettings")]
    pub serial_settings: Option<JsonValue>,

    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            port_type: String::new(),
            name: String::new(),
            description: String::new(),
            scan_time: 0,
            time_out: 0,
            retry_count: 0,
            auto_recover_time: 0,
            scan_mode: String::new(),
            enabled: true,
            serial_settings: None,
            devices: Vec::new(),
        }
    }
}

/// One device under a port
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,

    #[serde(
        default,
        alias = "deviceType",
        deserialize_with = "deserialize_text"
    )]
    pub device_type: String,

    /// Protocol unit/slave number
    #[serde(
        default,
        alias = "unitNumber",
        deserialize_with = "deserialize_i64_flexible"
    )]
    pub unit_number: i64,

    #[serde(
        default,
        alias = "tagWriteType",
        deserialize_with = "deserialize_text"
    )]
    pub tag_write_type: String,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: String,

    /// Prefix exported tag names with the device name
    #[serde(
        default,
        alias = "addDeviceNameAsPrefix",
        deserialize_with = "deserialize_bool_flexible"
    )]
    pub add_device_name_as_prefix: bool,

    // Protocol framing hints
    #[serde(
        default,
        alias = "useAsciiProtocol",
        deserialize_with = "deserialize_bool_flexible"
    )]
    pub use_ascii_protocol: bool,

    #[serde(
        default,
        alias = "packetDelay",
        deserialize_with = "deserialize_i64_flexible"
    )]
    pub packet_delay: i64,

    #[serde(
        default,
        alias = "digitalBlockSize",
        deserialize_with = "deserialize_i64_flexible"
    )]
    pub digital_block_size: i64,

    #[serde(
        default,
        alias = "analogBlockSize",
        deserialize_with = "deserialize_i64_flexible"
    )]
    pub analog_block_size: i64,

    #[serde(default = "bool_true", deserialize_with = "deserialize_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub tags: Vec<IoTagConfig>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            device_type: String::new(),
            unit_number: 0,
            tag_write_type: String::new(),
            description: String::new(),
            add_device_name_as_prefix: false,
            use_ascii_protocol: false,
            packet_delay: 0,
            digital_block_size: 0,
            analog_block_size: 0,
            enabled: true,
            tags: Vec::new(),
        }
    }
}

/// One IO tag (a polled data point on a device)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoTagConfig {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,

    #[serde(
        default,
        alias = "dataType",
        deserialize_with = "deserialize_text"
    )]
    pub data_type: String,

    #[serde(
        default,
        alias = "registerType",
        deserialize_with = "deserialize_text"
    )]
    pub register_type: String,

    #[serde(
        default,
        alias = "conversionType",
        deserialize_with = "deserialize_text"
    )]
    pub conversion_type: String,

    /// Register address; producers emit numbers or strings
    #[serde(default, deserialize_with = "deserialize_text")]
    pub address: String,

    #[serde(
        default,
        alias = "startBit",
        deserialize_with = "deserialize_i64_flexible"
    )]
    pub start_bit: i64,

    #[serde(
        default,
        alias = "lengthBit",
        deserialize_with = "deserialize_i64_flexible"
    )]
    pub length_bit: i64,

    #[serde(
        default,
        alias = "spanLow",
        deserialize_with = "deserialize_f64_flexible"
    )]
    pub span_low: f64,

    #[serde(
        default,
        alias = "spanHigh",
        deserialize_with = "deserialize_f64_flexible"
    )]
    pub span_high: f64,

    #[serde(
        default,
        alias = "defaultValue",
        deserialize_with = "deserialize_f64_flexible"
    )]
    pub default_value: f64,

    #[serde(
        default,
        alias = "scanRate",
        deserialize_with = "deserialize_i64_flexible"
    )]
    pub scan_rate: i64,

    #[serde(
        default,
        alias = "readWrite",
        deserialize_with = "deserialize_text"
    )]
    pub read_write: String,

    // Scaling
    #[serde(
        default,
        alias = "scaleType",
        deserialize_with = "deserialize_text"
    )]
    pub scale_type: String,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub formula: String,

    #[serde(default = "scale_one", deserialize_with = "deserialize_scale")]
    pub scale: f64,

    #[serde(default, deserialize_with = "deserialize_f64_flexible")]
    pub offset: f64,

    #[serde(
        default,
        alias = "clampToLow",
        deserialize_with = "deserialize_bool_flexible"
    )]
    pub clamp_to_low: bool,

    #[serde(
        default,
        alias = "clampToHigh",
        deserialize_with = "deserialize_bool_flexible"
    )]
    pub clamp_to_high: bool,

    #[serde(
        default,
        alias = "clampToZero",
        deserialize_with = "deserialize_bool_flexible"
    )]
    pub clamp_to_zero: bool,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: String,
}

impl Default for IoTagConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            data_type: String::new(),
            register_type: String::new(),
            conversion_type: String::new(),
            address: String::new(),
            start_bit: 0,
            length_bit: 0,
            span_low: 0.0,
            span_high: 0.0,
            default_value: 0.0,
            scan_rate: 0,
            read_write: String::new(),
            scale_type: String::new(),
            formula: String::new(),
            scale: 1.0,
            offset: 0.0,
            clamp_to_low: false,
            clamp_to_high: false,
            clamp_to_zero: false,
            description: String::new(),
        }
    }
}

/// Calculation tag: a formula over up to eight named operands
///
/// Operand slots a..h hold free-text `device:tag` references which the
/// deployment pipeline resolves to IO tag ids via the reference index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationTagConfig {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,

    #[serde(
        default,
        alias = "defaultValue",
        deserialize_with = "deserialize_f64_flexible"
    )]
    pub default_value: f64,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub formula: String,

    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub a: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub b: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub c: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub d: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub e: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub f: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub g: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub h: Option<String>,

    /// Evaluation period in seconds
    #[serde(default, deserialize_with = "deserialize_i64_flexible")]
    pub period: i64,

    #[serde(
        default,
        alias = "readWrite",
        deserialize_with = "deserialize_text"
    )]
    pub read_write: String,

    #[serde(
        default,
        alias = "spanLow",
        deserialize_with = "deserialize_f64_flexible"
    )]
    pub span_low: f64,

    #[serde(
        default,
        alias = "spanHigh",
        deserialize_with = "deserialize_f64_flexible"
    )]
    pub span_high: f64,

    #[serde(
        default,
        alias = "isParent",
        deserialize_with = "deserialize_bool_flexible"
    )]
    pub is_parent: bool,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: String,
}

impl CalculationTagConfig {
    /// Operand slots in declaration order
    pub fn operands(&self) -> [&Option<String>; 8] {
        [
            &self.a, &self.b, &self.c, &self.d, &self.e, &self.f, &self.g, &self.h,
        ]
    }
}

/// Stats tag: a rolling statistic over one referenced IO tag
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsTagConfig {
    /// Id, string-coerced (producers emit numbers)
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,

    /// `device:tag` reference to the source IO tag
    #[serde(
        default,
        alias = "referTag",
        deserialize_with = "deserialize_opt_id"
    )]
    pub refer_tag: Option<String>,

    /// Statistic kind (average, min, max, ...)
    #[serde(rename = "type", default, deserialize_with = "deserialize_text")]
    pub stats_type: String,

    #[serde(
        default,
        alias = "updateCycleValue",
        deserialize_with = "deserialize_i64_flexible"
    )]
    pub update_cycle_value: i64,

    #[serde(
        default,
        alias = "updateCycleUnit",
        deserialize_with = "deserialize_text"
    )]
    pub update_cycle_unit: String,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: String,
}

/// Communication-forward section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunicationForward {
    #[serde(default)]
    pub bridges: Vec<BridgeConfig>,
}

/// One communication bridge, an ordered pipeline of blocks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Bridge id; entries without one are skipped on import
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,

    #[serde(default)]
    pub blocks: Vec<BlockConfig>,
}

/// One processing block inside a bridge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Block id; entries without one are skipped on import
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,

    #[serde(rename = "type", default, deserialize_with = "deserialize_text")]
    pub block_type: String,

    #[serde(
        default,
        alias = "subType",
        deserialize_with = "deserialize_text"
    )]
    pub sub_type: String,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub label: String,

    /// Block configuration, kept opaque and stored serialized
    #[serde(default)]
    pub config: Option<JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_decodes_to_empty_sections() {
        let doc: ConfigDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.io_setup.ports.is_empty());
        assert!(doc.calculation_tags.is_empty());
        assert!(doc.stats_tags.is_empty());
        assert!(doc.communication_forward.bridges.is_empty());
    }

    #[test]
    fn camel_case_aliases_decode() {
        let yaml = r#"
ioSetup:
  ports:
    - id: p1
      type: serial
      scanTime: "250"
      devices:
        - id: d1
          name: PLC1
          unitNumber: 3
          tags:
            - id: t1
              name: Temp
              dataType: Analog
              address: 40001
"#;
        let doc: ConfigDocument = serde_yaml::from_str(yaml).unwrap();
        let port = &doc.io_setup.ports[0];
        assert_eq!(port.scan_time, 250);
        assert!(port.enabled);
        let device = &port.devices[0];
        assert_eq!(device.unit_number, 3);
        let tag = &device.tags[0];
        assert_eq!(tag.address, "40001");
        assert_eq!(tag.scale, 1.0);
    }

    #[test]
    fn calculation_tag_operand_slots_iterate_in_order() {
        let tag: CalculationTagConfig = serde_json::from_str(
            r#"{"id": "c1", "a": "PLC1:Temp", "c": "PLC1:Pressure"}"#,
        )
        .unwrap();
        let slots = tag.operands();
        assert_eq!(slots[0].as_deref(), Some("PLC1:Temp"));
        assert!(slots[1].is_none());
        assert_eq!(slots[2].as_deref(), Some("PLC1:Pressure"));
    }

    #[test]
    fn stats_tag_id_is_string_coerced() {
        let tag: StatsTagConfig =
            serde_json::from_str(r#"{"id": 12, "referTag": "PLC1:Temp", "type": "average"}"#)
                .unwrap();
        assert_eq!(tag.id, "12");
        assert_eq!(tag.refer_tag.as_deref(), Some("PLC1:Temp"));
        assert_eq!(tag.stats_type, "average");
    }
}
