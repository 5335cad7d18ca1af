//! Serde default value functions and custom deserializers for the
//! configuration document
//!
//! Documents arrive from a browser-side editor, so field types are loose:
//! ids and register addresses may be numbers or strings, booleans may be
//! `"true"`/`1`, numeric fields may be empty strings. The deserializers in
//! this module absorb those variations so the document structs stay clean.

use serde::de::{self, Deserializer};
use serde::Deserialize;

// ============================================================================
// Default Value Functions
// ============================================================================

/// Default value: true
///
/// Used for `enabled`-style flags which default to on.
pub fn bool_true() -> bool {
    true
}

/// Default value: false
pub fn bool_false() -> bool {
    false
}

/// Default scale factor: 1.0
///
/// Used for tag scaling (no transformation).
pub fn scale_one() -> f64 {
    1.0
}

// ============================================================================
// Custom Deserializers
// ============================================================================

/// Deserialize an id that may appear as a string or a number
///
/// Stats-tag ids in particular are emitted as numbers by some document
/// producers; all entity ids are stored as text.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        String(String),
        Int(i64),
        Float(f64),
    }

    match IdValue::deserialize(deserializer)? {
        IdValue::String(s) => Ok(s.trim().to_string()),
        IdValue::Int(i) => Ok(i.to_string()),
        IdValue::Float(f) => Ok(f.to_string()),
    }
}

/// Deserialize an optional id (string or number), treating `null` and empty
/// strings as absent
pub fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OptIdValue {
        None,
        String(String),
        Int(i64),
        Float(f64),
    }

    Ok(match OptIdValue::deserialize(deserializer)? {
        OptIdValue::None => None,
        OptIdValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        },
        OptIdValue::Int(i) => Some(i.to_string()),
        OptIdValue::Float(f) => Some(f.to_string()),
    })
}

/// Deserialize a free-text field that may appear as a number
///
/// Register addresses (`40001`) are the common case.
pub fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextValue {
        None,
        String(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match TextValue::deserialize(deserializer)? {
        TextValue::None => String::new(),
        TextValue::String(s) => s,
        TextValue::Int(i) => i.to_string(),
        TextValue::Float(f) => f.to_string(),
        TextValue::Bool(b) => b.to_string(),
    })
}

/// Deserialize a boolean that supports multiple input formats
///
/// Supports native booleans, integers, and string values:
/// - boolean: true, false
/// - integer: 0 (false), 1 (true)
/// - string: "1"/"0", "true"/"false", "yes"/"no" (case-insensitive)
pub fn deserialize_bool_flexible<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrStringOrInt {
        Bool(bool),
        Int(i64),
        String(String),
    }

    match BoolOrStringOrInt::deserialize(deserializer)? {
        BoolOrStringOrInt::Bool(b) => Ok(b),
        BoolOrStringOrInt::Int(i) => match i {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(de::Error::custom(format!(
                "Invalid integer value {}, expected 0 or 1",
                i
            ))),
        },
        BoolOrStringOrInt::String(s) => match s.to_lowercase().trim() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            other => Err(de::Error::custom(format!(
                "Invalid boolean value '{}', expected: 1/0, true/false, yes/no, or boolean",
                other
            ))),
        },
    }
}

/// Like [`deserialize_bool_flexible`] but defaulting to true for null input
///
/// Used for `enabled` flags: absent or null means enabled, only an explicit
/// falsy value disables.
pub fn deserialize_enabled<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum EnabledValue {
        None,
        Bool(bool),
        Int(i64),
        String(String),
    }

    Ok(match EnabledValue::deserialize(deserializer)? {
        EnabledValue::None => true,
        EnabledValue::Bool(b) => b,
        EnabledValue::Int(i) => i != 0,
        EnabledValue::String(s) => {
            let t = s.trim();
            !(t == "0" || t.eq_ignore_ascii_case("false") || t.eq_ignore_ascii_case("no"))
        },
    })
}

/// Deserialize an i64 that may be a number, a numeric string, or empty
///
/// Empty strings and null decode to 0, matching the timing/scan field
/// defaulting policy.
pub fn deserialize_i64_flexible<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntValue {
        None,
        Int(i64),
        Float(f64),
        String(String),
    }

    match IntValue::deserialize(deserializer)? {
        IntValue::None => Ok(0),
        IntValue::Int(i) => Ok(i),
        IntValue::Float(f) => Ok(f as i64),
        IntValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(0)
            } else {
                trimmed.parse::<i64>().map_err(de::Error::custom)
            }
        },
    }
}

/// Deserialize an f64 that may be a number, a numeric string, or empty
pub fn deserialize_f64_flexible<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FloatValue {
        None,
        Float(f64),
        String(String),
    }

    match FloatValue::deserialize(deserializer)? {
        FloatValue::None => Ok(0.0),
        FloatValue::Float(f) => Ok(f),
        FloatValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(0.0)
            } else {
                trimmed.parse::<f64>().map_err(de::Error::custom)
            }
        },
    }
}

/// Deserialize scale with default 1.0 for empty input
pub fn deserialize_scale<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_f64_flexible(deserializer).map(|v| if v == 0.0 { 1.0 } else { v })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct IdHolder {
        #[serde(deserialize_with = "deserialize_id")]
        id: String,
    }

    #[derive(Deserialize)]
    struct FlagHolder {
        #[serde(default = "bool_true", deserialize_with = "deserialize_enabled")]
        enabled: bool,
    }

    #[derive(Deserialize)]
    struct NumHolder {
        #[serde(default, deserialize_with = "deserialize_i64_flexible")]
        scan_time: i64,
    }

    #[test]
    fn ids_coerce_from_numbers() {
        let h: IdHolder = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(h.id, "42");
        let h: IdHolder = serde_json::from_str(r#"{"id": " t1 "}"#).unwrap();
        assert_eq!(h.id, "t1");
    }

    #[test]
    fn enabled_defaults_true_and_accepts_strings() {
        let h: FlagHolder = serde_json::from_str(r#"{}"#).unwrap();
        assert!(h.enabled);
        let h: FlagHolder = serde_json::from_str(r#"{"enabled": null}"#).unwrap();
        assert!(h.enabled);
        let h: FlagHolder = serde_json::from_str(r#"{"enabled": "false"}"#).unwrap();
        assert!(!h.enabled);
        let h: FlagHolder = serde_json::from_str(r#"{"enabled": 0}"#).unwrap();
        assert!(!h.enabled);
    }

    #[test]
    fn numbers_tolerate_strings_and_empty() {
        let h: NumHolder = serde_json::from_str(r#"{"scan_time": "1000"}"#).unwrap();
        assert_eq!(h.scan_time, 1000);
        let h: NumHolder = serde_json::from_str(r#"{"scan_time": ""}"#).unwrap();
        assert_eq!(h.scan_time, 0);
        let h: NumHolder = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(h.scan_time, 0);
    }

    #[test]
    fn optional_ids_drop_empty_strings() {
        #[derive(Deserialize)]
        struct OptHolder {
            #[serde(default, deserialize_with = "deserialize_opt_id")]
            id: Option<String>,
        }

        let h: OptHolder = serde_json::from_str(r#"{"id": ""}"#).unwrap();
        assert!(h.id.is_none());
        let h: OptHolder = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(h.id.as_deref(), Some("7"));
    }
}
