//! Document decoder
//!
//! Submitted configuration text is YAML-first with a strict-JSON fallback.
//! YAML is a JSON superset, so the fallback only matters for inputs the
//! YAML parser rejects on syntax (hard tabs, duplicate-key documents from
//! some producers). Empty and null input decode to an empty mapping so
//! downstream stages see "no sections", never an error.

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{CfgSrvError, Result};

/// Decode raw configuration text into a structured document
pub fn decode(raw: &str) -> Result<JsonValue> {
    match serde_yaml::from_str::<JsonValue>(raw) {
        Ok(JsonValue::Null) => Ok(JsonValue::Object(serde_json::Map::new())),
        Ok(value) => Ok(value),
        Err(yaml_err) => match serde_json::from_str::<JsonValue>(raw) {
            Ok(value) => {
                debug!("YAML decode failed ({}), JSON fallback succeeded", yaml_err);
                Ok(value)
            },
            Err(json_err) => {
                debug!(
                    "Document decode failed: yaml: {}; json: {}",
                    yaml_err, json_err
                );
                Err(CfgSrvError::InvalidConfigFormat)
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_document_decodes() {
        let doc = decode("io_setup:\n  ports: []\n").unwrap();
        assert!(doc["io_setup"]["ports"].as_array().unwrap().is_empty());
    }

    #[test]
    fn json_with_duplicate_keys_falls_back() {
        // The YAML parser rejects duplicate mapping keys; JSON accepts them
        // with last-wins semantics.
        let raw = r#"{"io_setup": {"ports": []}, "io_setup": {"ports": [{"id": "p1"}]}}"#;
        let doc = decode(raw).unwrap();
        assert_eq!(doc["io_setup"]["ports"][0]["id"], "p1");
    }

    #[test]
    fn garbage_is_rejected() {
        let err = decode("{not: yaml: or: json").unwrap_err();
        assert!(matches!(err, CfgSrvError::InvalidConfigFormat));
    }

    #[test]
    fn empty_body_decodes_to_empty_mapping() {
        let doc = decode("").unwrap();
        assert!(doc.as_object().unwrap().is_empty());

        let doc = decode("null").unwrap();
        assert!(doc.as_object().unwrap().is_empty());
    }

    #[test]
    fn scalar_document_is_not_an_error() {
        // A bare scalar is a valid YAML document; it simply has no sections.
        let doc = decode("just a note").unwrap();
        assert!(doc.is_string());
    }
}
