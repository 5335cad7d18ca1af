//! Reference index builder
//!
//! One pass over the decoded document's `io_setup.ports[*].devices[*].tags[*]`
//! hierarchy builds the case-insensitive lookup from `"device:tag"` name
//! keys to declared tag ids. Calculation and stats tags resolve their
//! free-text references through this index.
//!
//! The walk is tolerant by construction: a missing or malformed array at
//! any level is treated as empty. Duplicate keys resolve last-write-wins
//! and are recorded so the import can report (or, under the strict policy,
//! reject) them.

use std::collections::HashMap;

use serde_json::Value as JsonValue;
use tracing::debug;

/// Case-insensitive `device:tag` → tag-id lookup table
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    entries: HashMap<String, String>,
    duplicates: Vec<String>,
}

impl ReferenceIndex {
    /// Build the index from a decoded document
    pub fn build(doc: &JsonValue) -> Self {
        let mut index = Self::default();

        for port in section_array(doc, &["io_setup", "ioSetup"], "ports") {
            for device in member_array(port, "devices") {
                let device_name = match text_value(device.get("name")) {
                    Some(name) if !name.is_empty() => name,
                    _ => continue,
                };

                for tag in member_array(device, "tags") {
                    let tag_name = match text_value(tag.get("name")) {
                        Some(name) if !name.is_empty() => name,
                        _ => continue,
                    };
                    let tag_id = match text_value(tag.get("id")) {
                        Some(id) if !id.is_empty() => id,
                        _ => continue,
                    };

                    let key = format!(
                        "{}:{}",
                        device_name.to_lowercase(),
                        tag_name.to_lowercase()
                    );
                    if index.entries.insert(key.clone(), tag_id).is_some() {
                        debug!("Duplicate tag key '{}': last definition wins", key);
                        index.duplicates.push(key);
                    }
                }
            }
        }

        index
    }

    /// Resolve a `device:tag` reference to a tag id, case-insensitively
    pub fn resolve(&self, reference: &str) -> Option<&str> {
        self.entries
            .get(&reference.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Keys that appeared more than once in the document
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Number of distinct keys in the index
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the document declared no referenceable tags
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fetch `doc[one of keys][member]` as an array slice, tolerating absence
/// and wrong types
pub(crate) fn section_array<'a>(doc: &'a JsonValue, keys: &[&str], member: &str) -> &'a [JsonValue] {
    keys.iter()
        .find_map(|key| doc.get(key))
        .and_then(|section| section.get(member))
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Fetch `value[member]` as an array slice, tolerating absence and wrong
/// types
pub(crate) fn member_array<'a>(value: &'a JsonValue, member: &str) -> &'a [JsonValue] {
    value
        .get(member)
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Coerce a name/id value to text (strings pass through, numbers stringify)
fn text_value(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
