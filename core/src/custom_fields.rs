//! Vendor-defined extra fields.
//!
//! Records that opt in carry a `#[serde(flatten)] custom_fields` member, so
//! every key serde does not recognize lands here instead of being dropped.
//! A nested `custom_fields` list or object sent by the API is expanded into
//! its entries. Records that don't opt in answer with an empty slice.

use std::collections::BTreeMap;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One ad-hoc key/value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomField {
    key: String,
    value: Value,
}

impl CustomField {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Captured custom fields, ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomFields(Vec<CustomField>);

impl CustomFields {
    pub fn as_slice(&self) -> &[CustomField] {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Key under which the API nests its own custom-field list.
const NESTED_KEY: &str = "custom_fields";

/// Entries of a nested `custom_fields` value: either a list of
/// `{"key": .., "value": ..}` objects or a plain object. `None` if the
/// value has neither shape.
fn nested_entries(value: &Value) -> Option<Vec<(String, Value)>> {
    match value {
        Value::Null => Some(Vec::new()),
        Value::Object(map) => Some(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let key = item.get("key")?.as_str()?;
                let value = item.get("value").cloned().unwrap_or(Value::Null);
                Some((key.to_string(), value))
            })
            .collect(),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for CustomFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        let mut fields = BTreeMap::new();
        let mut nested = Vec::new();
        for (key, value) in map {
            if key == NESTED_KEY {
                if let Some(entries) = nested_entries(&value) {
                    nested = entries;
                    continue;
                }
            }
            fields.insert(key, value);
        }
        // Entries the API declares explicitly win over same-named loose keys.
        fields.extend(nested);
        Ok(Self(
            fields
                .into_iter()
                .map(|(key, value)| CustomField { key, value })
                .collect(),
        ))
    }
}

impl Serialize for CustomFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in &self.0 {
            map.serialize_entry(&field.key, &field.value)?;
        }
        map.end()
    }
}

/// Read access to custom fields for records that may carry them.
pub trait HasCustomFields {
    fn custom_fields(&self) -> Option<&CustomFields> {
        None
    }

    fn all_custom_fields(&self) -> &[CustomField] {
        self.custom_fields()
            .map(CustomFields::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct WithExtras {
        id: i64,
        #[serde(flatten)]
        custom_fields: CustomFields,
    }

    impl HasCustomFields for WithExtras {
        fn custom_fields(&self) -> Option<&CustomFields> {
            Some(&self.custom_fields)
        }
    }

    struct Plain;

    impl HasCustomFields for Plain {}

    #[test]
    fn unknown_keys_are_captured() {
        let record: WithExtras =
            serde_json::from_value(json!({"id": 1, "mill_code": "AX-1", "fire_rating": 2}))
                .unwrap();
        assert_eq!(record.id, 1);
        let fields = record.all_custom_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].key(), "fire_rating");
        assert_eq!(fields[0].value(), &json!(2));
        assert_eq!(record.custom_fields.get("mill_code"), Some(&json!("AX-1")));
        assert_eq!(record.custom_fields.get("id"), None);
    }

    #[test]
    fn nested_list_is_expanded_next_to_loose_keys() {
        let record: WithExtras = serde_json::from_value(json!({
            "id": 1,
            "fire_rating": 2,
            "mill_code": "loose",
            "custom_fields": [
                {"key": "mill_code", "value": "AX"},
                {"key": "backing", "value": null}
            ]
        }))
        .unwrap();
        let keys: Vec<&str> = record.all_custom_fields().iter().map(CustomField::key).collect();
        assert_eq!(keys, ["backing", "fire_rating", "mill_code"]);
        assert_eq!(record.custom_fields.get("mill_code"), Some(&json!("AX")));
        assert_eq!(record.custom_fields.get("custom_fields"), None);
    }

    #[test]
    fn nested_object_is_expanded() {
        let record: WithExtras =
            serde_json::from_value(json!({"id": 1, "custom_fields": {"origin": "BE"}})).unwrap();
        assert_eq!(record.custom_fields.len(), 1);
        assert_eq!(record.custom_fields.get("origin"), Some(&json!("BE")));
    }

    #[test]
    fn unrecognized_nested_shape_is_kept_whole() {
        let record: WithExtras =
            serde_json::from_value(json!({"id": 1, "custom_fields": [1, 2]})).unwrap();
        assert_eq!(record.custom_fields.get("custom_fields"), Some(&json!([1, 2])));
    }

    #[test]
    fn records_without_capability_report_nothing() {
        assert!(Plain.all_custom_fields().is_empty());
    }

    #[test]
    fn serializes_back_to_map() {
        let fields = CustomFields(vec![CustomField::new("a", json!(1))]);
        assert_eq!(serde_json::to_value(&fields).unwrap(), json!({"a": 1}));
    }
}
