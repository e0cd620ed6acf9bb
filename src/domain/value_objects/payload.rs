use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Record body carried by a sync action.
///
/// Always a JSON object; the `id` field, when present, names the row the
/// action targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordPayload(Value);

impl RecordPayload {
    pub fn new(value: Value) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| format!("Invalid JSON payload: {e}"))?;
        Self::new(value)
    }

    /// The targeted row id, read from the payload's `id` field.
    pub fn record_id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Returns a copy of the payload with `id` set, leaving any existing
    /// value untouched.
    pub fn with_record_id(&self, id: &str) -> Self {
        let mut value = self.0.clone();
        if let Value::Object(map) = &mut value {
            map.entry("id".to_string())
                .or_insert_with(|| Value::String(id.to_string()));
        }
        Self(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    fn validate(value: &Value) -> Result<(), String> {
        if !value.is_object() {
            return Err("Record payload must be a JSON object".to_string());
        }
        Ok(())
    }
}

impl From<RecordPayload> for Value {
    fn from(payload: RecordPayload) -> Self {
        payload.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_object_payload() {
        assert!(RecordPayload::new(json!("just a string")).is_err());
        assert!(RecordPayload::new(Value::Null).is_err());
    }

    #[test]
    fn record_id_reads_id_field() {
        let payload = RecordPayload::new(json!({"id": "f1", "name": "North Field"})).unwrap();
        assert_eq!(payload.record_id(), Some("f1"));
    }

    #[test]
    fn with_record_id_keeps_existing_id() {
        let payload = RecordPayload::new(json!({"id": "f1"})).unwrap();
        assert_eq!(payload.with_record_id("f2").record_id(), Some("f1"));

        let missing = RecordPayload::new(json!({"name": "Maize"})).unwrap();
        assert_eq!(missing.with_record_id("c1").record_id(), Some("c1"));
    }
}
