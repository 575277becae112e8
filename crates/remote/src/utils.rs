use chrono::Utc;
use propdesk_core::notes::{NewNote, Note};
use propdesk_core::utils::assigned_id;
use propdesk_core::Result;
use serde::Serialize;
use serde_json::{Map, Value};

/// Current time in the wire format used for `createdAt` / `updatedAt`.
pub(crate) fn now_value() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

pub(crate) fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// A field map touching `field` and `updatedAt`.
pub(crate) fn touched(field: &str, value: Value) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(field.to_string(), value);
    fields.insert("updatedAt".to_string(), now_value());
    fields
}

/// The persisted form of a note, with its assigned id.
pub(crate) fn stored_note(note: &NewNote) -> Note {
    Note {
        id: assigned_id(),
        text: note.text.trim().to_string(),
        author: note.author.clone(),
        created_at: Utc::now(),
    }
}
