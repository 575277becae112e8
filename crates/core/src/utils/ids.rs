use uuid::Uuid;

use crate::constants::TEMP_ID_PREFIX;

/// Generates a temporary id for a sub-record that the remote store has not
/// assigned an id to yet.
pub fn temp_id() -> String {
    format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4())
}

/// Returns true if `id` was produced by [`temp_id`].
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Generates a time-ordered id for a newly persisted sub-record.
///
/// UUID v7 ids sort by creation time, so entries appended later always
/// compare greater than earlier ones.
pub fn assigned_id() -> String {
    Uuid::now_v7().to_string()
}
