use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::state::HasId;
use crate::utils::temp_id;

/// A note appended to a property or requirement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HasId for Note {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Input model for appending a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub text: String,
    pub author: Option<String>,
}

impl NewNote {
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::missing("text").into());
        }
        Ok(())
    }

    /// Builds the locally visible note shown while the write is in flight.
    pub fn to_pending_note(&self, now: DateTime<Utc>) -> Note {
        Note {
            id: temp_id(),
            text: self.text.trim().to_string(),
            author: self.author.clone(),
            created_at: now,
        }
    }
}
