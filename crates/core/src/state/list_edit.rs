//! Single-entry edits on list-valued record fields.

use serde::{Deserialize, Serialize};

/// Anything that can be located in a list by identifier.
pub trait HasId {
    fn id(&self) -> &str;
}

impl HasId for String {
    fn id(&self) -> &str {
        self.as_str()
    }
}

/// An edit touching exactly one entry of a list field.
///
/// Edits never rewrite the whole list, so an entry added or removed by a
/// different mutation is left alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ListEdit<T> {
    /// Append `item`, or replace the entry that already has its id.
    Push { item: T },
    /// Insert `item` at `index` (clamped to the list length).
    Insert { index: usize, item: T },
    /// Remove the entry with `id`, if present.
    Remove { id: String },
    /// Swap the entry with `id` for `item`.
    Replace { id: String, item: T },
}

impl<T: HasId> ListEdit<T> {
    pub fn push(item: T) -> Self {
        ListEdit::Push { item }
    }

    pub fn remove(id: impl Into<String>) -> Self {
        ListEdit::Remove { id: id.into() }
    }

    pub fn replace(id: impl Into<String>, item: T) -> Self {
        ListEdit::Replace {
            id: id.into(),
            item,
        }
    }

    /// Applies the edit to `list`.
    pub fn apply(self, list: &mut Vec<T>) {
        match self {
            ListEdit::Push { item } => {
                if let Some(pos) = position(list, item.id()) {
                    list[pos] = item;
                } else {
                    list.push(item);
                }
            }
            ListEdit::Insert { index, item } => {
                if position(list, item.id()).is_some() {
                    return;
                }
                let index = index.min(list.len());
                list.insert(index, item);
            }
            ListEdit::Remove { id } => {
                list.retain(|entry| entry.id() != id);
            }
            ListEdit::Replace { id, item } => {
                // A refresh may already have brought in the authoritative entry.
                if id != item.id() && position(list, item.id()).is_some() {
                    list.retain(|entry| entry.id() != id);
                    return;
                }
                match position(list, &id) {
                    Some(pos) => list[pos] = item,
                    None => list.push(item),
                }
            }
        }
    }
}

fn position<T: HasId>(list: &[T], id: &str) -> Option<usize> {
    list.iter().position(|entry| entry.id() == id)
}
