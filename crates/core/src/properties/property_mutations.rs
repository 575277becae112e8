//! Optimistic mutations on inventory properties.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::properties_model::{
    price_per_sqft, PriceChange, PriceHistoryEntry, Property, PropertyStatus,
};
use super::properties_traits::PropertyRepositoryTrait;
use crate::errors::{Error, Result};
use crate::events::DomainEvent;
use crate::mutation::{OptimisticMutation, UndoLog};
use crate::notes::{NewNote, Note};
use crate::state::{Action, ListEdit, PropertyPatch, Store, StoreState};

fn cached<'a>(state: &'a StoreState, property_id: &str) -> Result<&'a Property> {
    state
        .properties
        .get(property_id)
        .ok_or_else(|| Error::NotFound(format!("Property {}", property_id)))
}

fn patch(property_id: &str, patch: PropertyPatch) -> Action {
    Action::PropertyPatched {
        property_id: property_id.to_string(),
        patch,
    }
}

// ============================================================================
// Status
// ============================================================================

/// Sets a property's listing status.
pub struct SetPropertyStatus {
    repository: Arc<dyn PropertyRepositoryTrait>,
    property_id: String,
    status: PropertyStatus,
    undo: UndoLog,
}

impl SetPropertyStatus {
    pub fn new(
        repository: Arc<dyn PropertyRepositoryTrait>,
        property_id: impl Into<String>,
        status: PropertyStatus,
    ) -> Self {
        Self {
            repository,
            property_id: property_id.into(),
            status,
            undo: UndoLog::new(),
        }
    }
}

#[async_trait]
impl OptimisticMutation for SetPropertyStatus {
    type Output = Property;

    fn label(&self) -> String {
        format!("property {} status", self.property_id)
    }

    fn validate(&self, state: &StoreState) -> Result<()> {
        cached(state, &self.property_id).map(|_| ())
    }

    fn apply_local(&mut self, store: &Store) -> Result<()> {
        let id = self.property_id.clone();
        let status = self.status;
        let previous = store.transact(|state| match cached(state, &id) {
            Ok(property) => {
                let previous = property.status;
                let apply = patch(
                    &id,
                    PropertyPatch {
                        status: Some(status),
                        ..Default::default()
                    },
                );
                (vec![apply], Ok(previous))
            }
            Err(e) => (Vec::new(), Err(e)),
        })?;

        let guard_id = id.clone();
        self.undo.record_guarded(
            move |state| {
                state
                    .properties
                    .get(&guard_id)
                    .is_some_and(|p| p.status == status)
            },
            vec![patch(
                &id,
                PropertyPatch {
                    status: Some(previous),
                    ..Default::default()
                },
            )],
        );
        Ok(())
    }

    async fn commit_remote(&self) -> Result<Property> {
        self.repository
            .update_status(&self.property_id, self.status)
            .await
    }

    fn confirm_local(&mut self, store: &Store, output: &Property) {
        let id = self.property_id.clone();
        let optimistic = self.status;
        let confirmed = output.status;
        store.transact(|state| {
            // A later status change owns the field now.
            let still_ours = state
                .properties
                .get(&id)
                .is_some_and(|p| p.status == optimistic);
            let actions = if still_ours && confirmed != optimistic {
                vec![patch(
                    &id,
                    PropertyPatch {
                        status: Some(confirmed),
                        ..Default::default()
                    },
                )]
            } else {
                Vec::new()
            };
            (actions, ())
        });
    }

    fn undo_log(&mut self) -> &mut UndoLog {
        &mut self.undo
    }

    fn confirmed_event(&self, _output: &Property) -> Option<DomainEvent> {
        Some(DomainEvent::property_changed(&self.property_id, &["status"]))
    }
}

// ============================================================================
// Price
// ============================================================================

/// Result of a confirmed price change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceChangeReceipt {
    pub entry: PriceHistoryEntry,
    /// The record re-fetched after the write, when the re-fetch succeeded.
    pub property: Option<Property>,
}

/// Changes a property's price and appends a price-history entry.
pub struct ChangePropertyPrice {
    repository: Arc<dyn PropertyRepositoryTrait>,
    property_id: String,
    change: PriceChange,
    previous_price: Option<Decimal>,
    temp_entry_id: Option<String>,
    undo: UndoLog,
}

impl ChangePropertyPrice {
    pub fn new(
        repository: Arc<dyn PropertyRepositoryTrait>,
        property_id: impl Into<String>,
        change: PriceChange,
    ) -> Self {
        Self {
            repository,
            property_id: property_id.into(),
            change,
            previous_price: None,
            temp_entry_id: None,
            undo: UndoLog::new(),
        }
    }

    /// Id of the placeholder history entry while the write is pending.
    pub fn temp_entry_id(&self) -> Option<&str> {
        self.temp_entry_id.as_deref()
    }
}

#[async_trait]
impl OptimisticMutation for ChangePropertyPrice {
    type Output = PriceChangeReceipt;

    fn label(&self) -> String {
        format!("property {} price", self.property_id)
    }

    fn validate(&self, state: &StoreState) -> Result<()> {
        let property = cached(state, &self.property_id)?;
        self.change.validate(property.price)
    }

    fn apply_local(&mut self, store: &Store) -> Result<()> {
        let id = self.property_id.clone();
        let change = self.change.clone();
        let (previous_price, previous_ppsf, entry_id) =
            store.transact(|state| match cached(state, &id) {
                Ok(property) => {
                    // Re-checked under the write lock: a concurrent change may
                    // have moved the price since `validate`.
                    if let Err(e) = change.validate(property.price) {
                        return (Vec::new(), Err(e));
                    }
                    let entry = change.to_pending_entry(property.price, Utc::now());
                    let entry_id = entry.id.clone();
                    let apply = patch(
                        &id,
                        PropertyPatch {
                            price: Some(Some(change.new_price)),
                            price_per_sqft: Some(price_per_sqft(
                                change.new_price,
                                property.area_sqft,
                            )),
                            price_history: Some(ListEdit::push(entry)),
                            ..Default::default()
                        },
                    );
                    (
                        vec![apply],
                        Ok((property.price, property.price_per_sqft, entry_id)),
                    )
                }
                Err(e) => (Vec::new(), Err(e)),
            })?;

        self.previous_price = previous_price;
        self.temp_entry_id = Some(entry_id.clone());

        self.undo.record(vec![patch(
            &id,
            PropertyPatch {
                price_history: Some(ListEdit::remove(entry_id)),
                ..Default::default()
            },
        )]);
        let guard_id = id.clone();
        let optimistic = self.change.new_price;
        self.undo.record_guarded(
            move |state| {
                state
                    .properties
                    .get(&guard_id)
                    .is_some_and(|p| p.price == Some(optimistic))
            },
            vec![patch(
                &id,
                PropertyPatch {
                    price: Some(previous_price),
                    price_per_sqft: Some(previous_ppsf),
                    ..Default::default()
                },
            )],
        );
        Ok(())
    }

    async fn commit_remote(&self) -> Result<PriceChangeReceipt> {
        let entry = self
            .repository
            .record_price_change(&self.property_id, &self.change, self.previous_price)
            .await?;

        // The write already succeeded; a failed re-fetch must not roll it back.
        let property = match self.repository.get_by_id(&self.property_id).await {
            Ok(property) => Some(property),
            Err(e) => {
                warn!(
                    "Re-fetch of property {} after price change failed: {}",
                    self.property_id, e
                );
                None
            }
        };
        Ok(PriceChangeReceipt { entry, property })
    }

    fn confirm_local(&mut self, store: &Store, output: &PriceChangeReceipt) {
        let id = self.property_id.clone();
        let optimistic = self.change.new_price;
        let temp_id = self.temp_entry_id.clone();
        let entry = output.entry.clone();
        let authoritative = output.property.clone();
        store.transact(|state| {
            let Some(local) = state.properties.get(&id) else {
                return (Vec::new(), ());
            };
            let mut fields = PropertyPatch::default();
            if let Some(temp_id) = temp_id {
                fields.price_history = Some(ListEdit::replace(temp_id, entry.clone()));
            }
            if local.price == Some(optimistic) {
                match authoritative {
                    Some(remote) => {
                        fields.price = Some(remote.price);
                        fields.price_per_sqft = Some(remote.price_per_sqft);
                    }
                    None => {
                        fields.price = Some(Some(entry.price));
                    }
                }
            }
            (vec![patch(&id, fields)], ())
        });
    }

    fn undo_log(&mut self) -> &mut UndoLog {
        &mut self.undo
    }

    fn confirmed_event(&self, _output: &PriceChangeReceipt) -> Option<DomainEvent> {
        Some(DomainEvent::property_changed(
            &self.property_id,
            &["price", "pricePerSqft", "priceHistory"],
        ))
    }
}

// ============================================================================
// Notes
// ============================================================================

/// Appends a note to a property.
pub struct AddPropertyNote {
    repository: Arc<dyn PropertyRepositoryTrait>,
    property_id: String,
    note: NewNote,
    temp_note_id: Option<String>,
    undo: UndoLog,
}

impl AddPropertyNote {
    pub fn new(
        repository: Arc<dyn PropertyRepositoryTrait>,
        property_id: impl Into<String>,
        note: NewNote,
    ) -> Self {
        Self {
            repository,
            property_id: property_id.into(),
            note,
            temp_note_id: None,
            undo: UndoLog::new(),
        }
    }
}

#[async_trait]
impl OptimisticMutation for AddPropertyNote {
    type Output = Note;

    fn label(&self) -> String {
        format!("property {} note", self.property_id)
    }

    fn validate(&self, state: &StoreState) -> Result<()> {
        self.note.validate()?;
        cached(state, &self.property_id).map(|_| ())
    }

    fn apply_local(&mut self, store: &Store) -> Result<()> {
        let pending = self.note.to_pending_note(Utc::now());
        let temp_id = pending.id.clone();
        store.dispatch(patch(
            &self.property_id,
            PropertyPatch {
                notes: Some(ListEdit::push(pending)),
                ..Default::default()
            },
        ));
        self.undo.record(vec![patch(
            &self.property_id,
            PropertyPatch {
                notes: Some(ListEdit::remove(temp_id.clone())),
                ..Default::default()
            },
        )]);
        self.temp_note_id = Some(temp_id);
        Ok(())
    }

    async fn commit_remote(&self) -> Result<Note> {
        self.repository
            .append_note(&self.property_id, &self.note)
            .await
    }

    fn confirm_local(&mut self, store: &Store, output: &Note) {
        if let Some(temp_id) = self.temp_note_id.take() {
            store.dispatch(patch(
                &self.property_id,
                PropertyPatch {
                    notes: Some(ListEdit::replace(temp_id, output.clone())),
                    ..Default::default()
                },
            ));
        }
    }

    fn undo_log(&mut self) -> &mut UndoLog {
        &mut self.undo
    }

    fn confirmed_event(&self, _output: &Note) -> Option<DomainEvent> {
        Some(DomainEvent::property_changed(&self.property_id, &["notes"]))
    }
}
