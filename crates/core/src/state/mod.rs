//! Application store.
//!
//! All cached records live in a single [`StoreState`] owned by a [`Store`].
//! State only changes through [`Store::dispatch`], which applies one
//! [`Action`] at a time through the reducer.

mod list_edit;
mod reducer;
mod state_model;
mod store;


pub use list_edit::{HasId, ListEdit};
pub use state_model::{
    Action, FetchStatus, PropertyPatch, RecordKey, RequirementPatch, StoreState, TaskPatch,
};
pub use store::Store;
