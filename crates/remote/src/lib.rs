//! Remote store adapters for propdesk.
//!
//! This crate implements the repository and search traits defined in
//! `propdesk-core` and contains:
//! - A document-store abstraction with Firestore REST and in-memory backends
//! - A search-index client for Algolia and an in-memory index for development
//! - Repository implementations for every domain record
//!
//! # Architecture
//!
//! This crate is the only place where HTTP clients and wire codecs exist.
//! `core` works purely with traits.
//!
//! ```text
//!            core (domain, mutations)
//!                     │
//!                     ▼
//!            remote (this crate)
//!          ┌──────────┴──────────┐
//!          ▼                     ▼
//!   DocumentStore         SearchIndexTrait
//!   Firestore | memory    Algolia | memory
//! ```

pub mod algolia;
pub mod document;
pub mod errors;
pub mod firestore;
mod search_memory;
mod utils;

// Repository implementations
pub mod builders;
pub mod projects;
pub mod properties;
pub mod requirements;
pub mod tasks;

pub use algolia::{AlgoliaClient, AlgoliaConfig};
pub use document::{DocumentStore, MemoryDocumentStore};
pub use errors::RemoteError;
pub use firestore::{FirestoreClient, FirestoreConfig};
pub use search_memory::MemorySearchIndex;

pub use builders::BuilderRepository;
pub use projects::ProjectRepository;
pub use properties::PropertyRepository;
pub use requirements::RequirementRepository;
pub use tasks::TaskRepository;

// Re-export from propdesk-core for convenience
pub use propdesk_core::errors::{Error, Result, StoreError};
