//! Requirement persistence over a document store.

mod repository;


pub use repository::RequirementRepository;
