//! Property persistence over a document store.

mod repository;


pub use repository::PropertyRepository;
