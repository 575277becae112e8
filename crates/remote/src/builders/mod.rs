//! Known builder names.

mod repository;

pub use repository::BuilderRepository;
