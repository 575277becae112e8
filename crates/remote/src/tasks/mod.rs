//! Lead follow-up task persistence.

mod repository;


pub use repository::TaskRepository;
