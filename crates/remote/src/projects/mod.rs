//! Project catalog persistence.

mod repository;

#[cfg(test)]
mod repository_tests;

pub use repository::ProjectRepository;
