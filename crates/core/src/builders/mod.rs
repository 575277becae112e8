//! Builders module - the known builder-name list.

mod builders_service;
mod builders_traits;


pub use builders_service::BuilderService;
pub use builders_traits::{BuilderRepositoryTrait, BuilderServiceTrait};
