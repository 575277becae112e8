//! Requirements module - buyer requirements, their optimistic mutations and services.

mod requirement_mutations;
mod requirements_model;
mod requirements_service;
mod requirements_traits;

#[cfg(test)]
mod requirements_model_tests;
#[cfg(test)]
mod requirements_service_tests;

pub use requirement_mutations::{
    AddRequirementNote, ChangeMatchingProperty, RequirementStatusUpdate, SetRequirementStatus,
};
pub use requirements_model::{Budget, InternalStatus, NewRequirement, Requirement, RequirementStatus};
pub use requirements_service::RequirementService;
pub use requirements_traits::{RequirementRepositoryTrait, RequirementServiceTrait};
