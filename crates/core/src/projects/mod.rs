//! Projects module - pre-launch and post-RERA catalogs edited by draft diff.

mod project_draft;
mod project_mutations;
mod projects_model;
mod projects_service;
mod projects_traits;


pub use project_draft::ProjectDraft;
pub use project_mutations::SubmitProjectEdit;
pub use projects_model::{
    PhaseDetail, Project, ProjectDocument, ProjectStage, ProjectSummary, UnitType,
};
pub use projects_service::ProjectService;
pub use projects_traits::{ProjectRepositoryTrait, ProjectServiceTrait};
