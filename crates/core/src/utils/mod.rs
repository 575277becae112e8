//! Small shared helpers: display fallbacks and identifier generation.

mod display;
mod ids;

pub use display::{join_or_fallback, DisplayFallback};
pub use ids::{assigned_id, is_temp_id, temp_id};
