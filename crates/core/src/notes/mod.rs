//! Notes shared by properties and requirements.

mod notes_model;

pub use notes_model::{NewNote, Note};
