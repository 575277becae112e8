//! Firestore REST v1 backend.

mod client;
mod query;
mod value;


pub use client::{FirestoreClient, FirestoreConfig};
pub use query::{field_path, structured_query};
pub use value::{decode_document, decode_value, encode_fields, encode_value};
