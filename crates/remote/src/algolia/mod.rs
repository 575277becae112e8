//! Algolia search backend.

mod client;


pub use client::{query_body, AlgoliaClient, AlgoliaConfig};
