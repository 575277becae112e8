//! Display-fallback convention.
//!
//! Records mirrored from the document store carry many optional fields. Any
//! missing value is rendered as [`DISPLAY_FALLBACK`] rather than an empty cell.

use std::fmt::Display;

use crate::constants::DISPLAY_FALLBACK;

/// Renders an optional value, substituting the fallback when absent.
pub trait DisplayFallback {
    fn display_or_fallback(&self) -> String;
}

impl<T: Display> DisplayFallback for Option<T> {
    fn display_or_fallback(&self) -> String {
        match self {
            Some(value) => value.to_string(),
            None => DISPLAY_FALLBACK.to_string(),
        }
    }
}

/// Joins list values with `", "`, or returns the fallback for an empty list.
pub fn join_or_fallback<T: AsRef<str>>(values: &[T]) -> String {
    if values.is_empty() {
        return DISPLAY_FALLBACK.to_string();
    }
    values
        .iter()
        .map(|v| v.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}
