//! Arrow data handling utilities
//!
//! Typed column access for record batches whose column types depend on how
//! the extract was encoded.

pub mod array_utils;

pub use array_utils::{float_column, optional_string_column, string_column};
