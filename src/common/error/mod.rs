//! Crate-level error type.
//!
//! Each layer keeps its own error enum (`OpcError`, `OoxmlError`,
//! `XlsError`); `ConvertError` composes them at the conversion boundary.

pub mod types;

pub use types::{ConvertError, Result};
