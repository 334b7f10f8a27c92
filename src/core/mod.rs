//! Core transformation logic: filename normalization and matrix assembly.
//!
//! Pure functions over in-memory data; no I/O, no state between runs.

pub mod matrix;
pub mod normalize;

pub use matrix::{MatrixRow, PresenceMatrix};
pub use normalize::{normalize, DiscardReason, Normalized};
