//! The `utils` module provides definitions shared across the `airhub` crate:
//! the crate-wide error type and logging setup.

pub mod error;
pub mod logging;
