//! Request middleware.
//!
//! Cross-cutting request lifecycle concerns: currently trace correlation.

pub mod trace;

pub use trace::Trace;
