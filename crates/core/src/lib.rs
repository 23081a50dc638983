//! Analog media device discovery
//!
//! Identity resolution and matching engine for analog (non self-describing)
//! capture hardware: fuzzy resolution of free-text device names, fingerprint
//! driven scanning, composite audio+video merging and reconciliation with user
//! configuration.

pub mod domain;

pub use domain::*;
