//! # Siege Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - Simulation fixtures and scripted sessions
//! - Recording observer
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod observer;

/// Re-export proptest for convenience.
pub use proptest;
