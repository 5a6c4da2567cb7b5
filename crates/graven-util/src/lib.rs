//! Shared utilities for Graven.
//!
//! This crate provides cross-cutting concerns used by all other Graven crates:
//! error types, filesystem helpers, checksum hashing, and terminal progress
//! indicators.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
