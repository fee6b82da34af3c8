//! Test utilities and fixtures for typeprobe
//!
//! Shared by the integration suites (`tests/` directories) of the core and
//! CLI crates.

pub mod compile;
pub mod fixtures;
pub mod mocks;
