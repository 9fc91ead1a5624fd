//! # corral-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the corral workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and describes one container launch (`ContainerSpec`) and
//! the runtime state derived from it (`ContainerInstance`).

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
