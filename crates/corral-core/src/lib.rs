//! # corral-core
//!
//! Low-level Linux isolation primitives for corral.
//!
//! This crate provides safe wrappers over:
//! - **Namespaces**: private mount propagation and per-child mount namespaces.
//! - **Filesystem**: `proc`/`sysfs`/`tmpfs` mounts inside a container root,
//!   `/dev` provisioning, and the `chroot` jail transition.
//!
//! Nothing here rolls back on failure: a mount or device node created before
//! an error stays in place.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod filesystem;
pub mod namespace;
