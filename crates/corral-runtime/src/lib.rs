//! Container bootstrap for corral.
//!
//! [`engine::Engine`] runs the stages in order: root creation, pseudo
//! filesystem mounts, device provisioning, then the launcher in
//! [`container`], which confines itself, starts the entrypoint and waits.

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod container;
pub mod engine;
pub mod process;
