//! # corral-image
//!
//! Root filesystem materialization for corral.
//!
//! Handles:
//! - **Sources**: locating `<image_dir>/<image_name>.tar`.
//! - **Layers**: unpacking a plain or gzip-compressed tar archive.
//! - **Hashing**: SHA-256 digest of the archive.
//! - **Rootfs**: creating `<container_dir>/<id>/rootfs` and filling it.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod hash;
pub mod layer;
pub mod rootfs;
pub mod source;
