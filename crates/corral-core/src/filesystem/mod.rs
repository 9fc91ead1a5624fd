//! Filesystem setup for container isolation.
//!
//! The stages run in a fixed order, enforced by the types they exchange:
//! [`mount::mount_namespace`] yields a [`mount::MountedRoot`], which
//! [`devices::provision_devices`] requires, and [`chroot::enter_root`]
//! confines the calling process last.

pub mod chroot;
pub mod devices;
pub mod mount;
