//! Linux namespace management for container isolation.
//!
//! Only the mount namespace is used: the host's mount tree is made private
//! before any container mount, and each child gets its own copy of the
//! mount table via `unshare(2)`.

pub mod mount;
