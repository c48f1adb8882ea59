//! Loopback test network
//!
//! Helpers for spinning up real nodes on ephemeral ports and waiting for
//! them to converge.

pub mod test_utils;

pub use test_utils::*;
