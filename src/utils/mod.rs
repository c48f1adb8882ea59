//! Utility functions and helpers
//!
//! Hashing, timestamps and the JSON helpers used by both the block hash
//! and the peer wire envelope.

pub mod crypto;
pub mod serialization;

pub use crypto::{current_timestamp, sha256_digest, sha256_hex};

pub use serialization::{deserialize, serialize};
