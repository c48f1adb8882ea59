//! Configuration management
//!
//! Listen address, initial peers and wire limits for a node.

pub mod settings;

pub use settings::{resolve_addr, Config};
