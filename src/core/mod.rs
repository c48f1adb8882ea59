//! Core ledger functionality
//!
//! Blocks, the chain with its validation and replacement rules, and the
//! lock-guarded handle that connection handlers share.

pub mod block;
pub mod chain;
pub mod shared;

pub use block::{compute_hash, Block, GENESIS_DATA, GENESIS_PREVIOUS_HASH};
pub use chain::{is_valid_successor, Chain};
pub use shared::SharedChain;
