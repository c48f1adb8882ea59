//! # Peer Chain - a minimal peer-to-peer ledger
//!
//! Every node keeps its own append-only chain of blocks, gossips new blocks
//! to the peers it is connected to, and converges with them on the longest
//! valid chain.
//!
//! ## How the code is organized
//! - `core/`: blocks, the chain with its validation and replacement rules,
//!   and the lock-guarded handle shared between threads
//! - `network/`: wire framing, the three protocol messages, connections and
//!   the node that reacts to them
//! - `config/`: listen address, peers and wire limits
//! - `utils/`: hashing, timestamps and JSON helpers
//! - `cli/`: command-line parsing and the operator console
//!
//! ## The protocol in one paragraph
//! A node that dials a peer sends `CHAIN_REQUEST`; the peer answers with
//! `CHAIN_RESPONSE` carrying its full chain, and the dialler adopts it only if
//! it is strictly longer and valid from the shared genesis onwards. Blocks
//! mined locally go out as `NEW_BLOCK`; a receiver appends one if it extends
//! its tip and relays it to everyone except the sender.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod utils;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use cli::{run_console, Command, Opt};
pub use config::Config;
pub use core::{compute_hash, is_valid_successor, Block, Chain, SharedChain};
pub use error::{LedgerError, Result};
pub use network::{Connection, ConnectionState, Message, Node, Outcome, Role, Server};
pub use utils::{current_timestamp, sha256_digest, sha256_hex};
