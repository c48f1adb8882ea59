//! Peer-to-peer networking
//!
//! Framing, the three-message protocol, connection lifecycle, and the node
//! that ties a chain to its peers.

pub mod codec;
pub mod connection;
pub mod message;
pub mod node;
pub mod peers;
pub mod server;

pub use connection::{Connection, ConnectionState, Role};
pub use message::Message;
pub use node::{Node, Outcome};
pub use peers::Peers;
pub use server::Server;
