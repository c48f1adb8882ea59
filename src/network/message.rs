use crate::core::Block;
use crate::error::{LedgerError, Result};
use crate::utils::{deserialize, serialize};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Peer messages, tagged by a `type` field on the wire
///
/// ```json
/// {"type":"CHAIN_REQUEST"}
/// {"type":"CHAIN_RESPONSE","chain":[{"index":0,...}]}
/// {"type":"NEW_BLOCK","block":{"index":3,...}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Ask the peer for its full chain
    ChainRequest,
    /// Full chain, genesis first
    ChainResponse { chain: Vec<Block> },
    /// A block to append and propagate
    NewBlock { block: Block },
}

impl Message {
    pub fn encode(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    /// Decode one envelope. Anything that is not one of the three message
    /// kinds with all required fields comes back as `MalformedMessage`.
    pub fn decode(bytes: &[u8]) -> Result<Message> {
        deserialize(bytes).map_err(|e| LedgerError::MalformedMessage(e.to_string()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Message::ChainRequest => "CHAIN_REQUEST",
            Message::ChainResponse { .. } => "CHAIN_RESPONSE",
            Message::NewBlock { .. } => "NEW_BLOCK",
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::ChainRequest => write!(f, "CHAIN_REQUEST"),
            Message::ChainResponse { chain } => {
                write!(f, "CHAIN_RESPONSE ({} blocks)", chain.len())
            }
            Message::NewBlock { block } => {
                write!(f, "NEW_BLOCK #{} {}", block.get_index(), block.short_hash())
            }
        }
    }
}
