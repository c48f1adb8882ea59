use crate::utils::sha256_hex;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Sentinel `previous_hash` carried by the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const GENESIS_DATA: &str = "Genesis Block";

// Built once; every node starts from an identical copy.
static GENESIS: Lazy<Block> = Lazy::new(|| {
    Block::new_block(0, 0, GENESIS_DATA.to_string(), GENESIS_PREVIOUS_HASH.to_string())
});

/// One ledger entry plus its position and hash linkage.
///
/// Blocks are never mutated after construction. The field order here is also
/// the wire order: `index, timestamp, data, previous_hash, hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    timestamp: i64,
    data: String,
    previous_hash: String,
    hash: String,
}

/// Digest over the four content fields.
///
/// The fields are rendered as a compact JSON object whose keys are sorted
/// (`data, index, previous_hash, timestamp`), then hashed with SHA-256 and
/// hex encoded. Any party holding the same fields gets the same string.
pub fn compute_hash(index: u64, timestamp: i64, data: &str, previous_hash: &str) -> String {
    // serde_json's default map is a BTreeMap, so key order is canonical
    let content = json!({
        "index": index,
        "timestamp": timestamp,
        "data": data,
        "previous_hash": previous_hash,
    });
    sha256_hex(content.to_string().as_bytes())
}

impl Block {
    /// Build a block and embed its computed hash
    pub fn new_block(index: u64, timestamp: i64, data: String, previous_hash: String) -> Block {
        let hash = compute_hash(index, timestamp, &data, &previous_hash);
        Block {
            index,
            timestamp,
            data,
            previous_hash,
            hash,
        }
    }

    /// Rebuild a block from received fields, taking `hash` as claimed.
    /// The chain re-checks it before the block is ever accepted.
    pub fn from_wire(
        index: u64,
        timestamp: i64,
        data: String,
        previous_hash: String,
        hash: String,
    ) -> Block {
        Block {
            index,
            timestamp,
            data,
            previous_hash,
            hash,
        }
    }

    /// The fixed first block of every chain
    pub fn genesis() -> Block {
        GENESIS.clone()
    }

    /// Recompute the digest from this block's own content fields
    pub fn calculate_hash(&self) -> String {
        compute_hash(self.index, self.timestamp, &self.data, &self.previous_hash)
    }

    /// True when the embedded hash matches the content
    pub fn has_consistent_hash(&self) -> bool {
        self.hash == self.calculate_hash()
    }

    pub fn get_index(&self) -> u64 {
        self.index
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_data(&self) -> &str {
        self.data.as_str()
    }

    pub fn get_previous_hash(&self) -> &str {
        self.previous_hash.as_str()
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }

    /// Short hash prefix for console and log output
    pub fn short_hash(&self) -> &str {
        // Peer-supplied hashes need not be ASCII
        match self.hash.char_indices().nth(10) {
            Some((end, _)) => &self.hash[..end],
            None => self.hash.as_str(),
        }
    }
}
