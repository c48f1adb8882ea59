// The local, authoritative history of one node.
// A chain is only ever grown by one block at a time or swapped wholesale for a
// longer valid candidate. It always holds at least the genesis block.

use crate::core::Block;
use crate::error::{LedgerError, Result};
use crate::utils::current_timestamp;
use log::debug;

/// The single validation predicate used for local appends, inbound blocks
/// and every link of a candidate chain.
pub fn is_valid_successor(candidate: &Block, predecessor: &Block) -> bool {
    predecessor.get_index().checked_add(1) == Some(candidate.get_index())
        && predecessor.get_hash() == candidate.get_previous_hash()
        && candidate.has_consistent_hash()
}

// Explains why `is_valid_successor` said no, for logs and error values
fn successor_rejection(candidate: &Block, predecessor: &Block) -> String {
    if predecessor.get_index().checked_add(1) != Some(candidate.get_index()) {
        format!(
            "index {} does not follow {}",
            candidate.get_index(),
            predecessor.get_index()
        )
    } else if predecessor.get_hash() != candidate.get_previous_hash() {
        format!(
            "previous_hash {} does not match tip {}",
            candidate.get_previous_hash(),
            predecessor.get_hash()
        )
    } else {
        format!("hash {} does not match block content", candidate.get_hash())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    /// A fresh chain holding only the genesis block
    pub fn new() -> Chain {
        Chain {
            blocks: vec![Block::genesis()],
        }
    }

    pub fn genesis(&self) -> &Block {
        self.blocks
            .first()
            .expect("Chain always holds the genesis block - this should never happen")
    }

    pub fn tip(&self) -> &Block {
        self.blocks
            .last()
            .expect("Chain always holds the genesis block - this should never happen")
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    // Never true; kept alongside len() for clippy
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        self.blocks.as_slice()
    }

    /// Build a block over the tip with the current time and append it
    pub fn append_local(&mut self, data: &str) -> Result<Block> {
        let timestamp = current_timestamp()?;
        self.append_local_at(data, timestamp)
    }

    /// Same as [`Chain::append_local`] with a caller-supplied timestamp
    pub fn append_local_at(&mut self, data: &str, timestamp: i64) -> Result<Block> {
        let tip = self.tip();
        let block = Block::new_block(
            tip.get_index() + 1,
            timestamp,
            data.to_string(),
            tip.get_hash().to_string(),
        );

        if !is_valid_successor(&block, tip) {
            return Err(LedgerError::InvalidBlock(successor_rejection(&block, tip)));
        }

        self.blocks.push(block.clone());
        Ok(block)
    }

    /// Append a peer's block if it extends the current tip.
    /// Returns false and leaves the chain untouched otherwise.
    pub fn append_remote(&mut self, candidate: Block) -> bool {
        if !is_valid_successor(&candidate, self.tip()) {
            debug!(
                "Rejected block {}: {}",
                candidate.get_index(),
                successor_rejection(&candidate, self.tip())
            );
            return false;
        }
        self.blocks.push(candidate);
        true
    }

    /// Like [`Chain::append_remote`] but reports the reason for a rejection
    pub fn try_append_remote(&mut self, candidate: Block) -> Result<()> {
        if !is_valid_successor(&candidate, self.tip()) {
            return Err(LedgerError::InvalidBlock(successor_rejection(
                &candidate,
                self.tip(),
            )));
        }
        self.blocks.push(candidate);
        Ok(())
    }

    /// Re-validate a whole candidate chain without trusting its sender
    pub fn is_valid_chain(&self, candidate: &[Block]) -> bool {
        self.check_chain(candidate).is_ok()
    }

    fn check_chain(&self, candidate: &[Block]) -> Result<()> {
        let first = candidate
            .first()
            .ok_or_else(|| LedgerError::InvalidChain("candidate chain is empty".to_string()))?;

        if first != self.genesis() {
            return Err(LedgerError::InvalidChain(format!(
                "genesis {} differs from local genesis {}",
                first.get_hash(),
                self.genesis().get_hash()
            )));
        }

        for pair in candidate.windows(2) {
            if !is_valid_successor(&pair[1], &pair[0]) {
                return Err(LedgerError::InvalidChain(format!(
                    "block {}: {}",
                    pair[1].get_index(),
                    successor_rejection(&pair[1], &pair[0])
                )));
            }
        }
        Ok(())
    }

    /// Adopt `candidate` iff it is strictly longer and valid.
    ///
    /// Ties are never adopted, even when the candidate differs. There is no
    /// work or time based tie-break: a longer valid chain always wins.
    pub fn replace_if_better(&mut self, candidate: Vec<Block>) -> bool {
        self.try_replace(candidate).is_ok()
    }

    /// Like [`Chain::replace_if_better`] but reports the reason for a rejection
    pub fn try_replace(&mut self, candidate: Vec<Block>) -> Result<()> {
        if candidate.len() <= self.blocks.len() {
            return Err(LedgerError::InvalidChain(format!(
                "candidate length {} is not longer than local length {}",
                candidate.len(),
                self.blocks.len()
            )));
        }
        self.check_chain(&candidate)?;
        self.blocks = candidate;
        Ok(())
    }
}
