use crate::core::{Block, Chain};
use crate::error::Result;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe handle to a node's chain.
///
/// Every read and write goes through one lock around the whole [`Chain`], so
/// a wholesale replacement is seen as atomic by concurrent readers and two
/// racing appends are serialised against the same tip.
#[derive(Clone, Default)]
pub struct SharedChain {
    inner: Arc<RwLock<Chain>>,
}

impl SharedChain {
    pub fn new() -> SharedChain {
        SharedChain {
            inner: Arc::new(RwLock::new(Chain::new())),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Chain> {
        self.inner
            .read()
            .expect("Failed to acquire read lock on chain - this should never happen")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Chain> {
        self.inner
            .write()
            .expect("Failed to acquire write lock on chain - this should never happen")
    }

    pub fn tip(&self) -> Block {
        self.read().tip().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Consistent copy of every block, genesis first
    pub fn blocks(&self) -> Vec<Block> {
        self.read().blocks().to_vec()
    }

    pub fn is_valid_chain(&self, candidate: &[Block]) -> bool {
        self.read().is_valid_chain(candidate)
    }

    pub fn append_local(&self, data: &str) -> Result<Block> {
        self.write().append_local(data)
    }

    pub fn append_remote(&self, candidate: Block) -> Result<()> {
        self.write().try_append_remote(candidate)
    }

    /// Length check, validation and swap all happen under one write lock
    pub fn replace_if_better(&self, candidate: Vec<Block>) -> Result<()> {
        self.write().try_replace(candidate)
    }
}
