use crate::error::ChainApiError;
use gateway_primitives::{BlockId, BlockSummary, Receipt, Transaction, TxId};

/// Where a transaction lives, as reported by the chain repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionLocation {
    pub tx: Transaction,
    pub block_id: BlockId,
    pub block_number: u32,
}

/// The subset of the chain repository this gateway consumes (§1): committed
/// blocks, receipts, and a "new best block" ticker. Ancestor/ownership
/// bookkeeping for reorg-correct iteration (§4.7, §9) lives in
/// `gateway-rpc`'s block reader, built on top of these primitives.
pub trait ChainRepository: Send + Sync {
    fn genesis(&self) -> BlockSummary;

    /// Current canonical tip.
    fn best_block(&self) -> BlockSummary;

    /// The most recent BFT-committed block, or `None` if the chain has not
    /// finalized one yet (callers fall back to `genesis()`, §4.1).
    fn finalized_block(&self) -> Option<BlockSummary>;

    fn block_by_number(&self, number: u32) -> Result<Option<BlockSummary>, ChainApiError>;

    fn block_by_id(&self, id: BlockId) -> Result<Option<BlockSummary>, ChainApiError>;

    fn receipts(&self, block_id: BlockId) -> Result<Option<Vec<Receipt>>, ChainApiError>;

    fn transaction(&self, tx_id: TxId) -> Result<Option<TransactionLocation>, ChainApiError>;

    /// A channel that reports the id of the current best block; fires once
    /// per new best block, carrying only the latest value (lagging readers
    /// observe the newest tip rather than a backlog of intermediate ones).
    fn best_block_ticker(&self) -> tokio::sync::watch::Receiver<BlockId>;
}
