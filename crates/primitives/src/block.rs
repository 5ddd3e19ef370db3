use crate::ids::{BlockId, TxId};
use alloy_primitives::{Address, U256};

/// Header fields of a committed block, plus the derived fields the gateway
/// needs (transaction count, `obsolete`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub id: BlockId,
    pub parent_id: BlockId,
    pub timestamp: u64,
    pub gas_used: u64,
    pub gas_limit: u64,
    pub base_fee_per_gas: Option<u64>,
    pub txs_root: BlockId,
    pub state_root: BlockId,
    pub receipts_root: BlockId,
    pub total_score: u64,
    pub beneficiary: Address,
    /// Recovered from the header's signature. Absent only for the genesis
    /// block of chains that don't sign it.
    pub signer: Option<Address>,
    /// Committee/finality marker carried by the header (`COM` in the wire
    /// schema).
    pub com: bool,
    /// Feature bits describing which transaction extensions this block's
    /// transactions are allowed to use.
    pub txs_features: u32,
}

impl BlockHeader {
    pub fn number(&self) -> u32 {
        self.id.number()
    }
}

/// A committed block as surfaced to callers: header plus the ids of its
/// transactions, a wire size, and (when yielded by a live subscription) an
/// `obsolete` flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockSummary {
    pub header: BlockHeader,
    pub tx_ids: Vec<TxId>,
    pub size: u32,
}

impl BlockSummary {
    pub fn tx_count(&self) -> usize {
        self.tx_ids.len()
    }
}

/// A [`BlockSummary`] tagged with reorg provenance, the unit the block
/// reader (§4.7) and every subscription reader (§4.8) operate on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedBlock {
    pub summary: BlockSummary,
    /// `true` when this block was once canonical but has been superseded by
    /// a reorg; such blocks are surfaced so subscribers can retract them.
    pub obsolete: bool,
}

impl ExtendedBlock {
    pub fn canonical(summary: BlockSummary) -> Self {
        Self { summary, obsolete: false }
    }

    pub fn obsolete(summary: BlockSummary) -> Self {
        Self { summary, obsolete: true }
    }

    pub fn id(&self) -> BlockId {
        self.summary.header.id
    }

    pub fn number(&self) -> u32 {
        self.summary.header.number()
    }

    pub fn parent_id(&self) -> BlockId {
        self.summary.header.parent_id
    }
}

/// Base-fee-relevant projection of a block's accumulated proof-of-work
/// equivalent, consumed by the dynamic-fee effective-priority-fee rule in
/// §4.11. Legacy (pre-fork) blocks never populate this.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProvedWork(pub U256);
