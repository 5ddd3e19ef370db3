use crate::error::{ApiError, ApiResult};
use gateway_chain_api::ChainRepository;
use gateway_primitives::{BlockId, BlockSummary, Revision};
use std::str::FromStr;
use std::sync::Arc;

/// Default spacing between blocks, used to derive the synthetic `next`
/// revision's timestamp. Collaborators that know the real chain-config
/// value may override it via [`RevisionResolver::with_block_interval`].
const DEFAULT_BLOCK_INTERVAL_SECONDS: u64 = 10;

/// Resolves the opaque revision tokens from §4.1 (`best`, `finalized`,
/// `next`, a block number, or a block id) into a concrete [`BlockSummary`].
#[derive(Clone)]
pub struct RevisionResolver<C> {
    chain: Arc<C>,
    block_interval: u64,
}

impl<C: ChainRepository> RevisionResolver<C> {
    pub fn new(chain: Arc<C>) -> Self {
        Self { chain, block_interval: DEFAULT_BLOCK_INTERVAL_SECONDS }
    }

    pub fn with_block_interval(mut self, seconds: u64) -> Self {
        self.block_interval = seconds;
        self
    }

    pub fn parse(&self, token: &str) -> ApiResult<Revision> {
        Revision::from_str(token).map_err(|_| ApiError::invalid_input("invalid revision"))
    }

    /// Resolves a revision to a summary. `next` is synthesized and never
    /// persisted: its parent is the current best tip, its timestamp is
    /// `bestTimestamp + blockInterval`, and its state root is the parent's.
    pub fn resolve(&self, revision: Revision) -> ApiResult<BlockSummary> {
        match revision {
            Revision::Best => self.best(),
            Revision::Finalized => self.finalized(),
            Revision::Next => self.synthetic_next(),
            Revision::Number(number) => self
                .chain
                .block_by_number(number)
                .map_err(ApiError::from)?
                .ok_or_else(|| ApiError::not_found("block not found")),
            Revision::Id(id) => self
                .chain
                .block_by_id(id)
                .map_err(ApiError::from)?
                .ok_or_else(|| ApiError::not_found("block not found")),
        }
    }

    fn best(&self) -> ApiResult<BlockSummary> {
        Ok(self.chain.best_block())
    }

    fn finalized(&self) -> ApiResult<BlockSummary> {
        Ok(self.chain.finalized_block().unwrap_or_else(|| self.chain.genesis()))
    }

    fn synthetic_next(&self) -> ApiResult<BlockSummary> {
        let parent = self.chain.best_block();
        let mut header = parent.header.clone();
        header.parent_id = header.id;
        header.timestamp += self.block_interval;
        Ok(BlockSummary { header, tx_ids: Vec::new(), size: 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_chain_api::testing::InMemoryChain;
    use gateway_primitives::BlockHeader;

    fn header(number: u32, timestamp: u64) -> BlockHeader {
        BlockHeader {
            id: BlockId::from_number_and_bytes(number, &[number as u8; 28]),
            parent_id: BlockId::from_number_and_bytes(number.saturating_sub(1), &[0u8; 28]),
            timestamp,
            gas_used: 0,
            gas_limit: 10_000_000,
            base_fee_per_gas: None,
            txs_root: Default::default(),
            state_root: Default::default(),
            receipts_root: Default::default(),
            total_score: 0,
            beneficiary: Default::default(),
            signer: None,
            com: false,
            txs_features: 0,
        }
    }

    fn summary(number: u32, timestamp: u64) -> BlockSummary {
        BlockSummary { header: header(number, timestamp), tx_ids: Vec::new(), size: 0 }
    }

    #[test]
    fn resolves_best_and_synthetic_next() {
        let genesis = summary(0, 0);
        let chain = InMemoryChain::new(genesis);
        chain.push_canonical(summary(1, 10), vec![]);
        let resolver = RevisionResolver::new(Arc::new(chain)).with_block_interval(10);

        let best = resolver.resolve(Revision::Best).unwrap();
        assert_eq!(best.header.number(), 1);

        let next = resolver.resolve(Revision::Next).unwrap();
        assert_eq!(next.header.parent_id, best.header.id);
        assert_eq!(next.header.timestamp, best.header.timestamp + 10);
    }

    #[test]
    fn unknown_block_number_is_not_found() {
        let chain = InMemoryChain::new(summary(0, 0));
        let resolver = RevisionResolver::new(Arc::new(chain));
        let err = resolver.resolve(Revision::Number(99)).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn malformed_token_is_invalid_input() {
        let chain = InMemoryChain::new(summary(0, 0));
        let resolver = RevisionResolver::new(Arc::new(chain));
        assert!(resolver.parse("not-a-revision").is_err());
    }
}
