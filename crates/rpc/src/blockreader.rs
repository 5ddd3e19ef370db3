use gateway_chain_api::{ChainApiError, ChainRepository};
use gateway_primitives::{BlockId, ExtendedBlock};
use std::sync::Arc;

/// Caps the number of frames a single `read()` call returns, so a long
/// catch-up doesn't block the calling task indefinitely; callers loop while
/// `has_more` is `true`.
const DEFAULT_BATCH_SIZE: usize = 256;

/// Reorg-correct block iteration from a cursor to the current tip (§4.7).
/// The cursor is a block id that was canonical at some past point; each
/// `read()` call returns the next batch of [`ExtendedBlock`]s such that
/// advancing through the batches reconstructs the forward walk from the
/// initial cursor to the tip, with reorgs expressed as obsolete blocks
/// (walked backward from the old tip to the common ancestor) followed by
/// canonical blocks (walked forward from the ancestor to the new tip).
///
/// This is the only component that understands chain-index internals
/// (ancestor walks, canonical-membership checks); everything built on top
/// of it — the subscription readers in §4.8 — only sees an already-ordered
/// `(block, obsolete)` stream.
pub struct BlockReader<C> {
    chain: Arc<C>,
    cursor: BlockId,
    batch_size: usize,
}

impl<C: ChainRepository> BlockReader<C> {
    pub fn new(chain: Arc<C>, cursor: BlockId) -> Self {
        Self { chain, cursor, batch_size: DEFAULT_BATCH_SIZE }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn cursor(&self) -> BlockId {
        self.cursor
    }

    /// Returns the next batch and whether more progress is possible without
    /// waiting for a new best-block tick.
    pub fn read(&mut self) -> Result<(Vec<ExtendedBlock>, bool), ChainApiError> {
        let best = self.chain.best_block();
        if self.cursor == best.header.id {
            return Ok((Vec::new(), false));
        }

        let mut out = Vec::new();
        let ancestor_number = self.walk_to_ancestor(&mut out)?;

        let mut next_number = ancestor_number + 1;
        while next_number <= best.header.number() && out.len() < self.batch_size {
            if let Some(block) = self.chain.block_by_number(next_number)? {
                out.push(ExtendedBlock::canonical(block));
            }
            next_number += 1;
        }

        if let Some(last) = out.last() {
            self.cursor = last.id();
        }
        let has_more = self.cursor != best.header.id;
        Ok((out, has_more))
    }

    /// If the cursor is still canonical, this is a no-op that returns its
    /// own block number. Otherwise walks backward from the cursor emitting
    /// obsolete frames until reaching a block number whose canonical
    /// occupant matches the walked id — the common ancestor — and returns
    /// its number.
    fn walk_to_ancestor(&mut self, out: &mut Vec<ExtendedBlock>) -> Result<u32, ChainApiError> {
        let cursor_number = self.cursor.number();
        let canonical_here = self.chain.block_by_number(cursor_number)?;
        if canonical_here.as_ref().map(|b| b.header.id) == Some(self.cursor) {
            return Ok(cursor_number);
        }

        let mut walk_id = self.cursor;
        loop {
            let block = self.chain.block_by_id(walk_id)?.ok_or(ChainApiError::CursorOutOfRange)?;
            let parent_id = block.header.parent_id;
            out.push(ExtendedBlock::obsolete(block));

            let parent_number = parent_id.number();
            let parent_canonical = self.chain.block_by_number(parent_number)?;
            if parent_canonical.as_ref().map(|b| b.header.id) == Some(parent_id) {
                return Ok(parent_number);
            }
            walk_id = parent_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_chain_api::testing::InMemoryChain;
    use gateway_primitives::BlockHeader;

    fn header(number: u32, parent: BlockId, salt: u8) -> BlockHeader {
        BlockHeader {
            id: BlockId::from_number_and_bytes(number, &[salt; 28]),
            parent_id: parent,
            timestamp: number as u64 * 10,
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

    fn summary(number: u32, parent: BlockId, salt: u8) -> gateway_primitives::BlockSummary {
        gateway_primitives::BlockSummary { header: header(number, parent, salt), tx_ids: Vec::new(), size: 0 }
    }

    #[test]
    fn no_progress_when_cursor_is_tip() {
        let genesis = summary(0, BlockId::default(), 0);
        let chain = Arc::new(InMemoryChain::new(genesis.clone()));
        let mut reader = BlockReader::new(chain, genesis.header.id);
        let (batch, has_more) = reader.read().unwrap();
        assert!(batch.is_empty());
        assert!(!has_more);
    }

    #[test]
    fn walks_forward_through_canonical_chain() {
        let genesis = summary(0, BlockId::default(), 0);
        let chain = Arc::new(InMemoryChain::new(genesis.clone()));
        let b1 = summary(1, genesis.header.id, 1);
        let b2 = summary(2, b1.header.id, 2);
        chain.push_canonical(b1.clone(), vec![]);
        chain.push_canonical(b2.clone(), vec![]);

        let mut reader = BlockReader::new(chain, genesis.header.id);
        let (batch, has_more) = reader.read().unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|b| !b.obsolete));
        assert_eq!(batch[0].id(), b1.header.id);
        assert_eq!(batch[1].id(), b2.header.id);
        assert!(!has_more);
    }

    #[test]
    fn reorg_emits_obsolete_before_canonical() {
        let genesis = summary(0, BlockId::default(), 0);
        let chain = Arc::new(InMemoryChain::new(genesis.clone()));
        let old1 = summary(1, genesis.header.id, 0xA1);
        let old2 = summary(2, old1.header.id, 0xA2);
        chain.push_canonical(old1.clone(), vec![]);
        chain.push_canonical(old2.clone(), vec![]);

        // Cursor sits at the old tip before the reorg.
        let mut reader = BlockReader::new(Arc::clone(&chain), old2.header.id);

        let new1 = summary(1, genesis.header.id, 0xB1);
        let new2 = summary(2, new1.header.id, 0xB2);
        let new3 = summary(3, new2.header.id, 0xB3);
        chain.reorg(1, vec![new1.clone(), new2.clone(), new3.clone()]);

        let (batch, has_more) = reader.read().unwrap();
        assert_eq!(batch.len(), 5);
        assert!(batch[0].obsolete && batch[0].id() == old2.header.id);
        assert!(batch[1].obsolete && batch[1].id() == old1.header.id);
        assert!(!batch[2].obsolete && batch[2].id() == new1.header.id);
        assert!(!batch[3].obsolete && batch[3].id() == new2.header.id);
        assert!(!batch[4].obsolete && batch[4].id() == new3.header.id);
        assert!(!has_more);
    }

    #[test]
    fn batch_size_caps_a_single_read() {
        let genesis = summary(0, BlockId::default(), 0);
        let chain = Arc::new(InMemoryChain::new(genesis.clone()));
        let mut parent = genesis.header.id;
        for n in 1..=5u32 {
            let block = summary(n, parent, n as u8);
            parent = block.header.id;
            chain.push_canonical(block, vec![]);
        }

        let mut reader = BlockReader::new(Arc::clone(&chain), genesis.header.id).with_batch_size(2);
        let (first, has_more) = reader.read().unwrap();
        assert_eq!(first.len(), 2);
        assert!(has_more);
        let (second, has_more) = reader.read().unwrap();
        assert_eq!(second.len(), 2);
        assert!(has_more);
        let (third, has_more) = reader.read().unwrap();
        assert_eq!(third.len(), 1);
        assert!(!has_more);
    }
}
