//! Subscription readers (§4.8): one per subject, wrapping the reorg-correct
//! [`BlockReader`] and deriving the subject-specific message for each
//! yielded [`ExtendedBlock`]. Every reader exposes a uniform
//! `read() -> (messages, has_more)` shape so the hub (built in
//! `gateway-rpc-builder`) can be generic over the subject.

use crate::bloom::{self, BloomBuilder, ADDRESS_LENGTH};
use crate::cache::MessageCache;
use crate::error::{ApiError, ApiResult};
use crate::blockreader::BlockReader;
use alloy_primitives::{Address, Bytes, B256, U256};
use gateway_chain_api::{ChainRepository, EventCriterion, TransferCriterion};
use gateway_primitives::{BlockId, ExtendedBlock, LogMeta, TxId};
use std::sync::Arc;

/// Legacy 2048-bit bloom, matching [`gateway_primitives::logs_bloom`]'s
/// fixed size but with a variable, estimated `k` (§4.8 "beat").
const LEGACY_BLOOM_BITS: usize = 2048;

/// `/subscriptions/block` message (§6.3 `BlockMessage`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockMessage {
    pub number: u32,
    pub id: BlockId,
    pub parent_id: BlockId,
    pub timestamp: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub total_score: u64,
    pub beneficiary: Address,
    pub signer: Address,
    pub txs_root: BlockId,
    pub txs_features: u32,
    pub state_root: BlockId,
    pub receipts_root: BlockId,
    pub com: bool,
    pub transactions: Vec<TxId>,
    pub size: u32,
    pub obsolete: bool,
}

/// `/subscriptions/event` message (§6.3 `EventMessage`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventMessage {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub meta: LogMeta,
    pub obsolete: bool,
}

/// `/subscriptions/transfer` message (§6.3 `TransferMessage`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferMessage {
    pub sender: Address,
    pub recipient: Address,
    pub amount: U256,
    pub meta: LogMeta,
    pub obsolete: bool,
}

/// `/subscriptions/beat` message (§6.3 `BeatMessage`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeatMessage {
    pub number: u32,
    pub id: BlockId,
    pub parent_id: BlockId,
    pub timestamp: u64,
    pub txs_features: u32,
    pub bloom: Vec<u8>,
    pub k: u32,
    pub obsolete: bool,
}

/// `/subscriptions/beat2` message: adds `gas_limit` over [`BeatMessage`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Beat2Message {
    pub number: u32,
    pub id: BlockId,
    pub parent_id: BlockId,
    pub timestamp: u64,
    pub txs_features: u32,
    pub gas_limit: u64,
    pub bloom: Vec<u8>,
    pub k: u32,
    pub obsolete: bool,
}

/// Builds the LogMeta for a matched log (§3 invariants): subscriptions
/// never populate `tx_index`/`log_index` — those are only emitted by the
/// paginated filter API when `includeIndexes` was requested (§6.3).
fn subscription_meta(block: &ExtendedBlock, tx_id: TxId, tx_origin: Address, clause_index: u32) -> LogMeta {
    LogMeta {
        block_id: block.id(),
        block_number: block.number(),
        block_timestamp: block.summary.header.timestamp,
        tx_id,
        tx_origin,
        clause_index: clause_index as u32,
        tx_index: None,
        log_index: None,
    }
}

/// `/subscriptions/block` reader.
pub struct BlockSubscription<C> {
    reader: BlockReader<C>,
}

impl<C: ChainRepository> BlockSubscription<C> {
    pub fn new(reader: BlockReader<C>) -> Self {
        Self { reader }
    }

    pub fn cursor(&self) -> BlockId {
        self.reader.cursor()
    }

    /// §4.8 "block": signer recovery failure fails the whole subscription,
    /// since the reader has no way to retract a partially-emitted batch.
    pub fn read(&mut self) -> ApiResult<(Vec<BlockMessage>, bool)> {
        let (batch, has_more) = self.reader.read()?;
        let mut out = Vec::with_capacity(batch.len());
        for block in batch {
            let header = &block.summary.header;
            let signer = header
                .signer
                .ok_or_else(|| ApiError::Collaborator("block header signer recovery failed".to_string()))?;
            out.push(BlockMessage {
                number: header.number(),
                id: header.id,
                parent_id: header.parent_id,
                timestamp: header.timestamp,
                gas_limit: header.gas_limit,
                gas_used: header.gas_used,
                total_score: header.total_score,
                beneficiary: header.beneficiary,
                signer,
                txs_root: header.txs_root,
                txs_features: header.txs_features,
                state_root: header.state_root,
                receipts_root: header.receipts_root,
                com: header.com,
                transactions: block.summary.tx_ids.clone(),
                size: block.summary.size,
                obsolete: block.obsolete,
            });
        }
        Ok((out, has_more))
    }
}

/// Resolves `tx_id`'s origin via the chain repository, defaulting to the
/// zero address if the transaction can't be found (should not happen for a
/// committed block, but subscriptions never fail on a missing-origin edge
/// case the way they do on a missing block signer).
fn tx_origin<C: ChainRepository>(chain: &C, tx_id: TxId) -> Address {
    chain.transaction(tx_id).ok().flatten().and_then(|loc| loc.tx.origin).unwrap_or_default()
}

fn event_matches(criterion: &EventCriterion, address: Address, topics: &[B256]) -> bool {
    if let Some(want) = criterion.address {
        if address != want {
            return false;
        }
    }
    criterion.topics.iter().enumerate().all(|(i, want)| match want {
        Some(topic) => topics.get(i) == Some(topic),
        None => true,
    })
}

/// `/subscriptions/event` reader.
pub struct EventSubscription<C> {
    reader: BlockReader<C>,
    chain: Arc<C>,
    criterion: EventCriterion,
}

impl<C: ChainRepository> EventSubscription<C> {
    pub fn new(reader: BlockReader<C>, chain: Arc<C>, criterion: EventCriterion) -> Self {
        Self { reader, chain, criterion }
    }

    pub fn cursor(&self) -> BlockId {
        self.reader.cursor()
    }

    pub fn read(&mut self) -> ApiResult<(Vec<EventMessage>, bool)> {
        let (batch, has_more) = self.reader.read()?;
        let mut out = Vec::new();
        for block in &batch {
            let receipts = self.chain.receipts(block.id())?.unwrap_or_default();
            for (tx_index, tx_id) in block.summary.tx_ids.iter().enumerate() {
                let Some(receipt) = receipts.get(tx_index) else { continue };
                let origin = tx_origin(self.chain.as_ref(), *tx_id);
                for (clause_index, output) in receipt.outputs.iter().enumerate() {
                    for event in &output.events {
                        if !event_matches(&self.criterion, event.address, &event.topics) {
                            continue;
                        }
                        out.push(EventMessage {
                            address: event.address,
                            topics: event.topics.clone(),
                            data: event.data.clone(),
                            meta: subscription_meta(block, *tx_id, origin, clause_index as u32),
                            obsolete: block.obsolete,
                        });
                    }
                }
            }
        }
        Ok((out, has_more))
    }
}

/// `/subscriptions/transfer` reader.
pub struct TransferSubscription<C> {
    reader: BlockReader<C>,
    chain: Arc<C>,
    criterion: TransferCriterion,
}

impl<C: ChainRepository> TransferSubscription<C> {
    pub fn new(reader: BlockReader<C>, chain: Arc<C>, criterion: TransferCriterion) -> Self {
        Self { reader, chain, criterion }
    }

    pub fn cursor(&self) -> BlockId {
        self.reader.cursor()
    }

    pub fn read(&mut self) -> ApiResult<(Vec<TransferMessage>, bool)> {
        let (batch, has_more) = self.reader.read()?;
        let mut out = Vec::new();
        for block in &batch {
            let receipts = self.chain.receipts(block.id())?.unwrap_or_default();
            for (tx_index, tx_id) in block.summary.tx_ids.iter().enumerate() {
                let Some(receipt) = receipts.get(tx_index) else { continue };
                let origin = tx_origin(self.chain.as_ref(), *tx_id);
                for (clause_index, output) in receipt.outputs.iter().enumerate() {
                    for transfer in &output.transfers {
                        if let Some(want) = self.criterion.tx_origin {
                            if origin != want {
                                continue;
                            }
                        }
                        if let Some(want) = self.criterion.sender {
                            if transfer.sender != want {
                                continue;
                            }
                        }
                        if let Some(want) = self.criterion.recipient {
                            if transfer.recipient != want {
                                continue;
                            }
                        }
                        out.push(TransferMessage {
                            sender: transfer.sender,
                            recipient: transfer.recipient,
                            amount: transfer.amount,
                            meta: subscription_meta(block, *tx_id, origin, clause_index as u32),
                            obsolete: block.obsolete,
                        });
                    }
                }
            }
        }
        Ok((out, has_more))
    }
}

/// Folds a block's receipts and header into the byte values the beat
/// bloom filters index: gas payer, event address, event topics, transfer
/// sender/recipient, tx origin, header signer, beneficiary (§4.8, §9).
fn fold_beat_values<C: ChainRepository>(chain: &C, block: &ExtendedBlock, mut push: impl FnMut(&[u8])) {
    let header = &block.summary.header;
    push(header.beneficiary.as_slice());
    if let Some(signer) = header.signer {
        push(signer.as_slice());
    }
    let Ok(Some(receipts)) = chain.receipts(block.id()) else { return };
    for (tx_index, tx_id) in block.summary.tx_ids.iter().enumerate() {
        let Some(receipt) = receipts.get(tx_index) else { continue };
        push(receipt.gas_payer.as_slice());
        let origin = tx_origin(chain, *tx_id);
        push(origin.as_slice());
        for output in &receipt.outputs {
            for event in &output.events {
                push(event.address.as_slice());
                for topic in &event.topics {
                    push(topic.as_slice());
                }
            }
            for transfer in &output.transfers {
                push(transfer.sender.as_slice());
                push(transfer.recipient.as_slice());
            }
        }
    }
}

/// `/subscriptions/beat` reader: legacy 2048-bit bloom with an estimated
/// `k`, deduped across subscribers via the shared [`MessageCache`].
pub struct BeatSubscription<C> {
    reader: BlockReader<C>,
    chain: Arc<C>,
    cache: Arc<MessageCache<BeatMessage>>,
}

impl<C: ChainRepository> BeatSubscription<C> {
    pub fn new(reader: BlockReader<C>, chain: Arc<C>, cache: Arc<MessageCache<BeatMessage>>) -> Self {
        Self { reader, chain, cache }
    }

    pub fn cursor(&self) -> BlockId {
        self.reader.cursor()
    }

    pub async fn read(&mut self) -> ApiResult<(Vec<BeatMessage>, bool)> {
        let (batch, has_more) = self.reader.read()?;
        let mut out = Vec::with_capacity(batch.len());
        for block in batch {
            let chain = Arc::clone(&self.chain);
            let obsolete = block.obsolete;
            let id = block.id();
            let msg = self
                .cache
                .get_or_add(id, || async move {
                    let mut builder = BloomBuilder::new(usize::MAX);
                    fold_beat_values(chain.as_ref(), &block, |v| builder.add(v));
                    let k = bloom::legacy_estimate_k(builder.len(), LEGACY_BLOOM_BITS);
                    let bits = builder.build_fixed(LEGACY_BLOOM_BITS, k);
                    let header = &block.summary.header;
                    BeatMessage {
                        number: header.number(),
                        id: header.id,
                        parent_id: header.parent_id,
                        timestamp: header.timestamp,
                        txs_features: header.txs_features,
                        bloom: bits,
                        k,
                        obsolete,
                    }
                })
                .await;
            out.push(msg);
        }
        Ok((out, has_more))
    }
}

/// `/subscriptions/beat2` reader: newer generator, `bits_per_key = 20`,
/// entries restricted to [`ADDRESS_LENGTH`] significant bytes (§4.8).
pub struct Beat2Subscription<C> {
    reader: BlockReader<C>,
    chain: Arc<C>,
    cache: Arc<MessageCache<Beat2Message>>,
}

const BEAT2_BITS_PER_KEY: u32 = 20;

impl<C: ChainRepository> Beat2Subscription<C> {
    pub fn new(reader: BlockReader<C>, chain: Arc<C>, cache: Arc<MessageCache<Beat2Message>>) -> Self {
        Self { reader, chain, cache }
    }

    pub fn cursor(&self) -> BlockId {
        self.reader.cursor()
    }

    pub async fn read(&mut self) -> ApiResult<(Vec<Beat2Message>, bool)> {
        let (batch, has_more) = self.reader.read()?;
        let mut out = Vec::with_capacity(batch.len());
        for block in batch {
            let chain = Arc::clone(&self.chain);
            let obsolete = block.obsolete;
            let id = block.id();
            let msg = self
                .cache
                .get_or_add(id, || async move {
                    let mut builder = BloomBuilder::new(ADDRESS_LENGTH);
                    fold_beat_values(chain.as_ref(), &block, |v| builder.add(v));
                    let (bits, k) = builder.build_scaled(BEAT2_BITS_PER_KEY);
                    let header = &block.summary.header;
                    Beat2Message {
                        number: header.number(),
                        id: header.id,
                        parent_id: header.parent_id,
                        timestamp: header.timestamp,
                        txs_features: header.txs_features,
                        gas_limit: header.gas_limit,
                        bloom: bits,
                        k,
                        obsolete,
                    }
                })
                .await;
            out.push(msg);
        }
        Ok((out, has_more))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_chain_api::testing::InMemoryChain;
    use gateway_primitives::{BlockHeader, BlockSummary, Output, Receipt, Transfer};

    fn header(number: u32, parent: BlockId, signer: Address) -> BlockHeader {
        BlockHeader {
            id: BlockId::from_number_and_bytes(number, &[number as u8; 28]),
            parent_id: parent,
            timestamp: number as u64 * 10,
            gas_used: 0,
            gas_limit: 10_000_000,
            base_fee_per_gas: None,
            txs_root: Default::default(),
            state_root: Default::default(),
            receipts_root: Default::default(),
            total_score: 0,
            beneficiary: Address::repeat_byte(9),
            signer: Some(signer),
            com: false,
            txs_features: 0,
        }
    }

    #[test]
    fn block_subscription_fails_when_signer_missing() {
        let mut genesis_header = header(0, BlockId::default(), Address::ZERO);
        genesis_header.signer = None;
        let genesis = BlockSummary { header: genesis_header, tx_ids: vec![], size: 0 };
        let chain = Arc::new(InMemoryChain::new(genesis.clone()));
        let mut b1_header = header(1, genesis.header.id, Address::ZERO);
        b1_header.signer = None;
        let b1 = BlockSummary { header: b1_header, tx_ids: vec![], size: 0 };
        chain.push_canonical(b1.clone(), vec![]);

        let reader = BlockReader::new(Arc::clone(&chain), genesis.header.id);
        let mut sub = BlockSubscription::new(reader);
        let err = sub.read().unwrap_err();
        assert!(matches!(err, ApiError::Collaborator(_)));
    }

    #[test]
    fn block_subscription_emits_recovered_signer() {
        let genesis = BlockSummary { header: header(0, BlockId::default(), Address::repeat_byte(1)), tx_ids: vec![], size: 0 };
        let chain = Arc::new(InMemoryChain::new(genesis.clone()));
        let b1 = BlockSummary { header: header(1, genesis.header.id, Address::repeat_byte(2)), tx_ids: vec![], size: 7 };
        chain.push_canonical(b1.clone(), vec![]);

        let reader = BlockReader::new(Arc::clone(&chain), genesis.header.id);
        let mut sub = BlockSubscription::new(reader);
        let (batch, has_more) = sub.read().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].signer, Address::repeat_byte(2));
        assert_eq!(batch[0].size, 7);
        assert!(!has_more);
    }

    #[test]
    fn event_subscription_matches_address_and_topics() {
        let genesis = BlockSummary { header: header(0, BlockId::default(), Address::ZERO), tx_ids: vec![], size: 0 };
        let chain = Arc::new(InMemoryChain::new(genesis.clone()));

        let tx_id = TxId::repeat_byte(0xAA);
        let matching_addr = Address::repeat_byte(5);
        let log = gateway_primitives::Log {
            address: matching_addr,
            topics: vec![B256::repeat_byte(1)],
            data: Bytes::new(),
        };
        let receipt = Receipt {
            gas_used: 0,
            gas_payer: Address::ZERO,
            paid: U256::ZERO,
            reward: U256::ZERO,
            reverted: false,
            outputs: vec![Output { contract_address: None, events: vec![log], transfers: vec![] }],
        };
        let b1 = BlockSummary { header: header(1, genesis.header.id, Address::ZERO), tx_ids: vec![tx_id], size: 0 };
        chain.push_canonical(b1.clone(), vec![receipt]);

        let mut criterion = EventCriterion::default();
        criterion.address = Some(matching_addr);
        let reader = BlockReader::new(Arc::clone(&chain), genesis.header.id);
        let mut sub = EventSubscription::new(reader, Arc::clone(&chain), criterion);
        let (batch, _) = sub.read().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].address, matching_addr);
        assert!(!batch[0].obsolete);
    }

    #[test]
    fn transfer_subscription_matches_recipient() {
        let genesis = BlockSummary { header: header(0, BlockId::default(), Address::ZERO), tx_ids: vec![], size: 0 };
        let chain = Arc::new(InMemoryChain::new(genesis.clone()));

        let tx_id = TxId::repeat_byte(0xBB);
        let recipient = Address::repeat_byte(6);
        let transfer = Transfer { sender: Address::repeat_byte(7), recipient, amount: U256::from(42u64) };
        let receipt = Receipt {
            gas_used: 0,
            gas_payer: Address::ZERO,
            paid: U256::ZERO,
            reward: U256::ZERO,
            reverted: false,
            outputs: vec![Output { contract_address: None, events: vec![], transfers: vec![transfer] }],
        };
        let b1 = BlockSummary { header: header(1, genesis.header.id, Address::ZERO), tx_ids: vec![tx_id], size: 0 };
        chain.push_canonical(b1.clone(), vec![receipt]);

        let criterion = TransferCriterion { tx_origin: None, sender: None, recipient: Some(recipient) };
        let reader = BlockReader::new(Arc::clone(&chain), genesis.header.id);
        let mut sub = TransferSubscription::new(reader, Arc::clone(&chain), criterion);
        let (batch, _) = sub.read().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].amount, U256::from(42u64));
    }

    #[tokio::test]
    async fn beat_subscription_emits_one_message_per_block() {
        let genesis = BlockSummary { header: header(0, BlockId::default(), Address::ZERO), tx_ids: vec![], size: 0 };
        let chain = Arc::new(InMemoryChain::new(genesis.clone()));
        let b1 = BlockSummary { header: header(1, genesis.header.id, Address::repeat_byte(3)), tx_ids: vec![], size: 0 };
        chain.push_canonical(b1, vec![]);

        let cache = Arc::new(MessageCache::new(10));
        let reader = BlockReader::new(Arc::clone(&chain), genesis.header.id);
        let mut sub = BeatSubscription::new(reader, Arc::clone(&chain), cache);
        let (batch, _) = sub.read().await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].bloom.len(), LEGACY_BLOOM_BITS / 8);
    }

    #[tokio::test]
    async fn beat2_subscription_includes_gas_limit() {
        let genesis = BlockSummary { header: header(0, BlockId::default(), Address::ZERO), tx_ids: vec![], size: 0 };
        let chain = Arc::new(InMemoryChain::new(genesis.clone()));
        let b1 = BlockSummary { header: header(1, genesis.header.id, Address::repeat_byte(4)), tx_ids: vec![], size: 0 };
        chain.push_canonical(b1, vec![]);

        let cache = Arc::new(MessageCache::new(10));
        let reader = BlockReader::new(Arc::clone(&chain), genesis.header.id);
        let mut sub = Beat2Subscription::new(reader, Arc::clone(&chain), cache);
        let (batch, _) = sub.read().await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].gas_limit, 10_000_000);
    }
}
