//! In-memory test doubles for every collaborator trait in this crate.
//!
//! These never touch disk or network; they exist so the rest of the
//! workspace can exercise real business logic (revision resolution, reorg
//! walks, log filtering, fee history) against a fully-controlled chain
//! without a real chain repository, state trie or log db.

use crate::{
    chain::{ChainRepository, TransactionLocation},
    error::ChainApiError,
    executor::{CallClause, ClauseResult, Executor},
    fork::ForkConfig,
    logdb::{BlockRange, EventCriterion, LogDb, Order, TransferCriterion},
    peers::{PeerInfo, PeerStats},
    state::{AccountState, StateReader},
    txpool::{AcceptedTx, TxPool},
};
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use gateway_primitives::{BlockId, BlockSummary, EventLogEntry, Receipt, TransferLogEntry, TxId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct Inner {
    genesis: Option<BlockSummary>,
    /// Canonical chain, index == block number.
    canonical: Vec<BlockSummary>,
    /// Every block ever seen, canonical or not — lets an obsolete-chain
    /// walk follow parent pointers past the current canonical tip.
    by_id: HashMap<gateway_primitives::BlockId, BlockSummary>,
    receipts: HashMap<gateway_primitives::BlockId, Vec<Receipt>>,
    transactions: HashMap<TxId, TransactionLocation>,
    finalized: Option<BlockSummary>,
}

/// An in-memory stand-in for the chain repository.
#[derive(Clone)]
pub struct InMemoryChain {
    inner: Arc<RwLock<Inner>>,
    ticker: tokio::sync::watch::Sender<gateway_primitives::BlockId>,
}

impl InMemoryChain {
    pub fn new(genesis: BlockSummary) -> Self {
        let id = genesis.header.id;
        let mut inner = Inner::default();
        inner.by_id.insert(id, genesis.clone());
        inner.canonical.push(genesis.clone());
        inner.genesis = Some(genesis);
        let (tx, _rx) = tokio::sync::watch::channel(id);
        Self { inner: Arc::new(RwLock::new(inner)), ticker: tx }
    }

    /// Appends `block` as the new canonical tip and notifies the ticker.
    pub fn push_canonical(&self, block: BlockSummary, receipts: Vec<Receipt>) {
        let id = block.header.id;
        let mut inner = self.inner.write();
        inner.by_id.insert(id, block.clone());
        inner.receipts.insert(id, receipts);
        inner.canonical.push(block);
        drop(inner);
        let _ = self.ticker.send(id);
    }

    /// Replaces the canonical tail from `from_number` onward with
    /// `new_blocks`, leaving the old tail addressable via `by_id` so an
    /// obsolete-chain walk can still find it. Models a reorg.
    pub fn reorg(&self, from_number: u32, new_blocks: Vec<BlockSummary>) {
        let mut inner = self.inner.write();
        inner.canonical.truncate(from_number as usize);
        for block in &new_blocks {
            inner.by_id.insert(block.header.id, block.clone());
        }
        inner.canonical.extend(new_blocks);
        let new_tip = inner.canonical.last().unwrap().header.id;
        drop(inner);
        let _ = self.ticker.send(new_tip);
    }

    pub fn set_finalized(&self, block: BlockSummary) {
        self.inner.write().finalized = Some(block);
    }

    pub fn register_transaction(&self, loc: TransactionLocation) {
        self.inner.write().transactions.insert(loc.tx.id, loc);
    }

    pub fn best_number(&self) -> u32 {
        self.inner.read().canonical.last().expect("genesis always present").header.number()
    }
}

impl ChainRepository for InMemoryChain {
    fn genesis(&self) -> BlockSummary {
        self.inner.read().genesis.clone().expect("genesis set at construction")
    }

    fn best_block(&self) -> BlockSummary {
        self.inner.read().canonical.last().expect("genesis always present").clone()
    }

    fn finalized_block(&self) -> Option<BlockSummary> {
        self.inner.read().finalized.clone()
    }

    fn block_by_number(&self, number: u32) -> Result<Option<BlockSummary>, ChainApiError> {
        Ok(self.inner.read().canonical.get(number as usize).cloned())
    }

    fn block_by_id(&self, id: gateway_primitives::BlockId) -> Result<Option<BlockSummary>, ChainApiError> {
        Ok(self.inner.read().by_id.get(&id).cloned())
    }

    fn receipts(&self, block_id: gateway_primitives::BlockId) -> Result<Option<Vec<Receipt>>, ChainApiError> {
        Ok(self.inner.read().receipts.get(&block_id).cloned())
    }

    fn transaction(&self, tx_id: TxId) -> Result<Option<TransactionLocation>, ChainApiError> {
        Ok(self.inner.read().transactions.get(&tx_id).cloned())
    }

    fn best_block_ticker(&self) -> tokio::sync::watch::Receiver<gateway_primitives::BlockId> {
        self.ticker.subscribe()
    }
}

/// An in-memory stand-in for the state trie / stater.
#[derive(Clone, Default)]
pub struct InMemoryState {
    accounts: Arc<RwLock<HashMap<(gateway_primitives::BlockId, Address), AccountState>>>,
    code: Arc<RwLock<HashMap<(gateway_primitives::BlockId, Address), Bytes>>>,
    storage: Arc<RwLock<HashMap<(gateway_primitives::BlockId, Address, B256), B256>>>,
    base_gas_price: Arc<RwLock<HashMap<gateway_primitives::BlockId, U256>>>,
}

impl InMemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_account(&self, state_root: gateway_primitives::BlockId, address: Address, account: AccountState) {
        self.accounts.write().insert((state_root, address), account);
    }

    pub fn set_code(&self, state_root: gateway_primitives::BlockId, address: Address, code: Bytes) {
        self.code.write().insert((state_root, address), code);
    }

    pub fn set_storage(&self, state_root: gateway_primitives::BlockId, address: Address, key: B256, value: B256) {
        self.storage.write().insert((state_root, address, key), value);
    }

    pub fn set_base_gas_price(&self, state_root: gateway_primitives::BlockId, price: U256) {
        self.base_gas_price.write().insert(state_root, price);
    }
}

#[async_trait]
impl StateReader for InMemoryState {
    async fn account(
        &self,
        state_root: gateway_primitives::BlockId,
        address: Address,
    ) -> Result<AccountState, ChainApiError> {
        Ok(self.accounts.read().get(&(state_root, address)).copied().unwrap_or_default())
    }

    async fn code(&self, state_root: gateway_primitives::BlockId, address: Address) -> Result<Bytes, ChainApiError> {
        Ok(self.code.read().get(&(state_root, address)).cloned().unwrap_or_default())
    }

    async fn storage(
        &self,
        state_root: gateway_primitives::BlockId,
        address: Address,
        key: B256,
    ) -> Result<B256, ChainApiError> {
        Ok(self.storage.read().get(&(state_root, address, key)).copied().unwrap_or_default())
    }

    async fn base_gas_price(&self, state_root: gateway_primitives::BlockId) -> Result<U256, ChainApiError> {
        Ok(self.base_gas_price.read().get(&state_root).copied().unwrap_or_default())
    }
}

/// An in-memory stand-in for the log database.
#[derive(Clone, Default)]
pub struct InMemoryLogDb {
    events: Arc<RwLock<Vec<EventLogEntry>>>,
    transfers: Arc<RwLock<Vec<TransferLogEntry>>>,
}

impl InMemoryLogDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_event(&self, entry: EventLogEntry) {
        self.events.write().push(entry);
    }

    pub fn insert_transfer(&self, entry: TransferLogEntry) {
        self.transfers.write().push(entry);
    }
}

fn in_range(block_number: u32, range: BlockRange) -> bool {
    if range.is_empty_or_inverted() {
        return false;
    }
    block_number >= range.from && block_number <= range.to
}

fn paginate<T: Clone>(mut items: Vec<T>, order: Order, offset: usize, limit: usize) -> Vec<T> {
    if matches!(order, Order::Desc) {
        items.reverse();
    }
    items.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl LogDb for InMemoryLogDb {
    async fn filter_events(
        &self,
        criteria: &[EventCriterion],
        range: BlockRange,
        order: Order,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<EventLogEntry>, ChainApiError> {
        let matched: Vec<_> = self
            .events
            .read()
            .iter()
            .filter(|e| in_range(e.meta.block_number, range))
            .filter(|e| criteria.is_empty() || criteria.iter().any(|c| c.matches(e)))
            .cloned()
            .collect();
        Ok(paginate(matched, order, offset, limit))
    }

    async fn filter_transfers(
        &self,
        criteria: &[TransferCriterion],
        range: BlockRange,
        order: Order,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<TransferLogEntry>, ChainApiError> {
        let matched: Vec<_> = self
            .transfers
            .read()
            .iter()
            .filter(|t| in_range(t.meta.block_number, range))
            .filter(|t| criteria.is_empty() || criteria.iter().any(|c| c.matches(t)))
            .cloned()
            .collect();
        Ok(paginate(matched, order, offset, limit))
    }
}

/// An in-memory stand-in for the transaction pool.
pub struct InMemoryTxPool {
    sender: tokio::sync::broadcast::Sender<AcceptedTx>,
    accept_as_executable: bool,
}

impl InMemoryTxPool {
    pub fn new() -> Self {
        let (sender, _rx) = tokio::sync::broadcast::channel(256);
        Self { sender, accept_as_executable: true }
    }

    /// Publishes an accepted-tx event directly, bypassing `add_local`
    /// decoding — used by dispatcher tests that only care about fan-out.
    pub fn publish(&self, id: TxId, executable: bool) {
        let _ = self.sender.send(AcceptedTx { id, executable });
    }
}

impl Default for InMemoryTxPool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TxPool for InMemoryTxPool {
    async fn add_local(&self, raw: Bytes) -> Result<TxId, ChainApiError> {
        let id = alloy_primitives::keccak256(&raw);
        self.publish(id, self.accept_as_executable);
        Ok(id)
    }

    fn subscribe_accepted(&self) -> tokio::sync::broadcast::Receiver<AcceptedTx> {
        self.sender.subscribe()
    }
}

/// An in-memory stand-in for peer statistics.
#[derive(Clone, Default)]
pub struct InMemoryPeers {
    peers: Arc<RwLock<Vec<PeerInfo>>>,
}

impl InMemoryPeers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_peers(&self, peers: Vec<PeerInfo>) {
        *self.peers.write() = peers;
    }
}

impl PeerStats for InMemoryPeers {
    fn peer_count(&self) -> usize {
        self.peers.read().len()
    }

    fn peers(&self) -> Vec<PeerInfo> {
        self.peers.read().clone()
    }
}

/// An in-memory stand-in for the fork-config lookup: activates the
/// dynamic-fee fork at a fixed block number, or never.
#[derive(Clone, Copy, Debug)]
pub struct FixedForkConfig {
    pub activation_block: Option<u32>,
}

impl FixedForkConfig {
    pub fn never() -> Self {
        Self { activation_block: None }
    }

    pub fn at(activation_block: u32) -> Self {
        Self { activation_block: Some(activation_block) }
    }
}

impl ForkConfig for FixedForkConfig {
    fn is_galactica_active(&self, block_number: u32) -> bool {
        self.activation_block.is_some_and(|at| block_number >= at)
    }
}

/// An in-memory stand-in for the EVM executor: returns a fixed result per
/// call, ignoring the clauses. Good enough to exercise the `call` HTTP
/// handler's request/response wiring without a real EVM.
#[derive(Clone, Default)]
pub struct StubExecutor {
    result: Arc<RwLock<Option<ClauseResult>>>,
}

impl StubExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_result(&self, result: ClauseResult) {
        *self.result.write() = Some(result);
    }
}

#[async_trait]
impl Executor for StubExecutor {
    async fn call(
        &self,
        _state_root: BlockId,
        _caller: Option<Address>,
        _gas: Option<u64>,
        clauses: &[CallClause],
    ) -> Result<Vec<ClauseResult>, ChainApiError> {
        let template = self.result.read().clone().unwrap_or(ClauseResult {
            data: Bytes::new(),
            events: Vec::new(),
            transfers: Vec::new(),
            gas_used: 0,
            reverted: false,
            vm_error: None,
        });
        Ok(clauses.iter().map(|_| template.clone()).collect())
    }
}
