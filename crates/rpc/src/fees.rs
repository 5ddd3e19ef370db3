//! Fees history engine (§4.11): a per-block fee cache fed by the
//! best-block ticker, with an on-demand parent-walk fallback and
//! percentile-reward computation.

use crate::error::{ApiError, ApiResult};
use crate::revision::RevisionResolver;
use gateway_chain_api::{ChainRepository, ForkConfig, StateReader};
use gateway_primitives::{BlockId, CachedRewards, FeeCacheEntry, Revision, TxGasAndReward};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// `[oldestBlock, ..., newestBlock]`, strictly ascending by number (§5).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeesHistory {
    pub oldest_block: u32,
    pub base_fee_per_gas: Vec<u64>,
    pub gas_used_ratio: Vec<f64>,
    pub reward: Option<Vec<Vec<alloy_primitives::U256>>>,
}

/// The fees cache ring plus the collaborators it needs to fill a miss
/// (§4.11): the chain repository (blocks, receipts, transactions) and the
/// state reader (`baseGasPrice` lookup) and fork config (legacy-vs-dynamic
/// pricing rule, §4.11 step 3).
pub struct FeesHistoryEngine<C, S, F> {
    chain: Arc<C>,
    state: Arc<S>,
    fork: Arc<F>,
    resolver: RevisionResolver<C>,
    cache: Mutex<LruCache<BlockId, FeeCacheEntry>>,
    cache_size: usize,
}

impl<C: ChainRepository, S: StateReader, F: ForkConfig> FeesHistoryEngine<C, S, F> {
    pub fn new(chain: Arc<C>, state: Arc<S>, fork: Arc<F>, cache_size: usize) -> Self {
        let resolver = RevisionResolver::new(Arc::clone(&chain));
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self { chain, state, fork, resolver, cache: Mutex::new(LruCache::new(capacity)), cache_size }
    }

    /// Pushes the latest best header into the cache (§4.11 "Background
    /// pump"). Called by the fees pump on every best-block tick; never
    /// computes rewards eagerly, since most ticks are never queried with
    /// `rewardPercentiles`.
    pub async fn push_best(&self) -> ApiResult<()> {
        let best = self.chain.best_block();
        self.fill_entry(best.header.id, &[]).await.map(|_| ())
    }

    /// §4.11 public operation. `newest_block` is a revision token string
    /// (`best`, `finalized`, `next`, a number, or a block id).
    pub async fn fees_history(
        &self,
        block_count: u32,
        newest_block: &str,
        reward_percentiles: &[f64],
    ) -> ApiResult<FeesHistory> {
        if block_count == 0 || block_count as usize > self.cache_size {
            return Err(ApiError::invalid_input(format!(
                "blockCount must be between 1 and {}",
                self.cache_size
            )));
        }

        let revision = self.resolver.parse(newest_block)?;
        let newest = self.resolver.resolve(revision)?;
        let newest_number = newest.header.number();
        let best_number = self.chain.best_block().header.number();
        let floor = best_number.saturating_sub(self.cache_size as u32 - 1);
        if newest_number < floor {
            return Err(ApiError::invalid_input(format!(
                "newestBlock must be between {floor} and {best_number}"
            )));
        }

        let is_next = matches!(revision, Revision::Next);
        let mut entries = Vec::with_capacity(block_count as usize);
        let mut cursor_id = newest.header.id;
        let mut cursor_is_synthetic = is_next;

        for _ in 0..block_count {
            let entry = if cursor_is_synthetic {
                self.synthetic_next_entry(&newest).await?
            } else {
                self.fill_entry(cursor_id, reward_percentiles).await?
            };
            let parent_id = entry.parent_block_id;
            entries.push(entry);
            cursor_id = parent_id;
            cursor_is_synthetic = false;
        }
        entries.reverse();

        let oldest_block = newest_number + 1 - block_count;
        let base_fee_per_gas = entries.iter().map(|e| e.base_fee).collect();
        let gas_used_ratio = entries.iter().map(|e| e.gas_used_ratio).collect();
        let reward = (!reward_percentiles.is_empty()).then(|| {
            entries
                .iter()
                .map(|e| reward_percentiles.iter().map(|&p| e.reward_at_percentile(p)).collect())
                .collect()
        });

        Ok(FeesHistory { oldest_block, base_fee_per_gas, gas_used_ratio, reward })
    }

    /// The synthetic `next` entry (§9 Open Questions): never cached, zero
    /// rewards for every percentile regardless of what was requested.
    async fn synthetic_next_entry(&self, next: &gateway_primitives::BlockSummary) -> ApiResult<FeeCacheEntry> {
        Ok(FeeCacheEntry {
            parent_block_id: next.header.parent_id,
            base_fee: next.header.base_fee_per_gas.unwrap_or_default(),
            gas_used_ratio: 0.0,
            cached_rewards: None,
        })
    }

    /// Cache hit, or compute-and-insert on miss (§4.11 resolution walk).
    /// Upgrades a cached rewards-less entry in place when percentiles are
    /// now requested and weren't before.
    async fn fill_entry(&self, block_id: BlockId, reward_percentiles: &[f64]) -> ApiResult<FeeCacheEntry> {
        let needs_rewards = !reward_percentiles.is_empty();
        if let Some(cached) = self.cache.lock().get(&block_id).cloned() {
            if !needs_rewards || cached.cached_rewards.is_some() {
                return Ok(cached);
            }
        }

        let block = self
            .chain
            .block_by_id(block_id)
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::not_found("block not found"))?;
        let header = &block.header;
        let gas_used_ratio = if header.gas_limit == 0 {
            0.0
        } else {
            header.gas_used as f64 / header.gas_limit as f64
        };

        let cached_rewards = if needs_rewards {
            Some(self.compute_rewards(&block).await?)
        } else {
            None
        };

        let entry = FeeCacheEntry {
            parent_block_id: header.parent_id,
            base_fee: header.base_fee_per_gas.unwrap_or_default(),
            gas_used_ratio,
            cached_rewards,
        };
        self.cache.lock().put(block_id, entry.clone());
        Ok(entry)
    }

    /// §4.11 "Rewards computation": effective priority fee per transaction,
    /// sorted ascending, with totals for the percentile walk.
    async fn compute_rewards(&self, block: &gateway_primitives::BlockSummary) -> ApiResult<CachedRewards> {
        if block.tx_ids.is_empty() {
            return Ok(CachedRewards { items: Vec::new(), total_gas_used: 0 });
        }

        let receipts = self.chain.receipts(block.header.id).map_err(ApiError::from)?.unwrap_or_default();
        let base_gas_price = self
            .state
            .base_gas_price(block.header.parent_id)
            .await
            .map_err(|e| ApiError::Collaborator(e.to_string()))?;
        let is_galactica = self.fork.is_galactica_active(block.header.number());
        let header_base_fee = is_galactica.then_some(header_base_fee_or_zero(block));

        let mut items = Vec::with_capacity(block.tx_ids.len());
        for (idx, tx_id) in block.tx_ids.iter().enumerate() {
            let Some(receipt) = receipts.get(idx) else { continue };
            let Some(location) = self.chain.transaction(*tx_id).map_err(ApiError::from)? else { continue };
            let reward = location.tx.effective_priority_fee(base_gas_price, header_base_fee);
            items.push(TxGasAndReward { gas_used: receipt.gas_used, reward });
        }
        items.sort_by_key(|item| item.reward);
        let total_gas_used = items.iter().map(|i| i.gas_used).sum();
        Ok(CachedRewards { items, total_gas_used })
    }
}

fn header_base_fee_or_zero(block: &gateway_primitives::BlockSummary) -> u64 {
    block.header.base_fee_per_gas.unwrap_or_default()
}

/// The background pump (§4.11 "Background pump", §5): a single long-lived
/// task that pushes the latest best header into the cache on every tick,
/// cooperatively cancelled via a shutdown signal.
pub struct FeesPump<C, S, F> {
    engine: Arc<FeesHistoryEngine<C, S, F>>,
}

impl<C: ChainRepository, S: StateReader, F: ForkConfig> FeesPump<C, S, F> {
    pub fn new(engine: Arc<FeesHistoryEngine<C, S, F>>) -> Self {
        Self { engine }
    }

    /// Runs until `shutdown` reports `true` or the best-block ticker
    /// closes. Mirrors §5's "Shutdown: Close() closes done ... then
    /// returns" contract via a `watch<bool>` rather than a raw channel
    /// close, so multiple pumps could share one shutdown signal.
    pub async fn run(
        self,
        mut best_ticker: tokio::sync::watch::Receiver<BlockId>,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
                changed = best_ticker.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if let Err(err) = self.engine.push_best().await {
                        tracing::warn!(error = %err, "fees pump failed to push best block");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use gateway_chain_api::testing::{FixedForkConfig, InMemoryChain, InMemoryState};
    use gateway_primitives::{
        BlockHeader, BlockSummary, DynamicFeeGasPrice, GasPrice, LegacyGasPrice, Receipt, Transaction, TxId,
    };

    fn header(number: u32, parent: BlockId, base_fee: Option<u64>, gas_used: u64) -> BlockHeader {
        BlockHeader {
            id: BlockId::from_number_and_bytes(number, &[number as u8; 28]),
            parent_id: parent,
            timestamp: number as u64 * 10,
            gas_used,
            gas_limit: 10_000_000,
            base_fee_per_gas: base_fee,
            txs_root: Default::default(),
            state_root: Default::default(),
            receipts_root: Default::default(),
            total_score: 0,
            beneficiary: Address::ZERO,
            signer: Some(Address::ZERO),
            com: false,
            txs_features: 0,
        }
    }

    fn setup() -> (Arc<InMemoryChain>, Arc<InMemoryState>, Arc<FixedForkConfig>) {
        let genesis = BlockSummary { header: header(0, BlockId::default(), Some(0), 0), tx_ids: vec![], size: 0 };
        (Arc::new(InMemoryChain::new(genesis)), Arc::new(InMemoryState::new()), Arc::new(FixedForkConfig::at(2)))
    }

    #[tokio::test]
    async fn rejects_block_count_out_of_range() {
        let (chain, state, fork) = setup();
        let engine = FeesHistoryEngine::new(chain, state, fork, 10);
        assert!(engine.fees_history(0, "best", &[]).await.is_err());
        assert!(engine.fees_history(11, "best", &[]).await.is_err());
    }

    #[tokio::test]
    async fn rejects_newest_block_below_cache_floor() {
        let (chain, state, fork) = setup();
        for n in 1..=5u32 {
            let b = BlockSummary {
                header: header(n, BlockId::from_number_and_bytes(n - 1, &[(n - 1) as u8; 28]), Some(0), 0),
                tx_ids: vec![],
                size: 0,
            };
            chain.push_canonical(b, vec![]);
        }
        let engine = FeesHistoryEngine::new(chain, state, fork, 2);
        let err = engine.fees_history(1, "0", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn ascending_series_across_two_legacy_and_dynamic_blocks() {
        let (chain, state, fork) = setup();
        let genesis_id = chain.genesis().header.id;
        let b1 = BlockSummary { header: header(1, genesis_id, Some(0), 5_000_000), tx_ids: vec![], size: 0 };
        chain.push_canonical(b1.clone(), vec![]);
        let b2 = BlockSummary { header: header(2, b1.header.id, Some(7), 2_000_000), tx_ids: vec![], size: 0 };
        chain.push_canonical(b2.clone(), vec![]);

        let engine = FeesHistoryEngine::new(chain, state, fork, 10);
        let history = engine.fees_history(2, "best", &[]).await.unwrap();
        assert_eq!(history.oldest_block, 1);
        assert_eq!(history.base_fee_per_gas, vec![0, 7]);
        assert_eq!(history.gas_used_ratio, vec![0.5, 0.2]);
    }

    #[tokio::test]
    async fn next_revision_never_caches_and_yields_zero_rewards() {
        let (chain, state, fork) = setup();
        let engine = FeesHistoryEngine::new(chain, state, fork, 10);
        let history = engine.fees_history(1, "next", &[25.0, 50.0]).await.unwrap();
        assert_eq!(history.reward.unwrap(), vec![vec![U256::ZERO, U256::ZERO]]);
    }

    fn transaction(id: TxId, gas_price: GasPrice, origin: Address) -> Transaction {
        Transaction {
            id,
            chain_tag: 1,
            block_ref: 0,
            expiration: 0,
            clauses: vec![],
            gas_price,
            gas: 21000,
            nonce: 0,
            depends_on: None,
            origin: Some(origin),
            delegator: None,
            size: 0,
        }
    }

    fn receipt(gas_used: u64) -> Receipt {
        Receipt { gas_used, gas_payer: Address::ZERO, paid: U256::ZERO, reward: U256::ZERO, reverted: false, outputs: vec![] }
    }

    #[tokio::test]
    async fn legacy_block_blends_coefficient_with_base_gas_price() {
        let (chain, state, fork) = setup();
        let genesis_id = chain.genesis().header.id;
        state.set_base_gas_price(genesis_id, U256::from(100u64));

        let tx = transaction(
            TxId::repeat_byte(1),
            GasPrice::Legacy(LegacyGasPrice { gas_price_coef: 0 }),
            Address::repeat_byte(1),
        );
        chain.register_transaction(gateway_chain_api::TransactionLocation {
            tx: tx.clone(),
            block_id: BlockId::from_number_and_bytes(1, &[1u8; 28]),
            block_number: 1,
        });

        let b1 = BlockSummary { header: header(1, genesis_id, Some(0), 21000), tx_ids: vec![tx.id], size: 0 };
        chain.push_canonical(b1.clone(), vec![receipt(21000)]);

        let engine = FeesHistoryEngine::new(chain, state, fork, 10);
        let history = engine.fees_history(1, "best", &[50.0]).await.unwrap();
        // pre-fork: base_gas_price(100) + 0 * 100/255 == 100
        assert_eq!(history.reward.unwrap(), vec![vec![U256::from(100u64)]]);
    }

    #[tokio::test]
    async fn post_fork_block_uses_dynamic_fee_clamp() {
        let (chain, state, fork) = setup(); // galactica activates at block 2
        let genesis_id = chain.genesis().header.id;

        let b1 = BlockSummary { header: header(1, genesis_id, Some(0), 0), tx_ids: vec![], size: 0 };
        chain.push_canonical(b1.clone(), vec![]);

        let tx = transaction(
            TxId::repeat_byte(2),
            GasPrice::Dynamic(DynamicFeeGasPrice {
                max_fee_per_gas: U256::from(100u64),
                max_priority_fee_per_gas: U256::from(10u64),
            }),
            Address::repeat_byte(2),
        );
        chain.register_transaction(gateway_chain_api::TransactionLocation {
            tx: tx.clone(),
            block_id: BlockId::from_number_and_bytes(2, &[2u8; 28]),
            block_number: 2,
        });
        let b2 = BlockSummary { header: header(2, b1.header.id, Some(20), 21000), tx_ids: vec![tx.id], size: 0 };
        chain.push_canonical(b2.clone(), vec![receipt(21000)]);

        let engine = FeesHistoryEngine::new(chain, state, fork, 10);
        let history = engine.fees_history(1, "best", &[50.0]).await.unwrap();
        // post-fork: min(max_priority_fee(10), max_fee(100) - base_fee(20)) == 10
        assert_eq!(history.reward.unwrap(), vec![vec![U256::from(10u64)]]);
    }
}
