use crate::ids::BlockId;
use alloy_primitives::U256;

/// One `(reward, gasUsed)` pair from a block's sorted-by-reward transaction
/// list, the unit the percentile walk in §4.11 step 5 consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxGasAndReward {
    pub gas_used: u64,
    pub reward: U256,
}

/// Cached rewards for a block: the sorted `(reward, gasUsed)` list plus the
/// total gas used, so percentile queries don't need to re-sort.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedRewards {
    /// Sorted ascending by `reward`.
    pub items: Vec<TxGasAndReward>,
    pub total_gas_used: u64,
}

/// One entry in the fees-history ring cache (§3 `FeeCacheEntry`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeCacheEntry {
    pub parent_block_id: BlockId,
    pub base_fee: u64,
    pub gas_used_ratio: f64,
    pub cached_rewards: Option<CachedRewards>,
}

impl FeeCacheEntry {
    /// Walks the cached, sorted rewards to the value at cumulative gas
    /// share `percentile` (0..=100), per §4.11 step 5. Returns zero when
    /// there were no transactions in the block.
    pub fn reward_at_percentile(&self, percentile: f64) -> U256 {
        let Some(rewards) = &self.cached_rewards else { return U256::ZERO };
        if rewards.items.is_empty() {
            return U256::ZERO;
        }
        let threshold = (rewards.total_gas_used as f64 * percentile / 100.0) as u64;
        let mut cumulative = rewards.items[0].gas_used;
        let mut idx = 0;
        while cumulative < threshold && idx < rewards.items.len() - 1 {
            idx += 1;
            cumulative += rewards.items[idx].gas_used;
        }
        rewards.items[idx].reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(items: Vec<(u64, u64)>) -> FeeCacheEntry {
        let total_gas_used = items.iter().map(|(_, g)| g).sum();
        let mut items: Vec<_> =
            items.into_iter().map(|(r, g)| TxGasAndReward { reward: U256::from(r), gas_used: g }).collect();
        items.sort_by_key(|tx| tx.reward);
        FeeCacheEntry {
            parent_block_id: BlockId::default(),
            base_fee: 0,
            gas_used_ratio: 0.0,
            cached_rewards: Some(CachedRewards { items, total_gas_used }),
        }
    }

    #[test]
    fn empty_receipts_yield_zero_for_every_percentile() {
        let e = FeeCacheEntry {
            parent_block_id: BlockId::default(),
            base_fee: 0,
            gas_used_ratio: 0.0,
            cached_rewards: Some(CachedRewards { items: vec![], total_gas_used: 0 }),
        };
        for p in [0.0, 25.0, 50.0, 75.0, 100.0] {
            assert_eq!(e.reward_at_percentile(p), U256::ZERO);
        }
    }

    #[test]
    fn percentile_walk_picks_correct_bucket() {
        // three txs with equal gas, rewards 10/20/30 -> total gas 30
        let e = entry(vec![(10, 10), (20, 10), (30, 10)]);
        assert_eq!(e.reward_at_percentile(0.0), U256::from(10u64));
        assert_eq!(e.reward_at_percentile(50.0), U256::from(20u64));
        assert_eq!(e.reward_at_percentile(100.0), U256::from(30u64));
    }
}
