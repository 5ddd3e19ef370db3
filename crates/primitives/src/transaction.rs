use crate::ids::{BlockId, TxId};
use alloy_primitives::{Address, Bytes, U256};

/// A single `(to, value, data)` operation within a transaction.
/// `to = None` creates a contract whose address is derived from
/// `(tx_id, clause_index, 0)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clause {
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
}

impl Clause {
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}

/// Derives the address of a contract created by `clause_index` within
/// transaction `tx_id`, following the `(txID, clauseIndex, 0)` rule.
pub fn derive_contract_address(tx_id: TxId, clause_index: u32) -> Address {
    let mut preimage = [0u8; 32 + 4 + 4];
    preimage[0..32].copy_from_slice(tx_id.as_slice());
    preimage[32..36].copy_from_slice(&clause_index.to_be_bytes());
    preimage[36..40].copy_from_slice(&0u32.to_be_bytes());
    let digest = alloy_primitives::keccak256(preimage);
    Address::from_slice(&digest[12..])
}

/// Legacy gas pricing: a single coefficient blended with the block's base
/// gas price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegacyGasPrice {
    pub gas_price_coef: u8,
}

/// Post-fork (dynamic-fee, EIP-1559-style) gas pricing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DynamicFeeGasPrice {
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

/// The two gas-pricing schemes a transaction may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GasPrice {
    Legacy(LegacyGasPrice),
    Dynamic(DynamicFeeGasPrice),
}

impl GasPrice {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, GasPrice::Dynamic(_))
    }
}

/// A decoded, typed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: TxId,
    pub chain_tag: u8,
    pub block_ref: u64,
    pub expiration: u32,
    pub clauses: Vec<Clause>,
    pub gas_price: GasPrice,
    pub gas: u64,
    pub nonce: u64,
    pub depends_on: Option<TxId>,
    /// Recovered from the transaction's signature; `None` until recovery has
    /// run (raw-tx decode defers this to the mempool, see §4.3).
    pub origin: Option<Address>,
    pub delegator: Option<Address>,
    pub size: u32,
}

impl Transaction {
    /// Effective priority fee per the fork rule in §4.11 step 3: pre-fork
    /// transactions use their legacy coefficient blended with
    /// `base_gas_price`; post-fork transactions use
    /// `min(max_priority_fee, max_fee - base_fee)`.
    pub fn effective_priority_fee(&self, base_gas_price: U256, header_base_fee: Option<u64>) -> U256 {
        match self.gas_price {
            GasPrice::Legacy(LegacyGasPrice { gas_price_coef }) => {
                // legacy coefficient blends linearly between base and 2x base,
                // matching the pre-fork gas price formula.
                let coef = U256::from(gas_price_coef);
                base_gas_price + (base_gas_price * coef) / U256::from(255)
            }
            GasPrice::Dynamic(DynamicFeeGasPrice { max_fee_per_gas, max_priority_fee_per_gas }) => {
                let base_fee = U256::from(header_base_fee.unwrap_or_default());
                if max_fee_per_gas <= base_fee {
                    U256::ZERO
                } else {
                    max_priority_fee_per_gas.min(max_fee_per_gas - base_fee)
                }
            }
        }
    }
}

/// A block-id-shaped placeholder transactions reference to bound their
/// validity window (`blockRef`); re-exported here for readability at call
/// sites that compare a tx's `block_ref` against a chain tip.
pub type BlockRef = BlockId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_fee_clamps_to_max_priority() {
        let tx = Transaction {
            id: TxId::ZERO,
            chain_tag: 1,
            block_ref: 0,
            expiration: 0,
            clauses: vec![],
            gas_price: GasPrice::Dynamic(DynamicFeeGasPrice {
                max_fee_per_gas: U256::from(100u64),
                max_priority_fee_per_gas: U256::from(10u64),
            }),
            gas: 21000,
            nonce: 0,
            depends_on: None,
            origin: None,
            delegator: None,
            size: 0,
        };
        // base fee leaves headroom above max_priority_fee -> clamp to tip
        assert_eq!(tx.effective_priority_fee(U256::ZERO, Some(10)), U256::from(10u64));
        // base fee eats into the max fee -> clamp to (max_fee - base_fee)
        assert_eq!(tx.effective_priority_fee(U256::ZERO, Some(95)), U256::from(5u64));
        // base fee exceeds max fee -> zero reward
        assert_eq!(tx.effective_priority_fee(U256::ZERO, Some(200)), U256::ZERO);
    }

    #[test]
    fn contract_address_is_deterministic() {
        let tx_id = TxId::repeat_byte(7);
        let a = derive_contract_address(tx_id, 0);
        let b = derive_contract_address(tx_id, 0);
        let c = derive_contract_address(tx_id, 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
