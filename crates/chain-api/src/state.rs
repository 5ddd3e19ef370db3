use crate::error::ChainApiError;
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use gateway_primitives::BlockId;

/// Balance/energy/code presence for one account, as read at a given state
/// root. Absent accounts read back as all-zero (§4.2) — callers never see a
/// `NotFound` for account reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccountState {
    pub balance: U256,
    pub energy: U256,
    pub has_code: bool,
}

/// The state trie / stater (§1): account balance, energy, code and storage
/// at an arbitrary historical state root.
#[async_trait]
pub trait StateReader: Send + Sync {
    async fn account(&self, state_root: BlockId, address: Address) -> Result<AccountState, ChainApiError>;

    async fn code(&self, state_root: BlockId, address: Address) -> Result<Bytes, ChainApiError>;

    async fn storage(
        &self,
        state_root: BlockId,
        address: Address,
        key: B256,
    ) -> Result<B256, ChainApiError>;

    /// Batch account read at the same root, used by multi-clause `call`.
    async fn batch_accounts(
        &self,
        state_root: BlockId,
        addresses: &[Address],
    ) -> Result<Vec<AccountState>, ChainApiError> {
        let mut out = Vec::with_capacity(addresses.len());
        for addr in addresses {
            out.push(self.account(state_root, *addr).await?);
        }
        Ok(out)
    }

    /// Reads `baseGasPrice` from the chain's builtin params contract at
    /// `state_root` (§4.11 step 2), used by the fees engine to price legacy
    /// transactions. Defaults to zero so existing implementors don't break;
    /// a real stater overrides this.
    async fn base_gas_price(&self, _state_root: BlockId) -> Result<U256, ChainApiError> {
        Ok(U256::ZERO)
    }
}
