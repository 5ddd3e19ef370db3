use crate::error::{ApiError, ApiResult};
use alloy_primitives::{Address, Bytes, B256};
use gateway_chain_api::{AccountState, StateReader};
use gateway_primitives::BlockId;
use std::sync::Arc;

/// Thin glue over the `StateReader` collaborator (§4.2): resolves a
/// revision's state root once, then reads balance/energy/code/storage at it.
/// Never fails except on collaborator I/O; absent accounts read as zero.
#[derive(Clone)]
pub struct StateService<S> {
    reader: Arc<S>,
}

impl<S: StateReader> StateService<S> {
    pub fn new(reader: Arc<S>) -> Self {
        Self { reader }
    }

    pub async fn account(&self, state_root: BlockId, address: Address) -> ApiResult<AccountState> {
        self.reader
            .account(state_root, address)
            .await
            .map_err(|e| ApiError::Collaborator(e.to_string()))
    }

    pub async fn code(&self, state_root: BlockId, address: Address) -> ApiResult<Bytes> {
        self.reader
            .code(state_root, address)
            .await
            .map_err(|e| ApiError::Collaborator(e.to_string()))
    }

    pub async fn storage(&self, state_root: BlockId, address: Address, key: B256) -> ApiResult<B256> {
        self.reader
            .storage(state_root, address, key)
            .await
            .map_err(|e| ApiError::Collaborator(e.to_string()))
    }

    pub async fn batch_accounts(
        &self,
        state_root: BlockId,
        addresses: &[Address],
    ) -> ApiResult<Vec<AccountState>> {
        self.reader
            .batch_accounts(state_root, addresses)
            .await
            .map_err(|e| ApiError::Collaborator(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_chain_api::testing::InMemoryState;

    #[tokio::test]
    async fn absent_account_reads_as_zero() {
        let service = StateService::new(Arc::new(InMemoryState::new()));
        let account = service.account(BlockId::default(), Address::ZERO).await.unwrap();
        assert_eq!(account.balance, alloy_primitives::U256::ZERO);
        assert!(!account.has_code);
    }

    #[tokio::test]
    async fn configured_account_round_trips() {
        let state = InMemoryState::new();
        let root = BlockId::default();
        let addr = Address::repeat_byte(1);
        state.set_account(root, addr, AccountState { balance: alloy_primitives::U256::from(42u64), energy: alloy_primitives::U256::ZERO, has_code: true });
        let service = StateService::new(Arc::new(state));
        let account = service.account(root, addr).await.unwrap();
        assert_eq!(account.balance, alloy_primitives::U256::from(42u64));
        assert!(account.has_code);
    }
}
