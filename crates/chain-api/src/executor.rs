use crate::error::ChainApiError;
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use gateway_primitives::{BlockId, Log, Transfer};

/// A single clause to execute against a state root, as consumed by the
/// `call` endpoint (§6.1 `POST /accounts/*?revision=`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallClause {
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
}

/// The outcome of executing one clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClauseResult {
    pub data: Bytes,
    pub events: Vec<Log>,
    pub transfers: Vec<Transfer>,
    pub gas_used: u64,
    pub reverted: bool,
    pub vm_error: Option<String>,
}

/// The EVM executor used by the `call` endpoint (§1): deliberately out of
/// scope as a collaborator — this crate specifies only the call shape it
/// consumes, not how execution happens.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn call(
        &self,
        state_root: BlockId,
        caller: Option<Address>,
        gas: Option<u64>,
        clauses: &[CallClause],
    ) -> Result<Vec<ClauseResult>, ChainApiError>;
}
