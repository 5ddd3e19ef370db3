use crate::{hexnum, transactions::TransactionResponse};
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BlockTransactions {
    Ids(Vec<B256>),
    Expanded(Vec<TransactionResponse>),
}

/// `GET /blocks/{revision}?expanded=`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockResponse {
    #[serde(with = "hexnum")]
    pub number: u64,
    pub id: B256,
    pub size: u32,
    pub parent_id: B256,
    #[serde(with = "hexnum")]
    pub timestamp: u64,
    #[serde(with = "hexnum")]
    pub gas_limit: u64,
    pub beneficiary: Address,
    #[serde(with = "hexnum")]
    pub gas_used: u64,
    #[serde(with = "hexnum")]
    pub total_score: u64,
    pub txs_root: B256,
    pub txs_features: u32,
    pub state_root: B256,
    pub receipts_root: B256,
    pub signer: Option<Address>,
    pub com: bool,
    pub is_trunk: bool,
    pub is_finalized: bool,
    pub transactions: BlockTransactions,
}
