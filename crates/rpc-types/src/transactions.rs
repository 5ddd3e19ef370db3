use crate::{accounts::ClauseDto, hexnum};
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: B256,
    pub chain_tag: u8,
    #[serde(with = "hexnum")]
    pub block_ref: u64,
    pub expiration: u32,
    pub clauses: Vec<ClauseDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price_coef: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
    #[serde(with = "hexnum")]
    pub gas: u64,
    #[serde(with = "hexnum")]
    pub nonce: u64,
    pub depends_on: Option<B256>,
    pub origin: Address,
    pub delegator: Option<Address>,
    pub size: u32,
    pub meta: TransactionMeta,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    pub block_id: B256,
    #[serde(with = "hexnum")]
    pub block_number: u64,
    #[serde(with = "hexnum")]
    pub block_timestamp: u64,
}

/// `GET /transactions/{id}?raw=`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawTransactionResponse {
    pub raw: Bytes,
    pub meta: Option<TransactionMeta>,
}

/// `POST /transactions` request body.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitTransactionRequest {
    pub raw: Bytes,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitTransactionResponse {
    pub id: B256,
}
