use crate::{
    hexnum,
    logs::{EventDto, TransferDto},
    transactions::TransactionMeta,
};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutputDto {
    pub contract_address: Option<Address>,
    pub events: Vec<EventDto>,
    pub transfers: Vec<TransferDto>,
}

/// `GET /transactions/{id}/receipt?head=`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    #[serde(with = "hexnum")]
    pub gas_used: u64,
    pub gas_payer: Address,
    pub paid: U256,
    pub reward: U256,
    pub reverted: bool,
    pub outputs: Vec<OutputDto>,
    pub meta: TransactionMeta,
}
