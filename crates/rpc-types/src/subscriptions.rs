use crate::{
    hexnum,
    logs::{EventDto, TransferDto},
};
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// Message pushed by `/subscriptions/block` (§6.3 `BlockMessage`): all
/// header fields plus `transactions[]` (ids only) and `size`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockMessageDto {
    #[serde(with = "hexnum")]
    pub number: u64,
    pub id: B256,
    pub parent_id: B256,
    #[serde(with = "hexnum")]
    pub timestamp: u64,
    #[serde(with = "hexnum")]
    pub gas_limit: u64,
    #[serde(with = "hexnum")]
    pub gas_used: u64,
    #[serde(with = "hexnum")]
    pub total_score: u64,
    pub beneficiary: Address,
    pub signer: Address,
    pub txs_root: B256,
    pub txs_features: u32,
    pub state_root: B256,
    pub receipts_root: B256,
    pub com: bool,
    pub transactions: Vec<B256>,
    pub size: u32,
    #[serde(default)]
    pub obsolete: bool,
}

/// Message pushed by `/subscriptions/event`.
pub type EventMessageDto = EventDto;

/// Message pushed by `/subscriptions/transfer`.
pub type TransferMessageDto = TransferDto;

/// Message pushed by `/subscriptions/beat` (legacy 2048-bit bloom digest).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BeatMessageDto {
    #[serde(with = "hexnum")]
    pub number: u64,
    pub id: B256,
    pub parent_id: B256,
    #[serde(with = "hexnum")]
    pub timestamp: u64,
    pub txs_features: u32,
    pub bloom: String,
    pub k: u32,
    #[serde(default)]
    pub obsolete: bool,
}

/// Message pushed by `/subscriptions/beat2`, carrying `gasLimit` on top of
/// the fields in `BeatMessageDto` (§4.8, §6.3).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Beat2MessageDto {
    #[serde(with = "hexnum")]
    pub number: u64,
    pub id: B256,
    pub parent_id: B256,
    #[serde(with = "hexnum")]
    pub timestamp: u64,
    pub txs_features: u32,
    #[serde(with = "hexnum")]
    pub gas_limit: u64,
    pub bloom: String,
    pub k: u32,
    #[serde(default)]
    pub obsolete: bool,
}

/// Message pushed by `/subscriptions/txpool`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxPoolMessageDto {
    pub id: B256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_message_omits_obsolete_default_on_round_trip() {
        let msg = BlockMessageDto {
            number: 1,
            id: B256::ZERO,
            parent_id: B256::ZERO,
            timestamp: 0,
            gas_limit: 0,
            gas_used: 0,
            total_score: 0,
            beneficiary: Address::ZERO,
            signer: Address::ZERO,
            txs_root: B256::ZERO,
            txs_features: 0,
            state_root: B256::ZERO,
            receipts_root: B256::ZERO,
            com: false,
            transactions: vec![],
            size: 0,
            obsolete: false,
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: BlockMessageDto = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
