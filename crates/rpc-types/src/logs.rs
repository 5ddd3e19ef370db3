use crate::hexnum;
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogMetaDto {
    pub block_id: B256,
    #[serde(with = "hexnum")]
    pub block_number: u64,
    #[serde(with = "hexnum")]
    pub block_timestamp: u64,
    pub tx_id: B256,
    pub tx_origin: Address,
    pub clause_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_index: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<LogMetaDto>,
    #[serde(default)]
    pub obsolete: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferDto {
    pub sender: Address,
    pub recipient: Address,
    pub amount: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<LogMetaDto>,
    #[serde(default)]
    pub obsolete: bool,
}

/// One `{unit, from, to}` element of a filter request (§4.4).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RangeDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<RangeUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<u64>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RangeUnit {
    Block,
    Time,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptionsDto {
    #[serde(default)]
    pub offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default)]
    pub include_indexes: bool,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderDto {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventCriterionDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic0: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic1: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic2: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic3: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic4: Option<B256>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferCriterionDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_origin: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Address>,
}

/// `POST /logs/event` request body. `criteria_set` is kept as
/// `Vec<Option<_>>` rather than `Vec<_>` so a literal JSON `null` element
/// can be rejected with its index, per §4.5.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventFilterRequest {
    #[serde(default)]
    pub criteria_set: Vec<Option<EventCriterionDto>>,
    #[serde(default)]
    pub range: RangeDto,
    #[serde(default)]
    pub options: Option<FilterOptionsDto>,
    #[serde(default)]
    pub order: OrderDto,
}

/// `POST /logs/transfer` request body.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferFilterRequest {
    #[serde(default)]
    pub criteria_set: Vec<Option<TransferCriterionDto>>,
    #[serde(default)]
    pub range: RangeDto,
    #[serde(default)]
    pub options: Option<FilterOptionsDto>,
    #[serde(default)]
    pub order: OrderDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_criterion_deserializes_to_none() {
        let body: EventFilterRequest =
            serde_json::from_str(r#"{"criteriaSet":[null,{"address":"0x0000000000000000000000000000000000000001"}]}"#)
                .unwrap();
        assert_eq!(body.criteria_set.len(), 2);
        assert!(body.criteria_set[0].is_none());
        assert!(body.criteria_set[1].is_some());
    }

    #[test]
    fn empty_body_uses_defaults() {
        let body: TransferFilterRequest = serde_json::from_str("{}").unwrap();
        assert!(body.criteria_set.is_empty());
        assert!(body.options.is_none());
    }
}
