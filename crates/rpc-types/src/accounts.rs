use crate::hexnum;
use alloy_primitives::{Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// `GET /accounts/{addr}?revision=`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub balance: U256,
    pub energy: U256,
    pub has_code: bool,
}

/// `GET /accounts/{addr}/code?revision=`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeResponse {
    pub code: Bytes,
}

/// `GET /accounts/{addr}/storage/{key}?revision=`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageResponse {
    pub value: B256,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClauseDto {
    pub to: Option<alloy_primitives::Address>,
    pub value: U256,
    pub data: Bytes,
}

/// `POST /accounts/*?revision=` request body.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub clauses: Vec<ClauseDto>,
    #[serde(default, with = "hexnum::opt", skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    pub caller: Option<alloy_primitives::Address>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallResultDto {
    pub data: Bytes,
    pub events: Vec<crate::logs::EventDto>,
    pub transfers: Vec<crate::logs::TransferDto>,
    pub gas_used: u64,
    pub reverted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_error: Option<String>,
}
