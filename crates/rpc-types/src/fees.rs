use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// `GET /fees/history?blockCount=&newestBlock=&rewardPercentiles=`
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeesHistoryQuery {
    pub block_count: u32,
    pub newest_block: String,
    #[serde(default)]
    pub reward_percentiles: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeesHistoryResponse {
    pub oldest_block: u32,
    pub base_fee_per_gas: Vec<U256>,
    pub gas_used_ratio: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<Vec<Vec<U256>>>,
}

/// `GET /fees/priority`
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeesPriorityResponse {
    #[serde(rename = "maxPriorityFeePerGas")]
    pub max_priority_fee_per_gas: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_response_round_trips() {
        let resp = FeesHistoryResponse {
            oldest_block: 10,
            base_fee_per_gas: vec![U256::from(100u64), U256::from(110u64)],
            gas_used_ratio: vec![0.5, 0.6],
            reward: Some(vec![vec![U256::from(1u64)]]),
        };
        let json = serde_json::to_string(&resp).unwrap();
        let back: FeesHistoryResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(resp, back);
    }
}
