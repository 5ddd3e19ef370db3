use serde::{Deserialize, Serialize};

/// `POST /admin/loglevel` request body.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminLogLevelBody {
    pub level: String,
}

/// `POST /admin/loglevel` response body, echoing the level now in effect.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminLogLevelResponse {
    pub level: String,
}

/// `POST /admin/apilogs` request body.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminApiLogsBody {
    pub enabled: bool,
}

/// `GET`/`POST /admin/apilogs` response body.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminApiLogsResponse {
    pub enabled: bool,
}

/// `GET /node/network/peers` response entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeerStatsDto {
    pub id: String,
    pub best_block_id: alloy_primitives::B256,
    pub inbound: bool,
}

/// `GET /admin/health` response body (§4.12).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponseDto {
    pub healthy: bool,
    pub best_block_time: u64,
    pub peer_count: usize,
    pub is_network_progressing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes_camel_case() {
        let resp = HealthResponseDto {
            healthy: true,
            best_block_time: 1_700_000_000,
            peer_count: 3,
            is_network_progressing: true,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["bestBlockTime"], 1_700_000_000);
        assert_eq!(json["peerCount"], 3);
        assert_eq!(json["isNetworkProgressing"], true);
    }
}
