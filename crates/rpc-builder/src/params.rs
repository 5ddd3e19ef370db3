//! Small parsing helpers shared by route handlers and WebSocket upgrade
//! handlers; kept in one place so the `invalid address`/`malformed ...`
//! error strings stay consistent across endpoints (§8's literal scenario
//! checks the exact 400 body for a bad address).

use alloy_primitives::{Address, B256};
use gateway_primitives::BlockId;
use gateway_rpc::ApiError;

pub fn parse_address(raw: &str) -> Result<Address, ApiError> {
    raw.parse::<Address>().map_err(|_| ApiError::invalid_input("invalid address"))
}

pub fn parse_b256(raw: &str) -> Result<B256, ApiError> {
    raw.parse::<B256>().map_err(|_| ApiError::invalid_input("invalid hash"))
}

pub fn parse_block_id(raw: &str) -> Result<BlockId, ApiError> {
    parse_b256(raw).map(BlockId::from)
}
