//! `GET /fees/history` (§4.11, §6.1).

use crate::error::HttpError;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::Json;
use gateway_chain_api::{ChainRepository, Executor, ForkConfig, LogDb, PeerStats, StateReader, TxPool};
use gateway_rpc::ApiError;
use gateway_rpc_types::{FeesHistoryQuery, FeesHistoryResponse};

pub async fn fees_history<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Query(q): Query<FeesHistoryQuery>,
) -> Result<Json<FeesHistoryResponse>, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let percentiles = parse_percentiles(q.reward_percentiles.as_deref())?;
    let history = state.fees.fees_history(q.block_count, &q.newest_block, &percentiles).await?;
    Ok(Json(FeesHistoryResponse {
        oldest_block: history.oldest_block,
        base_fee_per_gas: history.base_fee_per_gas.into_iter().map(alloy_primitives::U256::from).collect(),
        gas_used_ratio: history.gas_used_ratio,
        reward: history.reward,
    }))
}

/// `rewardPercentiles` is a comma-separated list of floats in the query
/// string; absent or empty means "no rewards requested" (§4.11).
fn parse_percentiles(raw: Option<&str>) -> Result<Vec<f64>, HttpError> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else { return Ok(Vec::new()) };
    let mut out = Vec::new();
    for p in raw.split(',') {
        let value: f64 =
            p.trim().parse().map_err(|_| HttpError::from(ApiError::invalid_input("invalid rewardPercentiles")))?;
        out.push(value);
    }
    Ok(out)
}
