//! `GET /blocks/{revision}` (§4.1).

use crate::convert::transaction_response;
use crate::error::HttpError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use gateway_chain_api::{ChainRepository, Executor, ForkConfig, LogDb, PeerStats, StateReader, TxPool};
use gateway_rpc::ApiError;
use gateway_rpc_types::{BlockResponse, BlockTransactions};
use serde::Deserialize;

#[derive(Deserialize, Default)]
pub struct BlockQuery {
    #[serde(default)]
    pub expanded: bool,
}

pub async fn get_block<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Path(revision): Path<String>,
    Query(q): Query<BlockQuery>,
) -> Result<Json<BlockResponse>, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let revision = state.revision.parse(&revision)?;
    let summary = state.revision.resolve(revision)?;
    let header = &summary.header;
    let number = header.number();

    let is_trunk = state
        .chain
        .block_by_number(number)
        .map_err(ApiError::from)?
        .map(|canonical| canonical.header.id == header.id)
        .unwrap_or(false);
    let is_finalized = state
        .chain
        .finalized_block()
        .map(|finalized| finalized.header.number() >= number)
        .unwrap_or(false);

    let transactions = if q.expanded {
        let mut expanded = Vec::with_capacity(summary.tx_ids.len());
        for tx_id in &summary.tx_ids {
            let loc = state
                .chain
                .transaction(*tx_id)
                .map_err(ApiError::from)?
                .ok_or_else(|| ApiError::not_found("transaction not found"))?;
            expanded.push(transaction_response(&loc, header.timestamp));
        }
        BlockTransactions::Expanded(expanded)
    } else {
        BlockTransactions::Ids(summary.tx_ids.clone())
    };

    Ok(Json(BlockResponse {
        number: number as u64,
        id: header.id.into(),
        size: summary.size,
        parent_id: header.parent_id.into(),
        timestamp: header.timestamp,
        gas_limit: header.gas_limit,
        beneficiary: header.beneficiary,
        gas_used: header.gas_used,
        total_score: header.total_score,
        txs_root: header.txs_root,
        txs_features: header.txs_features,
        state_root: header.state_root,
        receipts_root: header.receipts_root,
        signer: header.signer,
        com: header.com,
        is_trunk,
        is_finalized,
        transactions,
    }))
}
