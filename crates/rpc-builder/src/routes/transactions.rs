//! `/transactions/*` (§4.3, §6.1): read, raw re-encode, receipt, submit.

use crate::convert::{receipt_response, transaction_response};
use crate::error::HttpError;
use crate::params::parse_b256;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use gateway_chain_api::{ChainRepository, Executor, ForkConfig, LogDb, PeerStats, StateReader, TxPool};
use gateway_rpc::ApiError;
use gateway_rpc_types::{RawTransactionResponse, SubmitTransactionRequest, SubmitTransactionResponse, TransactionResponse};
use serde::Deserialize;

#[derive(Deserialize, Default)]
pub struct TransactionQuery {
    #[serde(default)]
    pub raw: bool,
    #[serde(default)]
    pub head: Option<String>,
    #[serde(default)]
    pub pending: bool,
}

/// `GET /transactions/{id}` (§6.1): the wire contract is a single route
/// whose `raw` query flag picks between [`get_transaction`]'s decoded body
/// and [`get_raw_transaction`]'s RLP body, so the router mounts this
/// dispatcher rather than either handler directly.
pub async fn get_transaction_dispatch<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Path(id): Path<String>,
    Query(q): Query<TransactionQuery>,
) -> Result<Response, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    if q.raw {
        let body = get_raw_transaction(State(state), Path(id)).await?;
        Ok(body.into_response())
    } else {
        let body = get_transaction(State(state), Path(id), Query(q)).await?;
        Ok(body.into_response())
    }
}

pub async fn get_transaction<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Path(id): Path<String>,
    Query(q): Query<TransactionQuery>,
) -> Result<Json<TransactionResponse>, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    // `head`/`pending` narrow the lookup against a specific block's chain
    // state or the mempool in the original API; this gateway only reads
    // committed chain state, so both are accepted and ignored rather than
    // rejected as unknown query params.
    let _ = q;
    let tx_id = parse_b256(&id)?;
    let loc = state
        .chain
        .transaction(tx_id)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("transaction not found"))?;
    let timestamp = block_timestamp(&state, loc.block_id)?;
    Ok(Json(transaction_response(&loc, timestamp)))
}

pub async fn get_raw_transaction<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Path(id): Path<String>,
) -> Result<Json<RawTransactionResponse>, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let tx_id = parse_b256(&id)?;
    let loc = state
        .chain
        .transaction(tx_id)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("transaction not found"))?;
    let timestamp = block_timestamp(&state, loc.block_id)?;
    let raw = gateway_rpc::encode_raw(&loc.tx);
    let meta = Some(transaction_response(&loc, timestamp).meta);
    Ok(Json(RawTransactionResponse { raw, meta }))
}

pub async fn get_receipt<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Path(id): Path<String>,
) -> Result<Json<gateway_rpc_types::ReceiptResponse>, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let tx_id = parse_b256(&id)?;
    let loc = state
        .chain
        .transaction(tx_id)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("transaction not found"))?;
    let timestamp = block_timestamp(&state, loc.block_id)?;
    let receipts = state
        .chain
        .receipts(loc.block_id)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("receipts not found"))?;
    let index = block_tx_index(&state, loc.block_id, tx_id)?;
    let receipt = receipts.get(index).ok_or_else(|| ApiError::not_found("receipt not found"))?;
    let meta = transaction_response(&loc, timestamp).meta;
    Ok(Json(receipt_response(receipt, meta)))
}

pub async fn submit_transaction<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Json(body): Json<SubmitTransactionRequest>,
) -> Result<Json<SubmitTransactionResponse>, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    // Validate the RLP shape before handing raw bytes to the pool, so a
    // malformed payload is rejected with the same `invalid input` message
    // as every other decode failure rather than an opaque pool error.
    let _ = gateway_rpc::decode_raw(&body.raw)?;
    let id = state.txpool.add_local(body.raw).await.map_err(ApiError::from)?;
    Ok(Json(SubmitTransactionResponse { id }))
}

fn block_timestamp<C, S, D, Pool, P, X, F>(
    state: &AppState<C, S, D, Pool, P, X, F>,
    block_id: gateway_primitives::BlockId,
) -> Result<u64, HttpError>
where
    C: ChainRepository,
{
    let summary = state
        .chain
        .block_by_number(block_id.number())
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("block not found"))?;
    Ok(summary.header.timestamp)
}

fn block_tx_index<C, S, D, Pool, P, X, F>(
    state: &AppState<C, S, D, Pool, P, X, F>,
    block_id: gateway_primitives::BlockId,
    tx_id: gateway_primitives::TxId,
) -> Result<usize, HttpError>
where
    C: ChainRepository,
{
    let summary = state
        .chain
        .block_by_number(block_id.number())
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("block not found"))?;
    let index = summary
        .tx_ids
        .iter()
        .position(|id| *id == tx_id)
        .ok_or_else(|| ApiError::not_found("transaction not found in block"))?;
    Ok(index)
}
