//! `/accounts/*` (§4.2, §4.13): balance/energy/hasCode, code, storage, and
//! the read-only multi-clause call simulation.

use crate::convert::{event_dto_from_entry, transfer_dto_from_entry};
use crate::error::HttpError;
use crate::params::parse_address;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use gateway_chain_api::{CallClause, ChainRepository, Executor, ForkConfig, LogDb, PeerStats, StateReader, TxPool};
use gateway_primitives::{EventLogEntry, TransferLogEntry};
use gateway_rpc_types::{AccountResponse, CallRequest, CallResultDto, CodeResponse, StorageResponse};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct RevisionQuery {
    #[serde(default = "default_revision")]
    pub revision: String,
}

fn default_revision() -> String {
    "best".to_string()
}

pub async fn get_account<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Path(addr): Path<String>,
    Query(q): Query<RevisionQuery>,
) -> Result<Json<AccountResponse>, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let address = parse_address(&addr)?;
    let revision = state.revision.parse(&q.revision)?;
    let summary = state.revision.resolve(revision)?;
    let account = state.state.account(summary.header.state_root, address).await?;
    Ok(Json(AccountResponse { balance: account.balance, energy: account.energy, has_code: account.has_code }))
}

pub async fn get_code<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Path(addr): Path<String>,
    Query(q): Query<RevisionQuery>,
) -> Result<Json<CodeResponse>, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let address = parse_address(&addr)?;
    let revision = state.revision.parse(&q.revision)?;
    let summary = state.revision.resolve(revision)?;
    let code = state.state.code(summary.header.state_root, address).await?;
    Ok(Json(CodeResponse { code }))
}

pub async fn get_storage<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Path((addr, key)): Path<(String, String)>,
    Query(q): Query<RevisionQuery>,
) -> Result<Json<StorageResponse>, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let address = parse_address(&addr)?;
    let slot = crate::params::parse_b256(&key)?;
    let revision = state.revision.parse(&q.revision)?;
    let summary = state.revision.resolve(revision)?;
    let value = state.state.storage(summary.header.state_root, address, slot).await?;
    Ok(Json(StorageResponse { value }))
}

pub async fn call_clauses<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Query(q): Query<RevisionQuery>,
    Json(body): Json<CallRequest>,
) -> Result<Json<Vec<CallResultDto>>, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let revision = state.revision.parse(&q.revision)?;
    let summary = state.revision.resolve(revision)?;
    let clauses: Vec<CallClause> =
        body.clauses.into_iter().map(|c| CallClause { to: c.to, value: c.value, data: c.data }).collect();
    let results = state
        .executor
        .call(summary.header.state_root, body.caller, body.gas, &clauses)
        .await
        .map_err(gateway_rpc::ApiError::from)?;
    let dtos = results
        .into_iter()
        .map(|r| CallResultDto {
            data: r.data,
            events: r.events.into_iter().map(|e| event_dto_from_entry(&as_event_entry(e), true)).collect(),
            transfers: r.transfers.into_iter().map(|t| transfer_dto_from_entry(&as_transfer_entry(t), true)).collect(),
            gas_used: r.gas_used,
            reverted: r.reverted,
            vm_error: r.vm_error,
        })
        .collect();
    Ok(Json(dtos))
}

/// A call's events/transfers carry no per-log meta (they weren't mined into
/// a block), so wrap them in the zero-value meta before reusing the shared
/// DTO mappers.
fn as_event_entry(log: gateway_primitives::Log) -> EventLogEntry {
    let mut topics: [Option<alloy_primitives::B256>; gateway_primitives::MAX_TOPICS] = Default::default();
    for (slot, topic) in topics.iter_mut().zip(log.topics.into_iter()) {
        *slot = Some(topic);
    }
    EventLogEntry { address: log.address, topics, data: log.data, meta: Default::default() }
}

fn as_transfer_entry(t: gateway_primitives::Transfer) -> TransferLogEntry {
    TransferLogEntry { sender: t.sender, recipient: t.recipient, amount: t.amount, meta: Default::default() }
}
