//! `/admin/*` and `/node/network/peers` (§4.12, §10.6).

use crate::error::HttpError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use gateway_chain_api::{ChainRepository, Executor, ForkConfig, LogDb, PeerStats, StateReader, TxPool};
use gateway_rpc::ApiError;
use gateway_rpc_types::{
    AdminApiLogsBody, AdminApiLogsResponse, AdminLogLevelBody, AdminLogLevelResponse, HealthResponseDto,
    PeerStatsDto,
};
use std::str::FromStr;

pub async fn get_log_level<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
) -> Json<AdminLogLevelResponse>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    Json(AdminLogLevelResponse { level: state.admin.log_level().to_string() })
}

pub async fn set_log_level<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Json(body): Json<AdminLogLevelBody>,
) -> Result<Json<AdminLogLevelResponse>, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let level = gateway_tracing::LogLevel::from_str(&body.level)
        .map_err(|_| ApiError::invalid_input(format!("unknown log level: {}", body.level)))?;
    state.admin.set_log_level(level);
    Ok(Json(AdminLogLevelResponse { level: level.to_string() }))
}

pub async fn get_api_logs<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
) -> Json<AdminApiLogsResponse>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    Json(AdminApiLogsResponse { enabled: state.admin.api_logs_enabled() })
}

pub async fn set_api_logs<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Json(body): Json<AdminApiLogsBody>,
) -> Json<AdminApiLogsResponse>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    state.admin.set_api_logs_enabled(body.enabled);
    Json(AdminApiLogsResponse { enabled: body.enabled })
}

pub async fn health<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
) -> Json<HealthResponseDto>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let status = state.admin.health();
    Json(HealthResponseDto {
        healthy: status.healthy,
        best_block_time: status.best_block_time,
        peer_count: status.peer_count,
        is_network_progressing: status.is_network_progressing,
    })
}

/// `GET /node/network/peers` (§10.6 supplement): thin passthrough to the
/// `PeerStats` collaborator, read-only.
pub async fn peers<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
) -> Json<Vec<PeerStatsDto>>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let dtos = state
        .peers
        .peers()
        .into_iter()
        .map(|p| PeerStatsDto { id: p.id, best_block_id: p.best_block_id.into(), inbound: p.inbound })
        .collect();
    Json(dtos)
}
