//! Wires `gateway-rpc`'s core logic into an `axum::Router`: route tables,
//! the subscription hub, CORS, body-size/timeout layers, and the
//! `x-genesis-id`/`x-api-version` boundary middleware (§6, §10.6).

pub mod config;
pub mod convert;
pub mod error;
pub mod params;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use state::AppState;

use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::extract::{DefaultBodyLimit, State as ExtractState};
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{BoxError, Router};
use gateway_chain_api::{ChainRepository, Executor, ForkConfig, LogDb, PeerStats, StateReader, TxPool};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

const GENESIS_ID_HEADER: &str = "x-genesis-id";
const API_VERSION_HEADER: &str = "x-api-version";

/// Assembles the full HTTP/WS surface (§6.1's route table) over one
/// monomorphized collaborator set. `bin/gateway` calls this once at
/// startup after constructing an [`AppState`].
pub fn build_router<C, S, D, Pool, P, X, F>(state: AppState<C, S, D, Pool, P, X, F>) -> Router
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let config = Arc::clone(&state.config);

    let router = Router::new()
        .route(
            "/accounts/:address",
            get(routes::accounts::get_account).post(routes::accounts::call_clauses),
        )
        .route("/accounts/:address/code", get(routes::accounts::get_code))
        .route("/accounts/:address/storage/:key", get(routes::accounts::get_storage))
        .route("/blocks/:revision", get(routes::blocks::get_block))
        .route("/transactions", post(routes::transactions::submit_transaction))
        .route("/transactions/:id", get(routes::transactions::get_transaction_dispatch))
        .route("/transactions/:id/receipt", get(routes::transactions::get_receipt))
        .route("/logs/event", post(routes::logs::filter_events))
        .route("/logs/transfer", post(routes::logs::filter_transfers))
        .route("/fees/history", get(routes::fees::fees_history))
        .route("/node/network/peers", get(routes::admin::peers))
        .route("/subscriptions/block", get(routes::subscriptions::subscribe_block))
        .route("/subscriptions/event", get(routes::subscriptions::subscribe_event))
        .route("/subscriptions/transfer", get(routes::subscriptions::subscribe_transfer))
        .route("/subscriptions/beat", get(routes::subscriptions::subscribe_beat))
        .route("/subscriptions/beat2", get(routes::subscriptions::subscribe_beat2))
        .route("/subscriptions/txpool", get(routes::subscriptions::subscribe_txpool))
        .route(
            "/admin/loglevel",
            get(routes::admin::get_log_level).post(routes::admin::set_log_level),
        )
        .route(
            "/admin/apilogs",
            get(routes::admin::get_api_logs).post(routes::admin::set_api_logs),
        )
        .route("/admin/health", get(routes::admin::health))
        .with_state(state);

    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout_error))
            .layer(TimeoutLayer::new(config.request_timeout))
            .layer(cors_layer(&config))
            .layer(DefaultBodyLimit::max(config.request_body_limit_bytes))
            .layer(middleware::from_fn_with_state(Arc::clone(&config), genesis_and_version_middleware)),
    )
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = if config.cors_allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(config.cors_allowed_origins.iter().filter_map(|o| o.parse().ok()))
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::HeaderName::from_static(GENESIS_ID_HEADER)])
        .expose_headers([
            axum::http::HeaderName::from_static(GENESIS_ID_HEADER),
            axum::http::HeaderName::from_static(API_VERSION_HEADER),
        ])
}

async fn handle_timeout_error(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        error::request_timeout()
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("unhandled error: {err}\n")).into_response()
    }
}

/// §6.4: validates `x-genesis-id` (header or query parameter) when present,
/// and stamps every response with the node's genesis id and API version.
async fn genesis_and_version_middleware(
    ExtractState(config): ExtractState<Arc<ServerConfig>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let genesis_id = config.genesis_id.to_string();
    let provided = req
        .headers()
        .get(GENESIS_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().query().and_then(|q| query_param(q, GENESIS_ID_HEADER)));

    if let Some(provided) = provided {
        if provided != genesis_id {
            return error::genesis_id_mismatch();
        }
    }

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&genesis_id) {
        headers.insert(GENESIS_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&config.api_version) {
        headers.insert(API_VERSION_HEADER, value);
    }
    response
}

/// Minimal `key=value&...` query-string lookup; avoids pulling in a full
/// form-encoding crate just to read one optional parameter.
fn query_param(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_reads_first_match() {
        assert_eq!(query_param("a=1&x-genesis-id=0xabc&b=2", "x-genesis-id"), Some("0xabc".to_string()));
        assert_eq!(query_param("a=1", "x-genesis-id"), None);
    }
}
