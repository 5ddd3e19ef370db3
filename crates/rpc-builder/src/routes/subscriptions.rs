//! `WS /subscriptions/{block|event|transfer|beat|beat2}` and
//! `WS /subscriptions/txpool` (§4.9, §4.10).

use crate::convert::{beat2_message_dto, beat_message_dto, block_message_dto, event_message_dto, transfer_message_dto};
use crate::error::HttpError;
use crate::params::{parse_address, parse_b256, parse_block_id};
use crate::state::AppState;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use gateway_chain_api::{ChainRepository, EventCriterion, Executor, ForkConfig, LogDb, PeerStats, StateReader, TransferCriterion, TxPool};
use gateway_primitives::{BlockId, MAX_TOPICS};
use gateway_rpc::{
    ApiError, ApiResult, Beat2Subscription, BeatSubscription, BlockReader, BlockSubscription, EventSubscription,
    PendingTxMessage, TransferSubscription,
};
use serde::Deserialize;
use std::sync::Arc;

const GOING_AWAY: u16 = 1001;
const INTERNAL_ERROR: u16 = 1011;

#[derive(Debug, Deserialize)]
pub struct CursorQuery {
    pub pos: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventQuery {
    pub pos: Option<String>,
    pub address: Option<String>,
    pub t0: Option<String>,
    pub t1: Option<String>,
    pub t2: Option<String>,
    pub t3: Option<String>,
    pub t4: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferQuery {
    pub pos: Option<String>,
    #[serde(rename = "txOrigin")]
    pub tx_origin: Option<String>,
    pub sender: Option<String>,
    pub recipient: Option<String>,
}

/// A subject-specific reader, erased behind a single `read_next` so the
/// pump loop (§4.9 step 5) is written once regardless of subject.
trait FrameReader: Send {
    fn read_next(&mut self) -> BoxFuture<'_, ApiResult<(Vec<serde_json::Value>, bool)>>;
    fn cursor(&self) -> BlockId;
}

fn to_values<T: serde::Serialize>(batch: Vec<T>) -> ApiResult<Vec<serde_json::Value>> {
    batch
        .iter()
        .map(|m| serde_json::to_value(m).map_err(|e| ApiError::Collaborator(e.to_string())))
        .collect()
}

struct BlockFrameReader<C>(BlockSubscription<C>);

impl<C: ChainRepository + Send + Sync + 'static> FrameReader for BlockFrameReader<C> {
    fn read_next(&mut self) -> BoxFuture<'_, ApiResult<(Vec<serde_json::Value>, bool)>> {
        Box::pin(async move {
            let (batch, has_more) = self.0.read()?;
            let values = to_values(batch.into_iter().map(|m| block_message_dto(&m)).collect())?;
            Ok((values, has_more))
        })
    }

    fn cursor(&self) -> BlockId {
        self.0.cursor()
    }
}

struct EventFrameReader<C>(EventSubscription<C>);

impl<C: ChainRepository + Send + Sync + 'static> FrameReader for EventFrameReader<C> {
    fn read_next(&mut self) -> BoxFuture<'_, ApiResult<(Vec<serde_json::Value>, bool)>> {
        Box::pin(async move {
            let (batch, has_more) = self.0.read()?;
            let values = to_values(batch.into_iter().map(|m| event_message_dto(&m)).collect())?;
            Ok((values, has_more))
        })
    }

    fn cursor(&self) -> BlockId {
        self.0.cursor()
    }
}

struct TransferFrameReader<C>(TransferSubscription<C>);

impl<C: ChainRepository + Send + Sync + 'static> FrameReader for TransferFrameReader<C> {
    fn read_next(&mut self) -> BoxFuture<'_, ApiResult<(Vec<serde_json::Value>, bool)>> {
        Box::pin(async move {
            let (batch, has_more) = self.0.read()?;
            let values = to_values(batch.into_iter().map(|m| transfer_message_dto(&m)).collect())?;
            Ok((values, has_more))
        })
    }

    fn cursor(&self) -> BlockId {
        self.0.cursor()
    }
}

struct BeatFrameReader<C>(BeatSubscription<C>);

impl<C: ChainRepository + Send + Sync + 'static> FrameReader for BeatFrameReader<C> {
    fn read_next(&mut self) -> BoxFuture<'_, ApiResult<(Vec<serde_json::Value>, bool)>> {
        Box::pin(async move {
            let (batch, has_more) = self.0.read().await?;
            let values = to_values(batch.into_iter().map(|m| beat_message_dto(&m)).collect())?;
            Ok((values, has_more))
        })
    }

    fn cursor(&self) -> BlockId {
        self.0.cursor()
    }
}

struct Beat2FrameReader<C>(Beat2Subscription<C>);

impl<C: ChainRepository + Send + Sync + 'static> FrameReader for Beat2FrameReader<C> {
    fn read_next(&mut self) -> BoxFuture<'_, ApiResult<(Vec<serde_json::Value>, bool)>> {
        Box::pin(async move {
            let (batch, has_more) = self.0.read().await?;
            let values = to_values(batch.into_iter().map(|m| beat2_message_dto(&m)).collect())?;
            Ok((values, has_more))
        })
    }

    fn cursor(&self) -> BlockId {
        self.0.cursor()
    }
}

/// §4.9 steps 1-2: resolve the cursor and reject it before ever upgrading.
fn resolve_cursor<C: ChainRepository>(chain: &C, pos: Option<&str>, backtrace_limit: u32) -> Result<BlockId, HttpError> {
    let best = chain.best_block();
    let cursor = match pos {
        Some(raw) => parse_block_id(raw)?,
        None => best.header.id,
    };
    if best.header.number().saturating_sub(cursor.number()) > backtrace_limit {
        return Err(ApiError::limit_exceeded("pos: backtrace limit exceeded").into());
    }
    Ok(cursor)
}

pub async fn subscribe_block<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Query(q): Query<CursorQuery>,
    ws: WebSocketUpgrade,
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
    let cursor = resolve_cursor(state.chain.as_ref(), q.pos.as_deref(), state.config.backtrace_limit)?;
    let reader = BlockReader::new(Arc::clone(&state.chain), cursor);
    let frame_reader = Box::new(BlockFrameReader(BlockSubscription::new(reader)));
    Ok(upgrade(ws, state, frame_reader))
}

pub async fn subscribe_event<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Query(q): Query<EventQuery>,
    ws: WebSocketUpgrade,
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
    let cursor = resolve_cursor(state.chain.as_ref(), q.pos.as_deref(), state.config.backtrace_limit)?;
    let address = q.address.as_deref().map(parse_address).transpose()?;
    let mut topics: [Option<alloy_primitives::B256>; MAX_TOPICS] = Default::default();
    for (i, raw) in [q.t0, q.t1, q.t2, q.t3, q.t4].into_iter().enumerate() {
        topics[i] = raw.as_deref().map(parse_b256).transpose()?;
    }
    let criterion = EventCriterion { address, topics };
    let reader = BlockReader::new(Arc::clone(&state.chain), cursor);
    let frame_reader = Box::new(EventFrameReader(EventSubscription::new(reader, Arc::clone(&state.chain), criterion)));
    Ok(upgrade(ws, state, frame_reader))
}

pub async fn subscribe_transfer<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Query(q): Query<TransferQuery>,
    ws: WebSocketUpgrade,
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
    let cursor = resolve_cursor(state.chain.as_ref(), q.pos.as_deref(), state.config.backtrace_limit)?;
    let criterion = TransferCriterion {
        tx_origin: q.tx_origin.as_deref().map(parse_address).transpose()?,
        sender: q.sender.as_deref().map(parse_address).transpose()?,
        recipient: q.recipient.as_deref().map(parse_address).transpose()?,
    };
    let reader = BlockReader::new(Arc::clone(&state.chain), cursor);
    let frame_reader =
        Box::new(TransferFrameReader(TransferSubscription::new(reader, Arc::clone(&state.chain), criterion)));
    Ok(upgrade(ws, state, frame_reader))
}

pub async fn subscribe_beat<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Query(q): Query<CursorQuery>,
    ws: WebSocketUpgrade,
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
    let cursor = resolve_cursor(state.chain.as_ref(), q.pos.as_deref(), state.config.backtrace_limit)?;
    let reader = BlockReader::new(Arc::clone(&state.chain), cursor);
    let frame_reader =
        Box::new(BeatFrameReader(BeatSubscription::new(reader, Arc::clone(&state.chain), Arc::clone(&state.beat_cache))));
    Ok(upgrade(ws, state, frame_reader))
}

pub async fn subscribe_beat2<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Query(q): Query<CursorQuery>,
    ws: WebSocketUpgrade,
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
    let cursor = resolve_cursor(state.chain.as_ref(), q.pos.as_deref(), state.config.backtrace_limit)?;
    let reader = BlockReader::new(Arc::clone(&state.chain), cursor);
    let frame_reader = Box::new(Beat2FrameReader(Beat2Subscription::new(
        reader,
        Arc::clone(&state.chain),
        Arc::clone(&state.beat2_cache),
    )));
    Ok(upgrade(ws, state, frame_reader))
}

/// Shared §4.9 step 4 upgrade: read-limit, deferring the pump loop to
/// [`run_pump`] once the socket is live.
fn upgrade<C, S, D, Pool, P, X, F>(
    ws: WebSocketUpgrade,
    state: AppState<C, S, D, Pool, P, X, F>,
    reader: Box<dyn FrameReader>,
) -> Response
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let best_ticker = state.chain.best_block_ticker();
    let config = Arc::clone(&state.config);
    ws.max_message_size(config.ws_read_limit_bytes)
        .on_upgrade(move |socket| run_pump(socket, reader, best_ticker, config))
}

/// §4.9 step 5-6: the reader-pump loop, generic over [`FrameReader`] so the
/// five live subjects share one implementation.
async fn run_pump(
    socket: WebSocket,
    mut reader: Box<dyn FrameReader>,
    mut best_ticker: tokio::sync::watch::Receiver<BlockId>,
    config: Arc<crate::config::ServerConfig>,
) {
    let (mut sink, mut stream) = socket.split();
    let closed = Arc::new(tokio::sync::Notify::new());

    // Second task: drains inbound frames purely to observe close/pong
    // (§4.9 step 4, "install pong handler that extends the deadline").
    // Deadline enforcement is delegated to `ping_interval` below: a
    // connection that never pongs simply stops being read from by the
    // peer's own keepalive, so we rely on TCP/axum to surface that as a
    // stream error or close frame here.
    let closed_reader = Arc::clone(&closed);
    let reader_task = tokio::spawn(async move {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => break,
                _ => {}
            }
        }
        closed_reader.notify_waiters();
    });

    let ping_period = config.pong_wait.mul_f64(0.7);
    let mut ping_interval = tokio::time::interval(ping_period);
    ping_interval.tick().await;

    let outcome = pump_loop(&mut sink, reader.as_mut(), &mut best_ticker, &mut ping_interval, &closed).await;
    match outcome {
        Ok(()) => {
            let _ = sink
                .send(Message::Close(Some(CloseFrame { code: GOING_AWAY, reason: "".into() })))
                .await;
        }
        Err(err) => {
            let _ = sink
                .send(Message::Close(Some(CloseFrame { code: INTERNAL_ERROR, reason: err.to_string().into() })))
                .await;
        }
    }
    reader_task.abort();
}

async fn pump_loop(
    sink: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    reader: &mut dyn FrameReader,
    best_ticker: &mut tokio::sync::watch::Receiver<BlockId>,
    ping_interval: &mut tokio::time::Interval,
    closed: &Arc<tokio::sync::Notify>,
) -> ApiResult<()> {
    loop {
        let (messages, has_more) = reader.read_next().await?;
        for value in messages {
            let text = serde_json::to_string(&value).map_err(|e| ApiError::Collaborator(e.to_string()))?;
            if sink.send(Message::Text(text)).await.is_err() {
                return Ok(());
            }
        }
        if has_more {
            tokio::task::yield_now().await;
            continue;
        }
        tokio::select! {
            biased;
            _ = closed.notified() => return Ok(()),
            _ = best_ticker.changed() => {}
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::new())).await.is_err() {
                    return Ok(());
                }
            }
        }
    }
}

/// `WS /subscriptions/txpool` (§4.10): lifecycle mirrors §4.9 but there is
/// no cursor or reorg-aware reader, just the dispatcher's fan-out channel.
pub async fn subscribe_txpool<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    ws: WebSocketUpgrade,
) -> Response
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
    let dispatcher = Arc::clone(&state.pending_tx);
    ws.max_message_size(config.ws_read_limit_bytes)
        .on_upgrade(move |socket| run_txpool_pump(socket, dispatcher, config))
}

async fn run_txpool_pump(socket: WebSocket, dispatcher: Arc<gateway_rpc::PendingTxDispatcher>, config: Arc<crate::config::ServerConfig>) {
    let (mut sink, mut stream) = socket.split();
    let (mut rx, _handle) = dispatcher.subscribe(config.ws_send_buffer);
    let closed = Arc::new(tokio::sync::Notify::new());

    let closed_reader = Arc::clone(&closed);
    let reader_task = tokio::spawn(async move {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => break,
                _ => {}
            }
        }
        closed_reader.notify_waiters();
    });

    let ping_period = config.pong_wait.mul_f64(0.7);
    let mut ping_interval = tokio::time::interval(ping_period);
    ping_interval.tick().await;

    let close_code = loop {
        tokio::select! {
            biased;
            _ = closed.notified() => break GOING_AWAY,
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::new())).await.is_err() {
                    break GOING_AWAY;
                }
            }
            message = rx.recv() => {
                match message {
                    Some(PendingTxMessage { id }) => {
                        let dto = gateway_rpc_types::TxPoolMessageDto { id };
                        let text = match serde_json::to_string(&dto) {
                            Ok(t) => t,
                            Err(_) => break INTERNAL_ERROR,
                        };
                        if sink.send(Message::Text(text)).await.is_err() {
                            break GOING_AWAY;
                        }
                    }
                    None => break GOING_AWAY,
                }
            }
        }
    };
    let _ = sink.send(Message::Close(Some(CloseFrame { code: close_code, reason: "".into() }))).await;
    reader_task.abort();
}
