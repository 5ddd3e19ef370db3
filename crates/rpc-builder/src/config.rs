use gateway_primitives::BlockId;
use std::time::Duration;

/// The HTTP/WS serving knobs this crate enforces (§6.2, §6.4, §10.4).
/// `bin/gateway`'s `GatewayConfig` loads these from CLI/file/env and
/// passes a `ServerConfig` down to [`crate::build_router`]; this crate has
/// no opinion on where the values came from.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// §4.9 step 2: `bestNumber - cursorNumber` beyond this is rejected.
    pub backtrace_limit: u32,
    /// Spacing between blocks in seconds; drives the `next` revision's
    /// synthetic timestamp (§4.1), the pending-tx dedupe TTL (§4.10,
    /// `blockInterval / 2`) and the ping interval's 60s default isn't
    /// derived from it, but `isNetworkProgressing` (§4.12) is.
    pub block_interval_seconds: u64,
    /// Depth of the fees-history ring cache (§3, §4.11).
    pub fees_cache_size: usize,
    /// Capacity of the beat/beat2 message cache (§4.6).
    pub message_cache_size: usize,
    /// Server-side cap on `options.limit` for `/logs/event` and
    /// `/logs/transfer` (§4.5).
    pub log_filter_limit: usize,
    /// `413 Payload Too Large` threshold for request bodies (§6.2).
    pub request_body_limit_bytes: usize,
    /// `408 Request Timeout` threshold (§6.2).
    pub request_timeout: Duration,
    /// WebSocket pong wait; missing pongs terminate the connection (§4.9
    /// step 4). Ping ticks fire at `pong_wait * 7 / 10`.
    pub pong_wait: Duration,
    /// Maximum inbound WebSocket frame size (§4.9 step 4: "100 KB").
    pub ws_read_limit_bytes: usize,
    /// Buffer size of each subscriber's outbound channel.
    pub ws_send_buffer: usize,
    /// CORS allowed origins (§6.4); empty means same-origin only.
    pub cors_allowed_origins: Vec<String>,
    /// This node's genesis block id, checked against `x-genesis-id`
    /// (§6.4).
    pub genesis_id: BlockId,
    /// Echoed in every response's `x-thorest-ver`-equivalent header
    /// (§6.4); named `x-api-version` here (see `SPEC_FULL.md` §10.6).
    pub api_version: String,
}

impl ServerConfig {
    /// `blockInterval / 2`, the pending-tx dedupe TTL (§4.10).
    pub fn pending_tx_dedupe_ttl_seconds(&self) -> u64 {
        self.block_interval_seconds / 2
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            backtrace_limit: 65_535,
            block_interval_seconds: 10,
            fees_cache_size: 1024,
            message_cache_size: 1000,
            log_filter_limit: 1000,
            request_body_limit_bytes: 10 * 1024 * 1024,
            request_timeout: Duration::from_secs(30),
            pong_wait: Duration::from_secs(60),
            ws_read_limit_bytes: 100 * 1024,
            ws_send_buffer: 64,
            cors_allowed_origins: Vec::new(),
            genesis_id: BlockId::default(),
            api_version: "1.0.0".to_string(),
        }
    }
}
