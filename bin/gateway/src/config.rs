//! CLI flags, config-file overlay, and environment fallback for the
//! gateway binary (§10.4). Mirrors the teacher's `clap::Args` +
//! `serde::Deserialize` combination (`EthConfig`) so the same struct reads
//! from a TOML file and from the command line: CLI flag > environment
//! variable > file value > [`gateway_rpc_builder::ServerConfig::default`].

use clap::Parser;
use gateway_primitives::BlockId;
use gateway_rpc_builder::ServerConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "gateway", about = "Chain read/observe HTTP+WS gateway", version)]
pub struct Cli {
    /// TOML file with any subset of the flags below; CLI flags and
    /// environment variables both take precedence over its values.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub args: GatewayArgs,
}

#[derive(Debug, Clone, Default, Parser, Deserialize)]
pub struct GatewayArgs {
    /// Address the HTTP/WS server binds to.
    #[arg(long, env = "GATEWAY_BIND")]
    pub bind: Option<SocketAddr>,

    /// Initial log level (`trace`/`debug`/`info`/`warn`/`error`/`crit`).
    #[arg(long, env = "GATEWAY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// §4.9 step 2: max `bestNumber - cursorNumber` a subscription cursor
    /// may lag before it's rejected.
    #[arg(long, env = "GATEWAY_BACKTRACE_LIMIT")]
    pub backtrace_limit: Option<u32>,

    /// Spacing between blocks in seconds.
    #[arg(long, env = "GATEWAY_BLOCK_INTERVAL_SECONDS")]
    pub block_interval_seconds: Option<u64>,

    /// Depth of the fees-history ring cache.
    #[arg(long, env = "GATEWAY_FEES_CACHE_SIZE")]
    pub fees_cache_size: Option<usize>,

    /// Capacity of the beat/beat2 message cache.
    #[arg(long, env = "GATEWAY_MESSAGE_CACHE_SIZE")]
    pub message_cache_size: Option<usize>,

    /// Server-side cap on `options.limit` for log filter queries.
    #[arg(long, env = "GATEWAY_LOG_FILTER_LIMIT")]
    pub log_filter_limit: Option<usize>,

    /// `413` threshold for request bodies, in bytes.
    #[arg(long, env = "GATEWAY_REQUEST_BODY_LIMIT_BYTES")]
    pub request_body_limit_bytes: Option<usize>,

    /// `408` threshold, in seconds.
    #[arg(long, env = "GATEWAY_REQUEST_TIMEOUT_SECONDS")]
    pub request_timeout_seconds: Option<u64>,

    /// Comma-separated list of allowed CORS origins; empty means
    /// same-origin only.
    #[arg(long, value_delimiter = ',', env = "GATEWAY_CORS_ALLOWED_ORIGINS")]
    pub cors_allowed_origins: Option<Vec<String>>,

    /// This node's genesis block id (0x-prefixed 32-byte hex), checked
    /// against the `x-genesis-id` header/query parameter.
    #[arg(long, env = "GATEWAY_GENESIS_ID")]
    pub genesis_id: Option<String>,

    /// Echoed as `x-api-version` on every response.
    #[arg(long, env = "GATEWAY_API_VERSION")]
    pub api_version: Option<String>,
}

impl GatewayArgs {
    /// `self` wins over `file` wherever `self` set a value (CLI flags and
    /// environment variables are already folded into `self` by `clap`).
    fn merge_over(self, file: GatewayArgs) -> GatewayArgs {
        GatewayArgs {
            bind: self.bind.or(file.bind),
            log_level: self.log_level.or(file.log_level),
            backtrace_limit: self.backtrace_limit.or(file.backtrace_limit),
            block_interval_seconds: self.block_interval_seconds.or(file.block_interval_seconds),
            fees_cache_size: self.fees_cache_size.or(file.fees_cache_size),
            message_cache_size: self.message_cache_size.or(file.message_cache_size),
            log_filter_limit: self.log_filter_limit.or(file.log_filter_limit),
            request_body_limit_bytes: self.request_body_limit_bytes.or(file.request_body_limit_bytes),
            request_timeout_seconds: self.request_timeout_seconds.or(file.request_timeout_seconds),
            cors_allowed_origins: self.cors_allowed_origins.or(file.cors_allowed_origins),
            genesis_id: self.genesis_id.or(file.genesis_id),
            api_version: self.api_version.or(file.api_version),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid genesis id {0:?}")]
    GenesisId(String),
}

pub const DEFAULT_BIND: &str = "0.0.0.0:8669";

/// Resolved configuration: the bind address (not part of `ServerConfig`,
/// which has no opinion on transport) plus the server knobs.
pub struct ResolvedConfig {
    pub bind: SocketAddr,
    pub log_level: gateway_tracing::LogLevel,
    pub server: ServerConfig,
}

pub fn resolve(cli: Cli) -> Result<ResolvedConfig, ConfigError> {
    let file_args = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read { path: path.clone(), source: e })?;
            toml::from_str(&text).map_err(|e| ConfigError::Parse { path: path.clone(), source: e })?
        }
        None => GatewayArgs::default(),
    };
    let merged = cli.args.merge_over(file_args);

    let default = ServerConfig::default();
    let mut server = ServerConfig {
        backtrace_limit: merged.backtrace_limit.unwrap_or(default.backtrace_limit),
        block_interval_seconds: merged.block_interval_seconds.unwrap_or(default.block_interval_seconds),
        fees_cache_size: merged.fees_cache_size.unwrap_or(default.fees_cache_size),
        message_cache_size: merged.message_cache_size.unwrap_or(default.message_cache_size),
        log_filter_limit: merged.log_filter_limit.unwrap_or(default.log_filter_limit),
        request_body_limit_bytes: merged.request_body_limit_bytes.unwrap_or(default.request_body_limit_bytes),
        request_timeout: merged
            .request_timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(default.request_timeout),
        pong_wait: default.pong_wait,
        ws_read_limit_bytes: default.ws_read_limit_bytes,
        ws_send_buffer: default.ws_send_buffer,
        cors_allowed_origins: merged.cors_allowed_origins.unwrap_or(default.cors_allowed_origins),
        genesis_id: default.genesis_id,
        api_version: merged.api_version.unwrap_or(default.api_version),
    };
    if let Some(raw) = merged.genesis_id.as_deref() {
        let id = alloy_primitives::B256::from_str(raw).map_err(|_| ConfigError::GenesisId(raw.to_string()))?;
        server.genesis_id = BlockId::from(id);
    }

    let log_level = merged
        .log_level
        .as_deref()
        .map(|s| s.parse().unwrap_or(gateway_tracing::LogLevel::Info))
        .unwrap_or(gateway_tracing::LogLevel::Info);

    let bind = merged.bind.unwrap_or_else(|| DEFAULT_BIND.parse().expect("valid default bind address"));

    Ok(ResolvedConfig { bind, log_level, server })
}
