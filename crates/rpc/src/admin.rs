//! Admin surface (§4.12): live log-level control, an API-access-log
//! toggle, and a health probe used by operators and orchestrators.

use gateway_chain_api::{ChainRepository, PeerStats};
use gateway_tracing::{LevelHandle, LogLevel};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// `{healthy, bestBlockTime, peerCount, isNetworkProgressing}` (§4.12).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub best_block_time: u64,
    pub peer_count: usize,
    pub is_network_progressing: bool,
}

/// The admin surface's collaborators: the live log filter, a toggle for
/// per-request access logging, the chain repository (best block timestamp)
/// and peer stats (health probe's `peerCount`).
pub struct AdminApi<C, P> {
    chain: Arc<C>,
    peers: Arc<P>,
    log_level: LevelHandle,
    api_logs_enabled: AtomicBool,
    block_interval: u64,
}

impl<C: ChainRepository, P: PeerStats> AdminApi<C, P> {
    pub fn new(chain: Arc<C>, peers: Arc<P>, log_level: LevelHandle, block_interval: u64) -> Self {
        Self { chain, peers, log_level, api_logs_enabled: AtomicBool::new(false), block_interval }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.level()
    }

    /// Updates the live log level, returning the previous one.
    pub fn set_log_level(&self, level: LogLevel) -> LogLevel {
        self.log_level.set_level(level)
    }

    pub fn api_logs_enabled(&self) -> bool {
        self.api_logs_enabled.load(Ordering::Relaxed)
    }

    pub fn set_api_logs_enabled(&self, enabled: bool) {
        self.api_logs_enabled.store(enabled, Ordering::Relaxed);
    }

    /// A chain is "progressing" when its best block is younger than two
    /// block intervals (§4.12); `healthy` mirrors that same condition since
    /// this gateway has no other liveness signal of its own.
    pub fn health(&self) -> HealthStatus {
        let best_block_time = self.chain.best_block().header.timestamp;
        let now = now_unix();
        let is_network_progressing = now.saturating_sub(best_block_time) < 2 * self.block_interval;
        HealthStatus {
            healthy: is_network_progressing,
            best_block_time,
            peer_count: self.peers.peer_count(),
            is_network_progressing,
        }
    }
}

fn now_unix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_chain_api::testing::{InMemoryChain, InMemoryPeers};
    use gateway_primitives::{BlockHeader, BlockId, BlockSummary};

    fn genesis_at(timestamp: u64) -> BlockSummary {
        BlockSummary {
            header: BlockHeader {
                id: BlockId::default(),
                parent_id: BlockId::default(),
                timestamp,
                gas_used: 0,
                gas_limit: 10_000_000,
                base_fee_per_gas: None,
                txs_root: Default::default(),
                state_root: Default::default(),
                receipts_root: Default::default(),
                total_score: 0,
                beneficiary: Default::default(),
                signer: None,
                com: false,
                txs_features: 0,
            },
            tx_ids: vec![],
            size: 0,
        }
    }

    fn level_handle() -> LevelHandle {
        // `gateway_tracing::init` installs a process-wide global subscriber
        // and can only succeed once per test binary; tests in this module
        // run concurrently, so share one `LevelHandle` behind a `OnceLock`
        // rather than each calling `init` directly.
        static HANDLE: std::sync::OnceLock<LevelHandle> = std::sync::OnceLock::new();
        HANDLE.get_or_init(|| gateway_tracing::init(LogLevel::Info).expect("init once")).clone()
    }

    #[test]
    fn stale_best_block_is_unhealthy() {
        let chain = Arc::new(InMemoryChain::new(genesis_at(0)));
        let peers = Arc::new(InMemoryPeers::new());
        let admin = AdminApi::new(chain, peers, level_handle(), 10);
        let health = admin.health();
        assert!(!health.healthy);
        assert!(!health.is_network_progressing);
    }

    #[test]
    fn log_level_round_trips() {
        let chain = Arc::new(InMemoryChain::new(genesis_at(0)));
        let peers = Arc::new(InMemoryPeers::new());
        let admin = AdminApi::new(chain, peers, level_handle(), 10);
        let previous = admin.set_log_level(LogLevel::Debug);
        assert_eq!(admin.log_level(), LogLevel::Debug);
        let _ = previous;
    }

    #[test]
    fn api_logs_toggle_defaults_off() {
        let chain = Arc::new(InMemoryChain::new(genesis_at(0)));
        let peers = Arc::new(InMemoryPeers::new());
        let admin = AdminApi::new(chain, peers, level_handle(), 10);
        assert!(!admin.api_logs_enabled());
        admin.set_api_logs_enabled(true);
        assert!(admin.api_logs_enabled());
    }

    #[test]
    fn health_reports_peer_count() {
        let chain = Arc::new(InMemoryChain::new(genesis_at(0)));
        let peers = Arc::new(InMemoryPeers::new());
        peers.set_peers(vec![
            gateway_chain_api::PeerInfo { id: "a".into(), best_block_id: BlockId::default(), inbound: true },
            gateway_chain_api::PeerInfo { id: "b".into(), best_block_id: BlockId::default(), inbound: false },
        ]);
        let admin = AdminApi::new(chain, peers, level_handle(), 10);
        assert_eq!(admin.health().peer_count, 2);
    }
}
