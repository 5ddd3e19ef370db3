use crate::config::ServerConfig;
use gateway_chain_api::{ChainRepository, Executor, ForkConfig, PeerStats, StateReader, TxPool};
use gateway_rpc::{
    AdminApi, Beat2Message, BeatMessage, FeesHistoryEngine, LogFilterService, MessageCache,
    PendingTxDispatcher, RevisionResolver, StateService,
};
use std::sync::Arc;

/// Everything a route handler needs, shared across the whole router.
/// Fully generic over the collaborator traits (§1) — mirrors the teacher's
/// own heavily-generic `EthApi<Provider, Pool, Network, ...>` shape rather
/// than reaching for trait objects, since `bin/gateway` monomorphizes this
/// over one concrete collaborator set at startup.
pub struct AppState<C, S, D, Pool, P, X, F> {
    pub chain: Arc<C>,
    pub revision: Arc<RevisionResolver<C>>,
    pub state: Arc<StateService<S>>,
    pub logs: Arc<LogFilterService<D>>,
    pub fees: Arc<FeesHistoryEngine<C, S, F>>,
    pub admin: Arc<AdminApi<C, P>>,
    pub txpool: Arc<Pool>,
    pub peers: Arc<P>,
    pub executor: Arc<X>,
    pub pending_tx: Arc<PendingTxDispatcher>,
    pub beat_cache: Arc<MessageCache<BeatMessage>>,
    pub beat2_cache: Arc<MessageCache<Beat2Message>>,
    pub config: Arc<ServerConfig>,
}

// Hand-written rather than `#[derive(Clone)]`: every field is already an
// `Arc`, so cloning the state never requires `C: Clone` / `S: Clone` /
// etc. — bounds `derive` would otherwise add.
impl<C, S, D, Pool, P, X, F> Clone for AppState<C, S, D, Pool, P, X, F> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            revision: Arc::clone(&self.revision),
            state: Arc::clone(&self.state),
            logs: Arc::clone(&self.logs),
            fees: Arc::clone(&self.fees),
            admin: Arc::clone(&self.admin),
            txpool: Arc::clone(&self.txpool),
            peers: Arc::clone(&self.peers),
            executor: Arc::clone(&self.executor),
            pending_tx: Arc::clone(&self.pending_tx),
            beat_cache: Arc::clone(&self.beat_cache),
            beat2_cache: Arc::clone(&self.beat2_cache),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C, S, D, Pool, P, X, F> AppState<C, S, D, Pool, P, X, F>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: gateway_chain_api::LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chain: Arc<C>,
        state: Arc<S>,
        logdb: Arc<D>,
        txpool: Arc<Pool>,
        peers: Arc<P>,
        executor: Arc<X>,
        fork: Arc<F>,
        log_level: gateway_tracing::LevelHandle,
        config: ServerConfig,
    ) -> Self {
        let config = Arc::new(config);
        let revision =
            Arc::new(RevisionResolver::new(Arc::clone(&chain)).with_block_interval(config.block_interval_seconds));
        let state_service = Arc::new(StateService::new(state.clone()));
        let logs = Arc::new(LogFilterService::new(logdb, config.log_filter_limit));
        let fees = Arc::new(FeesHistoryEngine::new(
            Arc::clone(&chain),
            Arc::clone(&state),
            fork,
            config.fees_cache_size,
        ));
        let admin =
            Arc::new(AdminApi::new(Arc::clone(&chain), Arc::clone(&peers), log_level, config.block_interval_seconds));
        let pending_tx = Arc::new(PendingTxDispatcher::new(config.pending_tx_dedupe_ttl_seconds()));
        Self {
            chain,
            revision,
            state: state_service,
            logs,
            fees,
            admin,
            txpool,
            peers,
            executor,
            pending_tx,
            beat_cache: Arc::new(MessageCache::new(config.message_cache_size)),
            beat2_cache: Arc::new(MessageCache::new(config.message_cache_size)),
            config,
        }
    }
}
