//! Binary entry point: CLI parsing, tracing init, collaborator wiring,
//! and graceful shutdown (§5, §10.1, §10.4).
//!
//! The chain repository, state trie, log db, tx pool, peer stats and
//! executor are all collaborators this gateway deliberately treats as
//! external (§1 Non-goals) — there is no production implementation of
//! any of them in this workspace. This binary wires the in-memory test
//! doubles from `gateway_chain_api::testing` so the server is runnable
//! end to end; swapping in a real chain node means providing concrete
//! implementations of the same traits and constructing `AppState` with
//! them instead.

mod config;

use alloy_primitives::Address;
use clap::Parser;
use config::Cli;
use gateway_chain_api::testing::{
    FixedForkConfig, InMemoryChain, InMemoryLogDb, InMemoryPeers, InMemoryState, InMemoryTxPool, StubExecutor,
};
use gateway_primitives::{BlockHeader, BlockId, BlockSummary};
use gateway_rpc::{FeesPump, PendingTxDispatcher};
use gateway_rpc_builder::{build_router, AppState};
use gateway_tasks::{TaskSpawner, TokioTaskExecutor};
use std::sync::Arc;
use tokio::sync::watch;

fn genesis_block() -> BlockSummary {
    let header = BlockHeader {
        id: BlockId::from_number_and_bytes(0, &[0u8; 28]),
        parent_id: BlockId::default(),
        timestamp: 0,
        gas_used: 0,
        gas_limit: 10_000_000,
        base_fee_per_gas: None,
        txs_root: BlockId::default(),
        state_root: BlockId::default(),
        receipts_root: BlockId::default(),
        total_score: 0,
        beneficiary: Address::ZERO,
        signer: None,
        com: false,
        txs_features: 0,
    };
    BlockSummary { header, tx_ids: Vec::new(), size: 0 }
}

/// Bridges the tx pool's "accepted" broadcast into the pending-tx
/// dispatcher's dedupe-and-fan-out pipeline (§4.10).
async fn pump_accepted_transactions(
    mut accepted: tokio::sync::broadcast::Receiver<gateway_chain_api::AcceptedTx>,
    dispatcher: Arc<PendingTxDispatcher>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return;
                }
            }
            event = accepted.recv() => {
                match event {
                    Ok(tx) => dispatcher.dispatch(tx.id, tx.executable),
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => return,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
        }
    }
}

async fn shutdown_signal(mut shutdown_rx: watch::Receiver<bool>) {
    let _ = shutdown_rx.changed().await;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let resolved = config::resolve(cli)?;

    let log_handle = gateway_tracing::init(resolved.log_level)?;
    tracing::info!(bind = %resolved.bind, "starting gateway");

    let chain = Arc::new(InMemoryChain::new(genesis_block()));
    let state_reader = Arc::new(InMemoryState::new());
    let logdb = Arc::new(InMemoryLogDb::new());
    let txpool = Arc::new(InMemoryTxPool::new());
    let peers = Arc::new(InMemoryPeers::new());
    let executor = Arc::new(StubExecutor::new());
    let fork = Arc::new(FixedForkConfig::never());

    let app_state =
        AppState::new(chain, state_reader, logdb, txpool, peers, executor, fork, log_handle, resolved.server);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let spawner = TokioTaskExecutor;

    let fees_pump = FeesPump::new(Arc::clone(&app_state.fees));
    let fees_best_ticker = app_state.chain.best_block_ticker();
    let fees_shutdown = shutdown_rx.clone();
    spawner.spawn_critical(
        "fees-pump",
        Box::pin(async move {
            fees_pump.run(fees_best_ticker, fees_shutdown).await;
        }),
    );

    let accepted = app_state.txpool.subscribe_accepted();
    let pending_tx_shutdown = shutdown_rx.clone();
    let pending_tx = Arc::clone(&app_state.pending_tx);
    spawner.spawn_critical(
        "pending-tx-pump",
        Box::pin(pump_accepted_transactions(accepted, pending_tx, pending_tx_shutdown)),
    );

    let router = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(resolved.bind).await?;
    spawner.spawn(Box::pin(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received shutdown signal");
            let _ = shutdown_tx.send(true);
        }
    }));

    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal(shutdown_rx)).await?;
    Ok(())
}
