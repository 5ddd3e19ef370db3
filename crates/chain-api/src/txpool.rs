use crate::error::ChainApiError;
use alloy_primitives::Bytes;
use async_trait::async_trait;
use gateway_primitives::TxId;

/// An accepted-transaction event as published by the mempool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcceptedTx {
    pub id: TxId,
    pub executable: bool,
}

/// The transaction pool (§1): accept raw signed transactions, and publish
/// an executable-transaction event stream the pending-tx dispatcher (§4.10)
/// subscribes to.
#[async_trait]
pub trait TxPool: Send + Sync {
    /// Decodes, (eventually) validates, and enqueues a raw signed
    /// transaction. Returns the deterministic transaction id.
    async fn add_local(&self, raw: Bytes) -> Result<TxId, ChainApiError>;

    fn subscribe_accepted(&self) -> tokio::sync::broadcast::Receiver<AcceptedTx>;
}
