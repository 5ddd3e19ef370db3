/// Read-only peer/network statistics, consumed by `/node/network/peers` and
/// the admin health probe (§4.12, §10.6 supplement). No peer management —
/// that belongs to the out-of-scope p2p stack.
pub trait PeerStats: Send + Sync {
    fn peer_count(&self) -> usize;

    fn peers(&self) -> Vec<PeerInfo>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerInfo {
    pub id: String,
    pub best_block_id: gateway_primitives::BlockId,
    pub inbound: bool,
}
