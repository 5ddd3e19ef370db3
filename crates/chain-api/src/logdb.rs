use crate::error::ChainApiError;
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use gateway_primitives::{EventLogEntry, TransferLogEntry, MAX_TOPICS};

/// A resolved, concrete `[from_block, to_block]` range, the output of the
/// log-range converter (§4.4) and the input every `LogDb` query takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockRange {
    pub from: u32,
    pub to: u32,
}

impl BlockRange {
    /// Sentinel used whenever the requested range provably matches nothing
    /// (§4.4): `from == to == MAX_BLOCK_NUMBER`, which the log db treats as
    /// an empty scan.
    pub fn empty() -> Self {
        Self { from: gateway_primitives::MAX_BLOCK_NUMBER, to: gateway_primitives::MAX_BLOCK_NUMBER }
    }

    /// `from > to` is a valid, intentionally-empty range (§4.4): it is
    /// passed through rather than normalized.
    pub fn is_empty_or_inverted(&self) -> bool {
        self.from > self.to
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

/// An event filter criterion (§4.5): matches iff address matches (if set)
/// AND every provided topic matches the event's topic at the same index,
/// length-sensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventCriterion {
    pub address: Option<Address>,
    pub topics: [Option<B256>; MAX_TOPICS],
}

impl EventCriterion {
    pub fn matches(&self, event: &EventLogEntry) -> bool {
        if let Some(address) = self.address {
            if event.address != address {
                return false;
            }
        }
        self.topics.iter().enumerate().all(|(i, want)| match want {
            Some(topic) => event.topics[i] == Some(*topic),
            None => true,
        })
    }
}

/// A transfer filter criterion (§4.5): matches iff origin/sender/recipient
/// all match where specified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferCriterion {
    pub tx_origin: Option<Address>,
    pub sender: Option<Address>,
    pub recipient: Option<Address>,
}

impl TransferCriterion {
    pub fn matches(&self, transfer: &TransferLogEntry) -> bool {
        self.tx_origin.map_or(true, |a| a == transfer.meta.tx_origin)
            && self.sender.map_or(true, |a| a == transfer.sender)
            && self.recipient.map_or(true, |a| a == transfer.recipient)
    }
}

/// The log database (§1): insert/filter transfers and events by criteria
/// and block range. Pagination (`offset`, `limit`) and ordering are pushed
/// down so implementations can apply them at the storage layer.
#[async_trait]
pub trait LogDb: Send + Sync {
    async fn filter_events(
        &self,
        criteria: &[EventCriterion],
        range: BlockRange,
        order: Order,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<EventLogEntry>, ChainApiError>;

    async fn filter_transfers(
        &self,
        criteria: &[TransferCriterion],
        range: BlockRange,
        order: Order,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<TransferLogEntry>, ChainApiError>;
}
