use crate::ids::{BlockId, TxId};
use alloy_primitives::{Address, Bytes, B256};

/// Maximum number of indexed topics an event log carries.
pub const MAX_TOPICS: usize = 5;

/// An event emitted by a clause's execution: address, up to [`MAX_TOPICS`]
/// topics, and arbitrary data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// Calculates a receipt-level bloom filter over a set of logs (address +
/// every topic, 3 bits set per element).
pub fn logs_bloom<'a, It>(logs: It) -> [u8; 256]
where
    It: IntoIterator<Item = &'a Log>,
{
    let mut bloom = [0u8; 256];
    for log in logs {
        m3_2048(&mut bloom, log.address.as_slice());
        for topic in &log.topics {
            m3_2048(&mut bloom, topic.as_slice());
        }
    }
    bloom
}

/// Sets the 3 bits a legacy 2048-bit bloom filter assigns to `data`.
fn m3_2048(bloom: &mut [u8; 256], data: &[u8]) {
    let hash = alloy_primitives::keccak256(data);
    for i in [0usize, 2, 4] {
        let bit = (u16::from(hash[i]) << 8 | u16::from(hash[i + 1])) & 0x7ff;
        let byte_index = 256 - 1 - usize::from(bit) / 8;
        let bit_index = usize::from(bit) % 8;
        bloom[byte_index] |= 1 << bit_index;
    }
}

/// Common metadata carried by every indexed log entry (§3 `LogMeta`).
/// `tx_index`/`log_index` are only populated when `includeIndexes` was
/// requested on the originating filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogMeta {
    pub block_id: BlockId,
    pub block_number: u32,
    pub block_timestamp: u64,
    pub tx_id: TxId,
    pub tx_origin: Address,
    pub clause_index: u32,
    pub tx_index: Option<u32>,
    pub log_index: Option<u32>,
}

/// An event-log-index row: an event plus its [`LogMeta`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventLogEntry {
    pub address: Address,
    pub topics: [Option<B256>; MAX_TOPICS],
    pub data: Bytes,
    pub meta: LogMeta,
}

impl EventLogEntry {
    pub fn topic_count(&self) -> usize {
        self.topics.iter().take_while(|t| t.is_some()).count()
    }
}

/// A transfer-log-index row (VET/value transfers between accounts).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferLogEntry {
    pub sender: Address,
    pub recipient: Address,
    pub amount: alloy_primitives::U256,
    pub meta: LogMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bloom_is_deterministic_and_nonzero_for_nonempty_logs() {
        let log = Log { address: Address::repeat_byte(1), topics: vec![B256::repeat_byte(2)], data: Bytes::new() };
        let a = logs_bloom([&log]);
        let b = logs_bloom([&log]);
        assert_eq!(a, b);
        assert!(a.iter().any(|&byte| byte != 0));
    }

    #[test]
    fn empty_log_set_yields_zero_bloom() {
        let empty: Vec<Log> = vec![];
        assert_eq!(logs_bloom(&empty), [0u8; 256]);
    }
}
