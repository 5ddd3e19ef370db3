//! Core chain-domain value types shared by every other crate in the
//! workspace. No I/O, no async — just the data model described in
//! `spec.md` §3.

pub mod block;
pub mod fees;
pub mod ids;
pub mod log;
pub mod receipt;
pub mod revision;
pub mod transaction;

pub use block::{BlockHeader, BlockSummary, ExtendedBlock, ProvedWork};
pub use fees::{CachedRewards, FeeCacheEntry, TxGasAndReward};
pub use ids::{Addr, BlockId, TxId, MAX_BLOCK_NUMBER};
pub use log::{logs_bloom, EventLogEntry, Log, LogMeta, TransferLogEntry, MAX_TOPICS};
pub use receipt::{Output, Receipt, Transfer};
pub use revision::Revision;
pub use transaction::{
    derive_contract_address, Clause, DynamicFeeGasPrice, GasPrice, LegacyGasPrice, Transaction,
};
