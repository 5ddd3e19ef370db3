//! Core business logic for the chain read/observe gateway: no knowledge of
//! HTTP or WebSocket framing, which lives one layer up in
//! `gateway-rpc-builder`.

pub mod admin;
pub mod blockreader;
pub mod bloom;
pub mod cache;
pub mod error;
pub mod fees;
pub mod logfilter;
pub mod logrange;
pub mod pendingtx;
pub mod revision;
pub mod state;
pub mod subscriptions;
pub mod txdecoder;

pub use admin::{AdminApi, HealthStatus};
pub use blockreader::BlockReader;
pub use cache::MessageCache;
pub use error::{ApiError, ApiResult};
pub use fees::{FeesHistory, FeesHistoryEngine, FeesPump};
pub use logfilter::{FilterOptions, LogFilterService};
pub use logrange::{convert_range, RangeUnit, RawRange, TimeBounds, TimestampLookup};
pub use pendingtx::{ListenerHandle, PendingTxDispatcher, PendingTxMessage};
pub use revision::RevisionResolver;
pub use state::StateService;
pub use subscriptions::{
    BeatMessage, Beat2Message, BeatSubscription, Beat2Subscription, BlockMessage, BlockSubscription,
    EventMessage, EventSubscription, TransferMessage, TransferSubscription,
};
pub use txdecoder::{decode_raw, encode_raw};
