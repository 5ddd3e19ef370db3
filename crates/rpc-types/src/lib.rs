pub mod accounts;
pub mod admin;
pub mod blocks;
pub mod fees;
pub mod hexnum;
pub mod logs;
pub mod receipts;
pub mod subscriptions;
pub mod transactions;

pub use accounts::{AccountResponse, CallRequest, CallResultDto, ClauseDto, CodeResponse, StorageResponse};
pub use admin::{
    AdminApiLogsBody, AdminApiLogsResponse, AdminLogLevelBody, AdminLogLevelResponse,
    HealthResponseDto, PeerStatsDto,
};
pub use blocks::{BlockResponse, BlockTransactions};
pub use fees::{FeesHistoryQuery, FeesHistoryResponse, FeesPriorityResponse};
pub use logs::{
    EventCriterionDto, EventDto, EventFilterRequest, FilterOptionsDto, LogMetaDto, OrderDto,
    RangeDto, RangeUnit, TransferCriterionDto, TransferDto, TransferFilterRequest,
};
pub use receipts::{OutputDto, ReceiptResponse};
pub use subscriptions::{
    Beat2MessageDto, BeatMessageDto, BlockMessageDto, EventMessageDto, TransferMessageDto,
    TxPoolMessageDto,
};
pub use transactions::{
    RawTransactionResponse, SubmitTransactionRequest, SubmitTransactionResponse,
    TransactionMeta, TransactionResponse,
};
