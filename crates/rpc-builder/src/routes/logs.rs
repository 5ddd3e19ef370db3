//! `/logs/event` and `/logs/transfer` (§4.4, §4.5).

use crate::convert::{event_dto_from_entry, transfer_dto_from_entry, ChainTimestampLookup};
use crate::error::HttpError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use gateway_chain_api::{ChainRepository, EventCriterion, Executor, ForkConfig, LogDb, Order, PeerStats, StateReader, TransferCriterion, TxPool};
use gateway_rpc::{convert_range, FilterOptions, RawRange, TimeBounds};
use gateway_rpc_types::{
    EventCriterionDto, EventDto, EventFilterRequest, FilterOptionsDto, OrderDto, RangeDto, RangeUnit,
    TransferCriterionDto, TransferDto, TransferFilterRequest,
};

fn time_bounds<C: ChainRepository>(chain: &C) -> TimeBounds {
    let genesis = chain.genesis();
    let best = chain.best_block();
    TimeBounds {
        genesis_timestamp: genesis.header.timestamp,
        head_timestamp: best.header.timestamp,
        head_number: best.header.number(),
    }
}

fn raw_range(range: RangeDto) -> RawRange {
    RawRange {
        unit: range.unit.map(|u| match u {
            RangeUnit::Block => gateway_rpc::logrange::RangeUnit::Block,
            RangeUnit::Time => gateway_rpc::logrange::RangeUnit::Time,
        }),
        from: range.from,
        to: range.to,
    }
}

fn filter_options(opts: Option<FilterOptionsDto>) -> FilterOptions {
    let opts = opts.unwrap_or_default();
    FilterOptions { offset: opts.offset, limit: opts.limit, include_indexes: opts.include_indexes }
}

fn order(order: OrderDto) -> Order {
    match order {
        OrderDto::Asc => Order::Asc,
        OrderDto::Desc => Order::Desc,
    }
}

fn event_criterion(dto: EventCriterionDto) -> EventCriterion {
    EventCriterion {
        address: dto.address,
        topics: [dto.topic0, dto.topic1, dto.topic2, dto.topic3, dto.topic4],
    }
}

fn transfer_criterion(dto: TransferCriterionDto) -> TransferCriterion {
    TransferCriterion { tx_origin: dto.tx_origin, sender: dto.sender, recipient: dto.recipient }
}

pub async fn filter_events<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Json(body): Json<EventFilterRequest>,
) -> Result<Json<Vec<EventDto>>, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let criteria_set: Vec<Option<EventCriterion>> =
        body.criteria_set.into_iter().map(|c| c.map(event_criterion)).collect();
    let criteria = state.logs.validate_event_criteria(criteria_set)?;
    let bounds = time_bounds(state.chain.as_ref());
    let lookup = ChainTimestampLookup(state.chain.as_ref());
    let range = convert_range(raw_range(body.range), bounds, &lookup)?;
    let options = filter_options(body.options);
    let include_indexes = options.include_indexes;
    let entries = state.logs.filter_events(&criteria, range, order(body.order), options).await?;
    Ok(Json(entries.iter().map(|e| event_dto_from_entry(e, include_indexes)).collect()))
}

pub async fn filter_transfers<C, S, D, Pool, P, X, F>(
    State(state): State<AppState<C, S, D, Pool, P, X, F>>,
    Json(body): Json<TransferFilterRequest>,
) -> Result<Json<Vec<TransferDto>>, HttpError>
where
    C: ChainRepository + 'static,
    S: StateReader + 'static,
    D: LogDb + 'static,
    Pool: TxPool + 'static,
    P: PeerStats + 'static,
    X: Executor + 'static,
    F: ForkConfig + 'static,
{
    let criteria_set: Vec<Option<TransferCriterion>> =
        body.criteria_set.into_iter().map(|c| c.map(transfer_criterion)).collect();
    let criteria = state.logs.validate_transfer_criteria(criteria_set)?;
    let bounds = time_bounds(state.chain.as_ref());
    let lookup = ChainTimestampLookup(state.chain.as_ref());
    let range = convert_range(raw_range(body.range), bounds, &lookup)?;
    let options = filter_options(body.options);
    let include_indexes = options.include_indexes;
    let entries = state.logs.filter_transfers(&criteria, range, order(body.order), options).await?;
    Ok(Json(entries.iter().map(|t| transfer_dto_from_entry(t, include_indexes)).collect()))
}
