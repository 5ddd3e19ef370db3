use crate::error::{ApiError, ApiResult};
use gateway_chain_api::{BlockRange, EventCriterion, LogDb, Order, TransferCriterion};
use gateway_primitives::{EventLogEntry, TransferLogEntry};
use std::sync::Arc;

/// Options accompanying a filter request; `None` fields fall back to server
/// defaults (§4.5).
#[derive(Clone, Copy, Debug, Default)]
pub struct FilterOptions {
    pub offset: usize,
    pub limit: Option<usize>,
    pub include_indexes: bool,
}

/// Validates and executes event/transfer log filters (§4.5). Holds the two
/// server-side caps this component enforces: the maximum `limit` a caller
/// may request, and the default applied when `options` is omitted.
#[derive(Clone)]
pub struct LogFilterService<D> {
    logdb: Arc<D>,
    server_limit: usize,
}

impl<D: LogDb> LogFilterService<D> {
    pub fn new(logdb: Arc<D>, server_limit: usize) -> Self {
        Self { logdb, server_limit }
    }

    /// Validates `criteria_set` for literal `null` elements, converting each
    /// `Some` into the executable criterion. Fails at the first `null` with
    /// its index, per §4.5.
    pub fn validate_event_criteria(
        &self,
        criteria_set: Vec<Option<EventCriterion>>,
    ) -> ApiResult<Vec<EventCriterion>> {
        validate_criteria(criteria_set)
    }

    pub fn validate_transfer_criteria(
        &self,
        criteria_set: Vec<Option<TransferCriterion>>,
    ) -> ApiResult<Vec<TransferCriterion>> {
        validate_criteria(criteria_set)
    }

    /// The limit to hand the `LogDb` query. When the caller gave an explicit
    /// `options.limit`, the db is trusted to cap its own result count at it
    /// (validated against the server cap first). When omitted, this asks for
    /// one more than the server cap so [`Self::check_result_count`] can still
    /// observe an overflow that an implicit "use the default" would
    /// otherwise hide — the db would silently truncate at `server_limit`
    /// before the count check ever saw anything past it.
    fn resolve_limit(&self, options: FilterOptions) -> ApiResult<usize> {
        match options.limit {
            Some(limit) if limit > self.server_limit => Err(ApiError::limit_exceeded(format!(
                "options.limit exceeds the maximum allowed value of {}",
                self.server_limit
            ))),
            Some(limit) => Ok(limit),
            None => Ok(self.server_limit + 1),
        }
    }

    pub async fn filter_events(
        &self,
        criteria: &[EventCriterion],
        range: BlockRange,
        order: Order,
        options: FilterOptions,
    ) -> ApiResult<Vec<EventLogEntry>> {
        let limit = self.resolve_limit(options)?;
        let mut results = self
            .logdb
            .filter_events(criteria, range, order, options.offset, limit)
            .await
            .map_err(ApiError::from)?;
        self.check_result_count(results.len())?;
        results.truncate(self.server_limit);
        Ok(results)
    }

    pub async fn filter_transfers(
        &self,
        criteria: &[TransferCriterion],
        range: BlockRange,
        order: Order,
        options: FilterOptions,
    ) -> ApiResult<Vec<TransferLogEntry>> {
        let limit = self.resolve_limit(options)?;
        let mut results = self
            .logdb
            .filter_transfers(criteria, range, order, options.offset, limit)
            .await
            .map_err(ApiError::from)?;
        self.check_result_count(results.len())?;
        results.truncate(self.server_limit);
        Ok(results)
    }

    /// Equality with the server limit is allowed; only a strictly greater
    /// count is rejected (Open Question resolved per the authoritative
    /// reading: 200 at the boundary, 403 beyond it).
    fn check_result_count(&self, count: usize) -> ApiResult<()> {
        if count > self.server_limit {
            return Err(ApiError::limit_exceeded(format!(
                "the number of filtered logs exceeds the maximum allowed value of {}, please use pagination",
                self.server_limit
            )));
        }
        Ok(())
    }
}

fn validate_criteria<T>(criteria_set: Vec<Option<T>>) -> ApiResult<Vec<T>> {
    let mut out = Vec::with_capacity(criteria_set.len());
    for (i, criterion) in criteria_set.into_iter().enumerate() {
        match criterion {
            Some(c) => out.push(c),
            None => {
                return Err(ApiError::invalid_input(format!("criteriaSet[{i}]: null not allowed")))
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_chain_api::testing::InMemoryLogDb;

    #[test]
    fn rejects_null_criterion_at_its_index() {
        let err = validate_criteria::<EventCriterion>(vec![Some(EventCriterion::default()), None])
            .unwrap_err();
        match err {
            ApiError::InvalidInput(msg) => assert!(msg.contains("criteriaSet[1]")),
            _ => panic!("expected invalid input"),
        }
    }

    #[tokio::test]
    async fn limit_over_server_cap_is_forbidden() {
        let service = LogFilterService::new(Arc::new(InMemoryLogDb::new()), 5);
        let options = FilterOptions { offset: 0, limit: Some(6), include_indexes: false };
        let err = service
            .filter_transfers(&[], BlockRange::empty(), Order::Asc, options)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::LimitExceeded(_)));
    }

    #[tokio::test]
    async fn empty_db_returns_empty_results() {
        let service = LogFilterService::new(Arc::new(InMemoryLogDb::new()), 5);
        let results = service
            .filter_transfers(&[], BlockRange { from: 0, to: gateway_primitives::MAX_BLOCK_NUMBER }, Order::Asc, FilterOptions::default())
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
