use crate::error::ApiResult;
use gateway_chain_api::BlockRange;
use gateway_primitives::MAX_BLOCK_NUMBER;

/// Which axis a log range request is expressed in (§4.4).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RangeUnit {
    #[default]
    Block,
    Time,
}

/// `{unit?, from?, to?}` as received from the wire, before conversion.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawRange {
    pub unit: Option<RangeUnit>,
    pub from: Option<u64>,
    pub to: Option<u64>,
}

/// A header's number and timestamp, as used for the binary search in the
/// `time` unit case. Supplied by the caller (via the chain repository)
/// rather than fetched here, keeping this module collaborator-free.
#[derive(Clone, Copy, Debug)]
pub struct TimeBounds {
    pub genesis_timestamp: u64,
    pub head_timestamp: u64,
    pub head_number: u32,
}

/// Resolves a binary search for the block number whose timestamp brackets
/// `target`, given a lookup function over committed headers. `direction =
/// +1` rounds forward (used for `from`), `-1` rounds backward (used for
/// `to`).
pub trait TimestampLookup {
    /// Returns the timestamp of the canonical block at `number`, or `None`
    /// if `number` is beyond the current head.
    fn timestamp_at(&self, number: u32) -> Option<u64>;
}

/// Converts a `{unit, from, to}` range into a concrete `[from_block,
/// to_block]` log-index range (§4.4).
pub fn convert_range<L: TimestampLookup>(
    raw: RawRange,
    bounds: TimeBounds,
    lookup: &L,
) -> ApiResult<BlockRange> {
    match raw.unit {
        None => Ok(BlockRange { from: 0, to: MAX_BLOCK_NUMBER }),
        Some(RangeUnit::Block) => Ok(convert_block_range(raw)),
        Some(RangeUnit::Time) => Ok(convert_time_range(raw, bounds, lookup)),
    }
}

fn convert_block_range(raw: RawRange) -> BlockRange {
    let from = raw.from.unwrap_or(0);
    if from > MAX_BLOCK_NUMBER as u64 {
        return BlockRange::empty();
    }
    let to = raw.to.unwrap_or(MAX_BLOCK_NUMBER as u64).min(MAX_BLOCK_NUMBER as u64);
    BlockRange { from: from as u32, to: to as u32 }
}

fn convert_time_range<L: TimestampLookup>(
    raw: RawRange,
    bounds: TimeBounds,
    lookup: &L,
) -> BlockRange {
    let from_ts = raw.from.unwrap_or(bounds.genesis_timestamp);
    let to_ts = raw.to.unwrap_or(bounds.head_timestamp);

    if to_ts < bounds.genesis_timestamp || from_ts > bounds.head_timestamp {
        return BlockRange::empty();
    }

    let from_block = search_timestamp(lookup, bounds.head_number, from_ts, 1);
    let to_block = search_timestamp(lookup, bounds.head_number, to_ts, -1);
    BlockRange { from: from_block, to: to_block }
}

/// Binary search over `[0, head_number]` for the block number closest to
/// `target`, rounding forward (`direction = 1`) or backward (`direction =
/// -1`) when `target` falls between two block timestamps.
fn search_timestamp<L: TimestampLookup>(
    lookup: &L,
    head_number: u32,
    target: u64,
    direction: i8,
) -> u32 {
    let mut lo = 0u32;
    let mut hi = head_number;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let ts = lookup.timestamp_at(mid).unwrap_or(u64::MAX);
        if ts < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    // `lo` is now the first block whose timestamp >= target (or head_number
    // if none). Rounding backward steps one block earlier when we overshot.
    if direction < 0 {
        let ts = lookup.timestamp_at(lo).unwrap_or(u64::MAX);
        if ts > target && lo > 0 {
            return lo - 1;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<u64>);
    impl TimestampLookup for Fixed {
        fn timestamp_at(&self, number: u32) -> Option<u64> {
            self.0.get(number as usize).copied()
        }
    }

    fn bounds() -> TimeBounds {
        TimeBounds { genesis_timestamp: 0, head_timestamp: 90, head_number: 9 }
    }

    #[test]
    fn no_unit_yields_full_block_range() {
        let range = convert_range(RawRange::default(), bounds(), &Fixed(vec![])).unwrap();
        assert_eq!(range, BlockRange { from: 0, to: MAX_BLOCK_NUMBER });
    }

    #[test]
    fn block_unit_clamps_and_defaults() {
        let raw = RawRange { unit: Some(RangeUnit::Block), from: None, to: Some(5) };
        let range = convert_range(raw, bounds(), &Fixed(vec![])).unwrap();
        assert_eq!(range, BlockRange { from: 0, to: 5 });
    }

    #[test]
    fn block_unit_from_beyond_max_is_empty_sentinel() {
        let raw = RawRange { unit: Some(RangeUnit::Block), from: Some(MAX_BLOCK_NUMBER as u64 + 1), to: None };
        let range = convert_range(raw, bounds(), &Fixed(vec![])).unwrap();
        assert!(range.is_empty_or_inverted());
    }

    #[test]
    fn time_unit_entirely_after_head_is_empty_sentinel() {
        let raw = RawRange { unit: Some(RangeUnit::Time), from: Some(1000), to: Some(2000) };
        let range = convert_range(raw, bounds(), &Fixed((0..10).map(|n| n * 10).collect())).unwrap();
        assert!(range.is_empty_or_inverted());
    }

    #[test]
    fn time_unit_brackets_round_forward_and_backward() {
        let timestamps: Vec<u64> = (0..10).map(|n| n * 10).collect();
        let raw = RawRange { unit: Some(RangeUnit::Time), from: Some(15), to: Some(55) };
        let range = convert_range(raw, bounds(), &Fixed(timestamps)).unwrap();
        assert_eq!(range.from, 2);
        assert_eq!(range.to, 5);
    }
}
