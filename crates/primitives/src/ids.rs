use alloy_primitives::{Address, B256};
use std::fmt;

/// Largest block number representable by this chain: `2^28 - 1`.
///
/// The upper 4 bits of the 32-bit number space are reserved because a block
/// id's first four bytes double as its number, and those bytes are also used
/// to flag synthetic ids (see [`BlockId::new`]).
pub const MAX_BLOCK_NUMBER: u32 = (1u32 << 28) - 1;

/// A 32-byte block identifier. The first four bytes encode the block number
/// in big-endian order, mirroring how the header hash of a real block is
/// computed to be number-prefixed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BlockId(pub B256);

impl BlockId {
    /// Builds a block id for `number` with the remaining bytes taken from
    /// `rest` (typically a real header hash's tail, or zero for synthetic
    /// placeholders).
    pub fn from_number_and_bytes(number: u32, rest: &[u8]) -> Self {
        let mut raw = [0u8; 32];
        raw[0..4].copy_from_slice(&number.to_be_bytes());
        let take = rest.len().min(28);
        raw[4..4 + take].copy_from_slice(&rest[..take]);
        Self(B256::from(raw))
    }

    /// The block number encoded in this id's leading bytes.
    pub fn number(&self) -> u32 {
        u32::from_be_bytes(self.0[0..4].try_into().expect("4 bytes"))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_ref().try_into().expect("32 bytes")
    }
}

impl From<B256> for BlockId {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<BlockId> for B256 {
    fn from(value: BlockId) -> Self {
        value.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({:#x}, #{})", self.0, self.number())
    }
}

/// A 32-byte transaction identifier, deterministic from the signed payload.
pub type TxId = B256;

/// Re-exported for callers that only need the address type.
pub type Addr = Address;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_round_trips_through_encoding() {
        let id = BlockId::from_number_and_bytes(12_345, &[0xab; 28]);
        assert_eq!(id.number(), 12_345);
    }

    #[test]
    fn max_block_number_fits_28_bits() {
        assert_eq!(MAX_BLOCK_NUMBER, 0x0FFF_FFFF);
    }
}
