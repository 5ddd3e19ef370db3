use crate::ids::BlockId;
use std::fmt;
use std::str::FromStr;

/// An opaque token identifying a point on or adjacent to the chain (§4.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Revision {
    Best,
    Finalized,
    /// Synthetic one-block-ahead revision, used by `call` and fee-history
    /// "future block" semantics. Never resolves to (or is cached as) a real
    /// block.
    Next,
    Number(u32),
    Id(BlockId),
}

#[derive(Debug, thiserror::Error)]
#[error("invalid revision")]
pub struct ParseRevisionError;

impl FromStr for Revision {
    type Err = ParseRevisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best" => Ok(Revision::Best),
            "finalized" => Ok(Revision::Finalized),
            "next" => Ok(Revision::Next),
            _ => {
                if let Some(hex) = s.strip_prefix("0x") {
                    if hex.len() == 64 {
                        let mut raw = [0u8; 32];
                        hex::decode_to_slice(hex, &mut raw).map_err(|_| ParseRevisionError)?;
                        return Ok(Revision::Id(BlockId(raw.into())));
                    }
                    return Err(ParseRevisionError);
                }
                s.parse::<u32>().map(Revision::Number).map_err(|_| ParseRevisionError)
            }
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Best => write!(f, "best"),
            Revision::Finalized => write!(f, "finalized"),
            Revision::Next => write!(f, "next"),
            Revision::Number(n) => write!(f, "{n}"),
            Revision::Id(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tokens() {
        assert_eq!("best".parse::<Revision>().unwrap(), Revision::Best);
        assert_eq!("finalized".parse::<Revision>().unwrap(), Revision::Finalized);
        assert_eq!("next".parse::<Revision>().unwrap(), Revision::Next);
        assert_eq!("42".parse::<Revision>().unwrap(), Revision::Number(42));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("0xzz".parse::<Revision>().is_err());
        assert!("0x00".parse::<Revision>().is_err());
        assert!("not-a-revision".parse::<Revision>().is_err());
    }

    #[test]
    fn parses_block_id() {
        let hex = format!("0x{}", "ab".repeat(32));
        let rev: Revision = hex.parse().unwrap();
        assert!(matches!(rev, Revision::Id(_)));
    }
}
