//! `0x`-prefixed hex (de)serialization for plain integers, matching the
//! JSON wire format the rest of this ecosystem uses for `u64`/`u32` fields
//! (`alloy_primitives`'s `serde` feature already covers `U256`/`Address`/
//! `B256`/`Bytes`, so this module only fills the plain-integer gap).

use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:#x}"))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let s = String::deserialize(deserializer)?;
    let s = s.strip_prefix("0x").ok_or_else(|| D::Error::custom("expected 0x-prefixed hex"))?;
    u64::from_str_radix(s, 16).map_err(D::Error::custom)
}

pub mod opt {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&format!("{v:#x}")),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        s.map(|s| {
            let s = s.strip_prefix("0x").ok_or_else(|| D::Error::custom("expected 0x-prefixed hex"))?;
            u64::from_str_radix(s, 16).map_err(D::Error::custom)
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Wrapper(#[serde(with = "super")] u64);

    #[test]
    fn round_trips_through_hex() {
        let w = Wrapper(4096);
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, "\"0x1000\"");
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.0, 4096);
    }
}
