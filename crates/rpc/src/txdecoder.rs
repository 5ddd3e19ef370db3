use crate::error::{ApiError, ApiResult};
use alloy_primitives::{keccak256, Address, Bytes, U256};
use alloy_rlp::{Decodable, Encodable, Header};
use gateway_primitives::{Clause, DynamicFeeGasPrice, GasPrice, LegacyGasPrice, Transaction, TxId};

/// Type-prefix byte distinguishing a dynamic-fee (post-fork) transaction
/// from a legacy one, following the EIP-2718 typed-envelope convention: a
/// leading byte `< 0xc0` marks a typed transaction, one `>= 0xc0` is the
/// start of a bare legacy RLP list.
const DYNAMIC_FEE_TYPE: u8 = 0x51;

/// Decodes `{raw: hex}` into a typed [`Transaction`] (§4.3). Does not verify
/// the signature or recover `origin` here; that is deferred to the mempool,
/// which performs signature recovery when the transaction is submitted.
pub fn decode_raw(raw: &Bytes) -> ApiResult<Transaction> {
    if raw.is_empty() {
        return Err(ApiError::invalid_input("empty transaction payload"));
    }

    let id = TxId::from(keccak256(raw.as_ref()));
    let size = raw.len() as u32;

    let is_dynamic = raw[0] == DYNAMIC_FEE_TYPE;
    let mut buf: &[u8] = if is_dynamic { &raw[1..] } else { &raw[..] };

    decode_body(&mut buf, is_dynamic, id, size)
}

/// Narrows `buf` to an RLP list's payload, advancing `buf` past it.
fn enter_list<'a>(buf: &mut &'a [u8]) -> ApiResult<&'a [u8]> {
    let header = Header::decode(buf).map_err(rlp_err)?;
    if !header.list {
        return Err(ApiError::invalid_input("malformed rlp: expected list"));
    }
    if header.payload_length > buf.len() {
        return Err(ApiError::invalid_input("malformed rlp: truncated list"));
    }
    let payload = &buf[..header.payload_length];
    *buf = &buf[header.payload_length..];
    Ok(payload)
}

fn decode_body(buf: &mut &[u8], is_dynamic: bool, id: TxId, size: u32) -> ApiResult<Transaction> {
    let mut body = enter_list(buf)?;

    let chain_tag = u8::decode(&mut body).map_err(rlp_err)?;
    let block_ref = u64::decode(&mut body).map_err(rlp_err)?;
    let expiration = u32::decode(&mut body).map_err(rlp_err)?;
    let clauses = decode_clauses(&mut body)?;

    let gas_price = if is_dynamic {
        let max_priority_fee_per_gas = U256::decode(&mut body).map_err(rlp_err)?;
        let max_fee_per_gas = U256::decode(&mut body).map_err(rlp_err)?;
        GasPrice::Dynamic(DynamicFeeGasPrice { max_fee_per_gas, max_priority_fee_per_gas })
    } else {
        let gas_price_coef = u8::decode(&mut body).map_err(rlp_err)?;
        GasPrice::Legacy(LegacyGasPrice { gas_price_coef })
    };

    let gas = u64::decode(&mut body).map_err(rlp_err)?;
    let depends_on_bytes = Bytes::decode(&mut body).map_err(rlp_err)?;
    let depends_on =
        if depends_on_bytes.is_empty() { None } else { Some(TxId::from_slice(&depends_on_bytes)) };
    let nonce = u64::decode(&mut body).map_err(rlp_err)?;
    // reserved feature list; gateway does not interpret extension bits.
    let _reserved = Vec::<Bytes>::decode(&mut body).unwrap_or_default();
    // signature, ignored here; recovery happens in the mempool.
    let _signature = Bytes::decode(&mut body).unwrap_or_default();

    Ok(Transaction {
        id,
        chain_tag,
        block_ref,
        expiration,
        clauses,
        gas_price,
        gas,
        nonce,
        depends_on,
        origin: None,
        delegator: None,
        size,
    })
}

fn decode_clauses(buf: &mut &[u8]) -> ApiResult<Vec<Clause>> {
    let mut list = enter_list(buf)?;
    let mut clauses = Vec::new();
    while !list.is_empty() {
        let mut clause_body = enter_list(&mut list)?;
        let to_bytes = Bytes::decode(&mut clause_body).map_err(rlp_err)?;
        let to = if to_bytes.is_empty() {
            None
        } else if to_bytes.len() == 20 {
            Some(Address::from_slice(&to_bytes))
        } else {
            return Err(ApiError::invalid_input("malformed clause: bad `to` length"));
        };
        let value = U256::decode(&mut clause_body).map_err(rlp_err)?;
        let data = Bytes::decode(&mut clause_body).map_err(rlp_err)?;
        clauses.push(Clause { to, value, data });
    }
    Ok(clauses)
}

fn rlp_err(e: alloy_rlp::Error) -> ApiError {
    ApiError::invalid_input(format!("malformed rlp: {e}"))
}

/// Re-encodes a decoded [`Transaction`] back into its RLP wire form, for
/// `GET /transactions/{id}?raw=true` (§6.1). The signature and reserved
/// feature list are not retained by [`decode_raw`], so the bytes this
/// produces won't hash back to the original transaction id; callers that
/// need the exact original payload must keep it alongside the decoded
/// transaction rather than relying on this round-trip.
pub fn encode_raw(tx: &Transaction) -> Bytes {
    let mut clauses_body = Vec::new();
    for clause in &tx.clauses {
        let mut body = Vec::new();
        match clause.to {
            Some(addr) => addr.encode(&mut body),
            None => Bytes::new().encode(&mut body),
        }
        clause.value.encode(&mut body);
        clause.data.encode(&mut body);
        Header { list: true, payload_length: body.len() }.encode(&mut clauses_body);
        clauses_body.extend_from_slice(&body);
    }
    let mut clauses_encoded = Vec::new();
    Header { list: true, payload_length: clauses_body.len() }.encode(&mut clauses_encoded);
    clauses_encoded.extend_from_slice(&clauses_body);

    let mut body = Vec::new();
    tx.chain_tag.encode(&mut body);
    tx.block_ref.encode(&mut body);
    tx.expiration.encode(&mut body);
    body.extend_from_slice(&clauses_encoded);
    match tx.gas_price {
        GasPrice::Dynamic(d) => {
            d.max_priority_fee_per_gas.encode(&mut body);
            d.max_fee_per_gas.encode(&mut body);
        }
        GasPrice::Legacy(l) => {
            l.gas_price_coef.encode(&mut body);
        }
    }
    tx.gas.encode(&mut body);
    match tx.depends_on {
        Some(id) => Bytes::copy_from_slice(id.as_slice()).encode(&mut body),
        None => Bytes::new().encode(&mut body),
    }
    tx.nonce.encode(&mut body);
    Vec::<Bytes>::new().encode(&mut body);
    Bytes::new().encode(&mut body);

    let mut out = Vec::new();
    if tx.gas_price.is_dynamic() {
        out.push(DYNAMIC_FEE_TYPE);
    }
    Header { list: true, payload_length: body.len() }.encode(&mut out);
    out.extend_from_slice(&body);
    Bytes::from(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_rlp::Encodable;

    fn encode_clause(out: &mut Vec<u8>, to: Option<Address>, value: U256, data: &[u8]) {
        let mut body = Vec::new();
        match to {
            Some(addr) => addr.encode(&mut body),
            None => Bytes::new().encode(&mut body),
        }
        value.encode(&mut body);
        Bytes::copy_from_slice(data).encode(&mut body);
        Header { list: true, payload_length: body.len() }.encode(out);
        out.extend_from_slice(&body);
    }

    fn encode_legacy_tx(clauses: &[(Option<Address>, U256, &[u8])]) -> Bytes {
        let mut clauses_encoded = Vec::new();
        let mut clauses_body = Vec::new();
        for (to, value, data) in clauses {
            encode_clause(&mut clauses_body, *to, *value, data);
        }
        Header { list: true, payload_length: clauses_body.len() }.encode(&mut clauses_encoded);
        clauses_encoded.extend_from_slice(&clauses_body);

        let mut body = Vec::new();
        1u8.encode(&mut body);
        0u64.encode(&mut body);
        100u32.encode(&mut body);
        body.extend_from_slice(&clauses_encoded);
        0u8.encode(&mut body); // gas_price_coef
        21000u64.encode(&mut body); // gas
        Bytes::new().encode(&mut body); // depends_on
        0u64.encode(&mut body); // nonce
        Vec::<Bytes>::new().encode(&mut body); // reserved
        Bytes::from_static(b"sig").encode(&mut body);

        let mut out = Vec::new();
        Header { list: true, payload_length: body.len() }.encode(&mut out);
        out.extend_from_slice(&body);
        Bytes::from(out)
    }

    #[test]
    fn decodes_single_clause_legacy_transaction() {
        let raw = encode_legacy_tx(&[(Some(Address::repeat_byte(2)), U256::from(7u64), b"")]);
        let tx = decode_raw(&raw).unwrap();
        assert_eq!(tx.clauses.len(), 1);
        assert_eq!(tx.clauses[0].to, Some(Address::repeat_byte(2)));
        assert_eq!(tx.gas, 21000);
        assert!(matches!(tx.gas_price, GasPrice::Legacy(_)));
    }

    #[test]
    fn empty_payload_is_rejected() {
        let err = decode_raw(&Bytes::new()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }
}
