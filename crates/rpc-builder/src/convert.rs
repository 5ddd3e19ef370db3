//! Shared DTO <-> domain-type conversions used by more than one route
//! handler, so `routes/blocks.rs` and `routes/transactions.rs` (which both
//! render a `TransactionResponse`) or `routes/logs.rs` and `routes/accounts.rs`
//! (which both render an `EventDto`/`TransferDto`) don't duplicate them.

use gateway_chain_api::{ChainRepository, TransactionLocation};
use gateway_primitives::{EventLogEntry, GasPrice, LogMeta, Output, Receipt, TransferLogEntry};
use gateway_rpc::{Beat2Message, BeatMessage, BlockMessage, EventMessage, TransferMessage};
use gateway_rpc_types::{
    Beat2MessageDto, BeatMessageDto, BlockMessageDto, ClauseDto, EventDto, LogMetaDto, OutputDto,
    ReceiptResponse, TransactionMeta, TransactionResponse, TransferDto,
};

pub fn transaction_response(loc: &TransactionLocation, block_timestamp: u64) -> TransactionResponse {
    let tx = &loc.tx;
    let (gas_price_coef, max_fee_per_gas, max_priority_fee_per_gas) = match tx.gas_price {
        GasPrice::Legacy(l) => (Some(l.gas_price_coef), None, None),
        GasPrice::Dynamic(d) => (None, Some(d.max_fee_per_gas), Some(d.max_priority_fee_per_gas)),
    };
    TransactionResponse {
        id: tx.id,
        chain_tag: tx.chain_tag,
        block_ref: tx.block_ref,
        expiration: tx.expiration,
        clauses: tx.clauses.iter().map(|c| ClauseDto { to: c.to, value: c.value, data: c.data.clone() }).collect(),
        gas_price_coef,
        max_fee_per_gas,
        max_priority_fee_per_gas,
        gas: tx.gas,
        nonce: tx.nonce,
        depends_on: tx.depends_on,
        origin: tx.origin.unwrap_or_default(),
        delegator: tx.delegator,
        size: tx.size,
        meta: TransactionMeta { block_id: loc.block_id.into(), block_number: loc.block_number as u64, block_timestamp },
    }
}

/// `include_indexes` gates `tx_index`/`log_index`: both are only carried
/// through when the caller opted in via `options.includeIndexes` (§4.5);
/// otherwise they're dropped to `None`, which `LogMetaDto`'s
/// `skip_serializing_if` omits from the wire entirely.
pub fn log_meta_dto(meta: &LogMeta, include_indexes: bool) -> LogMetaDto {
    LogMetaDto {
        block_id: meta.block_id.into(),
        block_number: meta.block_number as u64,
        block_timestamp: meta.block_timestamp,
        tx_id: meta.tx_id,
        tx_origin: meta.tx_origin,
        clause_index: meta.clause_index,
        tx_index: if include_indexes { meta.tx_index } else { None },
        log_index: if include_indexes { meta.log_index } else { None },
    }
}

pub fn event_dto_from_entry(entry: &EventLogEntry, include_indexes: bool) -> EventDto {
    EventDto {
        address: entry.address,
        topics: entry.topics.iter().flatten().copied().collect(),
        data: entry.data.clone(),
        meta: Some(log_meta_dto(&entry.meta, include_indexes)),
        obsolete: false,
    }
}

pub fn transfer_dto_from_entry(entry: &TransferLogEntry, include_indexes: bool) -> TransferDto {
    TransferDto {
        sender: entry.sender,
        recipient: entry.recipient,
        amount: entry.amount,
        meta: Some(log_meta_dto(&entry.meta, include_indexes)),
        obsolete: false,
    }
}

fn output_dto(output: &Output) -> OutputDto {
    OutputDto {
        contract_address: output.contract_address,
        events: output
            .events
            .iter()
            .map(|log| EventDto { address: log.address, topics: log.topics.clone(), data: log.data.clone(), meta: None, obsolete: false })
            .collect(),
        transfers: output
            .transfers
            .iter()
            .map(|t| TransferDto { sender: t.sender, recipient: t.recipient, amount: t.amount, meta: None, obsolete: false })
            .collect(),
    }
}

pub fn receipt_response(receipt: &Receipt, meta: TransactionMeta) -> ReceiptResponse {
    ReceiptResponse {
        gas_used: receipt.gas_used,
        gas_payer: receipt.gas_payer,
        paid: receipt.paid,
        reward: receipt.reward,
        reverted: receipt.reverted,
        outputs: receipt.outputs.iter().map(output_dto).collect(),
        meta,
    }
}

/// Adapts a [`ChainRepository`] to `gateway_rpc::TimestampLookup`, so the log
/// range converter (§4.4) can binary-search committed header timestamps
/// without depending on the chain repository trait directly.
pub struct ChainTimestampLookup<'a, C>(pub &'a C);

impl<C: ChainRepository> gateway_rpc::TimestampLookup for ChainTimestampLookup<'_, C> {
    fn timestamp_at(&self, number: u32) -> Option<u64> {
        self.0.block_by_number(number).ok().flatten().map(|b| b.header.timestamp)
    }
}

/// `/subscriptions/block` frame (§6.3 `BlockMessage`).
pub fn block_message_dto(msg: &BlockMessage) -> BlockMessageDto {
    BlockMessageDto {
        number: msg.number as u64,
        id: msg.id.into(),
        parent_id: msg.parent_id.into(),
        timestamp: msg.timestamp,
        gas_limit: msg.gas_limit,
        gas_used: msg.gas_used,
        total_score: msg.total_score,
        beneficiary: msg.beneficiary,
        signer: msg.signer,
        txs_root: msg.txs_root.into(),
        txs_features: msg.txs_features,
        state_root: msg.state_root.into(),
        receipts_root: msg.receipts_root.into(),
        com: msg.com,
        transactions: msg.transactions.clone(),
        size: msg.size,
        obsolete: msg.obsolete,
    }
}

/// `/subscriptions/event` frame. Live subscription frames always carry
/// full indexes; there's no `includeIndexes` query option on a WS stream.
pub fn event_message_dto(msg: &EventMessage) -> EventDto {
    EventDto {
        address: msg.address,
        topics: msg.topics.clone(),
        data: msg.data.clone(),
        meta: Some(log_meta_dto(&msg.meta, true)),
        obsolete: msg.obsolete,
    }
}

/// `/subscriptions/transfer` frame.
pub fn transfer_message_dto(msg: &TransferMessage) -> TransferDto {
    TransferDto {
        sender: msg.sender,
        recipient: msg.recipient,
        amount: msg.amount,
        meta: Some(log_meta_dto(&msg.meta, true)),
        obsolete: msg.obsolete,
    }
}

/// `/subscriptions/beat` frame.
pub fn beat_message_dto(msg: &BeatMessage) -> BeatMessageDto {
    BeatMessageDto {
        number: msg.number as u64,
        id: msg.id.into(),
        parent_id: msg.parent_id.into(),
        timestamp: msg.timestamp,
        txs_features: msg.txs_features,
        bloom: format!("0x{}", hex::encode(&msg.bloom)),
        k: msg.k,
        obsolete: msg.obsolete,
    }
}

/// `/subscriptions/beat2` frame.
pub fn beat2_message_dto(msg: &Beat2Message) -> Beat2MessageDto {
    Beat2MessageDto {
        number: msg.number as u64,
        id: msg.id.into(),
        parent_id: msg.parent_id.into(),
        timestamp: msg.timestamp,
        txs_features: msg.txs_features,
        gas_limit: msg.gas_limit,
        bloom: format!("0x{}", hex::encode(&msg.bloom)),
        k: msg.k,
        obsolete: msg.obsolete,
    }
}
