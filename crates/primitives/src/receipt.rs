use crate::{
    log::Log,
    transaction::{derive_contract_address, Clause},
};
use alloy_primitives::{Address, U256};

/// Per-clause execution output: the events and transfers it produced, plus
/// (for contract-creation clauses) the derived contract address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Output {
    pub contract_address: Option<Address>,
    pub events: Vec<Log>,
    pub transfers: Vec<Transfer>,
}

/// A value transfer produced by clause execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub sender: Address,
    pub recipient: Address,
    pub amount: U256,
}

/// Execution receipt for a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub gas_used: u64,
    pub gas_payer: Address,
    pub paid: U256,
    pub reward: U256,
    pub reverted: bool,
    pub outputs: Vec<Output>,
}

impl Receipt {
    pub fn events(&self) -> impl Iterator<Item = &Log> {
        self.outputs.iter().flat_map(|o| o.events.iter())
    }

    pub fn transfers(&self) -> impl Iterator<Item = &Transfer> {
        self.outputs.iter().flat_map(|o| o.transfers.iter())
    }
}

/// Fills in the derived contract address for a creation clause's output,
/// following `(txID, clauseIndex, 0)`.
pub fn resolve_creation_address(
    tx_id: crate::ids::TxId,
    clause_index: u32,
    clause: &Clause,
) -> Option<Address> {
    clause.is_contract_creation().then(|| derive_contract_address(tx_id, clause_index))
}
