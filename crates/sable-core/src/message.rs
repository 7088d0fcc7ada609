//! Transaction messages

use bytes::Bytes;
use sable_evm::TxContext;
use sable_primitives::{Address, U256};

/// A transaction reduced to what execution needs. The sender is already
/// recovered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Sender
    pub from: Address,
    /// Recipient, `None` for contract creation
    pub to: Option<Address>,
    /// Sender nonce the message was signed with
    pub nonce: u64,
    /// Value transferred
    pub value: U256,
    /// Gas limit
    pub gas_limit: u64,
    /// Price per unit of gas
    pub gas_price: U256,
    /// Call data or init code
    pub data: Bytes,
    /// Whether the nonce is validated against the sender account
    pub check_nonce: bool,
}

impl Message {
    /// Message call
    pub fn call(
        from: Address,
        to: Address,
        nonce: u64,
        value: U256,
        gas_limit: u64,
        gas_price: U256,
        data: Bytes,
    ) -> Self {
        Self {
            from,
            to: Some(to),
            nonce,
            value,
            gas_limit,
            gas_price,
            data,
            check_nonce: true,
        }
    }

    /// Contract creation carrying `init` code
    pub fn create(
        from: Address,
        nonce: u64,
        value: U256,
        gas_limit: u64,
        gas_price: U256,
        init: Bytes,
    ) -> Self {
        Self {
            from,
            to: None,
            nonce,
            value,
            gas_limit,
            gas_price,
            data: init,
            check_nonce: true,
        }
    }

    /// Skip nonce validation, as simulated calls do
    pub fn without_nonce_check(mut self) -> Self {
        self.check_nonce = false;
        self
    }

    /// Whether the message deploys a contract
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    /// Transaction level values seen by ORIGIN and GASPRICE
    pub fn tx_context(&self) -> TxContext {
        TxContext {
            origin: self.from,
            gas_price: self.gas_price,
        }
    }
}
