#![allow(dead_code)]

use async_trait::async_trait;
use ethers_core::types::{Address, H160, H256, U256};
use hex_literal::hex;
use idpay::domain::identifier::IdentifierKind;
use idpay::domain::ports::{ContractClient, ContractResult};
use idpay::domain::transaction::PaymentRecord;
use idpay::error::ContractError;
use std::sync::Mutex;

pub const ACCOUNT: Address = H160(hex!("00000000000000000000000000000000000a11ce"));
pub const WALLET: Address = H160(hex!("5a0000000000000000000000000000000000a11c"));
pub const RECIPIENT_WALLET: Address = H160(hex!("5a00000000000000000000000000000000000b0b"));
pub const TX: H256 = H256([0x11; 32]);

/// Contract double answering from a fixed script and recording each call by
/// method name.
pub struct ScriptedContracts {
    pub calls: Mutex<Vec<&'static str>>,
    pub available: bool,
    pub balance: U256,
    pub recipient_wallet: Address,
    pub own_identifiers: Vec<String>,
    pub identifiers_fail: bool,
    pub transfer_reverts: bool,
    pub confirm_fails: bool,
    pub sent: Vec<PaymentRecord>,
    pub received: Vec<PaymentRecord>,
}

impl Default for ScriptedContracts {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            available: false,
            balance: U256::zero(),
            recipient_wallet: RECIPIENT_WALLET,
            own_identifiers: vec!["alice".to_string()],
            identifiers_fail: false,
            transfer_reverts: false,
            confirm_fails: false,
            sent: Vec::new(),
            received: Vec::new(),
        }
    }
}

impl ScriptedContracts {
    pub fn with_balance(units: u128) -> Self {
        Self {
            balance: U256::from(units),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, method: &str) -> bool {
        self.calls().iter().any(|call| *call == method)
    }

    fn record(&self, method: &'static str) {
        self.calls.lock().unwrap().push(method);
    }
}

#[async_trait]
impl ContractClient for ScriptedContracts {
    async fn has_wallet(&self, _account: Address) -> ContractResult<bool> {
        self.record("has_wallet");
        Ok(true)
    }

    async fn get_user_wallet(&self, _account: Address) -> ContractResult<Address> {
        self.record("get_user_wallet");
        Ok(WALLET)
    }

    async fn create_wallet(&self, _account: Address) -> ContractResult<H256> {
        self.record("create_wallet");
        Ok(TX)
    }

    async fn create_wallet_with_identifier(
        &self,
        _identifier: &str,
        _kind: IdentifierKind,
        _account: Address,
    ) -> ContractResult<H256> {
        self.record("create_wallet_with_identifier");
        Ok(TX)
    }

    async fn is_identifier_available(&self, _identifier: &str) -> ContractResult<bool> {
        self.record("is_identifier_available");
        Ok(self.available)
    }

    async fn get_wallet_by_identifier(&self, _identifier: &str) -> ContractResult<Address> {
        self.record("get_wallet_by_identifier");
        Ok(self.recipient_wallet)
    }

    async fn get_identifiers_by_wallet(&self, _wallet: Address) -> ContractResult<Vec<String>> {
        self.record("get_identifiers_by_wallet");
        if self.identifiers_fail {
            return Err(ContractError::Transport("connection reset".to_string()));
        }
        Ok(self.own_identifiers.clone())
    }

    async fn register_user(
        &self,
        _identifier: &str,
        _kind: IdentifierKind,
        _wallet: Address,
        _account: Address,
    ) -> ContractResult<H256> {
        self.record("register_user");
        Ok(TX)
    }

    async fn get_balance(&self, _wallet: Address, _account: Address) -> ContractResult<U256> {
        self.record("get_balance");
        Ok(self.balance)
    }

    async fn get_token_balance(
        &self,
        _wallet: Address,
        _account: Address,
        _token: Address,
    ) -> ContractResult<U256> {
        self.record("get_token_balance");
        Ok(self.balance)
    }

    async fn send_payment(
        &self,
        _wallet: Address,
        _identifier: &str,
        _amount: U256,
        _account: Address,
    ) -> ContractResult<H256> {
        self.record("send_payment");
        if self.transfer_reverts {
            return Err(ContractError::Reverted("transfer failed".to_string()));
        }
        Ok(TX)
    }

    async fn send_token_payment(
        &self,
        _wallet: Address,
        _identifier: &str,
        _token: Address,
        _amount: U256,
        _account: Address,
    ) -> ContractResult<H256> {
        self.record("send_token_payment");
        if self.transfer_reverts {
            return Err(ContractError::Reverted("transfer failed".to_string()));
        }
        Ok(TX)
    }

    async fn get_sent_payments(
        &self,
        _wallet: Address,
        _account: Address,
    ) -> ContractResult<Vec<PaymentRecord>> {
        self.record("get_sent_payments");
        Ok(self.sent.clone())
    }

    async fn get_received_payments(
        &self,
        _wallet: Address,
        _account: Address,
    ) -> ContractResult<Vec<PaymentRecord>> {
        self.record("get_received_payments");
        Ok(self.received.clone())
    }

    async fn wait_for_transaction(&self, _tx: H256) -> ContractResult<()> {
        self.record("wait_for_transaction");
        if self.confirm_fails {
            return Err(ContractError::Transport("receipt request timed out".to_string()));
        }
        Ok(())
    }
}
