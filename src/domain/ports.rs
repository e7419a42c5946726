use super::identifier::IdentifierKind;
use super::transaction::PaymentRecord;
use crate::error::ContractError;
use async_trait::async_trait;
use ethers_core::types::{Address, H256, U256};
use std::sync::Arc;

pub type ContractResult<T> = std::result::Result<T, ContractError>;

/// The registry, wallet factory and payment processor contracts.
///
/// Every call is asynchronous and may fail with a transport error or a
/// contract revert. `account` is the connected externally-owned account on
/// whose behalf the call is made. Amounts are `uint256` base units.
#[async_trait]
pub trait ContractClient: Send + Sync {
    async fn has_wallet(&self, account: Address) -> ContractResult<bool>;
    async fn get_user_wallet(&self, account: Address) -> ContractResult<Address>;
    async fn create_wallet(&self, account: Address) -> ContractResult<H256>;
    async fn create_wallet_with_identifier(
        &self,
        identifier: &str,
        kind: IdentifierKind,
        account: Address,
    ) -> ContractResult<H256>;

    async fn is_identifier_available(&self, identifier: &str) -> ContractResult<bool>;
    /// Returns the zero address for unregistered identifiers.
    async fn get_wallet_by_identifier(&self, identifier: &str) -> ContractResult<Address>;
    async fn get_identifiers_by_wallet(&self, wallet: Address) -> ContractResult<Vec<String>>;
    async fn register_user(
        &self,
        identifier: &str,
        kind: IdentifierKind,
        wallet: Address,
        account: Address,
    ) -> ContractResult<H256>;

    async fn get_balance(&self, wallet: Address, account: Address) -> ContractResult<U256>;
    async fn get_token_balance(
        &self,
        wallet: Address,
        account: Address,
        token: Address,
    ) -> ContractResult<U256>;

    async fn send_payment(
        &self,
        wallet: Address,
        identifier: &str,
        amount: U256,
        account: Address,
    ) -> ContractResult<H256>;
    async fn send_token_payment(
        &self,
        wallet: Address,
        identifier: &str,
        token: Address,
        amount: U256,
        account: Address,
    ) -> ContractResult<H256>;

    async fn get_sent_payments(
        &self,
        wallet: Address,
        account: Address,
    ) -> ContractResult<Vec<PaymentRecord>>;
    async fn get_received_payments(
        &self,
        wallet: Address,
        account: Address,
    ) -> ContractResult<Vec<PaymentRecord>>;

    /// Resolves once the transaction is final. There is no timeout.
    async fn wait_for_transaction(&self, tx: H256) -> ContractResult<()>;
}

/// Sink for the transient success/failure messages shown to the user.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
}

pub type SharedContractClient = Arc<dyn ContractClient>;
pub type SharedNotifier = Arc<dyn Notifier>;
