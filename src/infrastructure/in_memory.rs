use crate::domain::identifier::IdentifierKind;
use crate::domain::ports::{ContractClient, ContractResult};
use crate::domain::transaction::PaymentRecord;
use crate::error::ContractError;
use async_trait::async_trait;
use ethers_core::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::debug;

/// Everything the registry, wallet factory and payment processor would hold
/// on-chain.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainState {
    nonce: u64,
    /// Owner account to wallet.
    wallets: BTreeMap<Address, Address>,
    /// Identifier to wallet.
    registry: BTreeMap<String, Address>,
    /// Wallet to identifiers, in registration order.
    identifiers: BTreeMap<Address, Vec<String>>,
    /// Wallet to token to balance. The zero token is the native currency.
    balances: BTreeMap<Address, BTreeMap<Address, U256>>,
    sent: BTreeMap<Address, Vec<PaymentRecord>>,
    received: BTreeMap<Address, Vec<PaymentRecord>>,
    confirmed: BTreeSet<H256>,
}

impl ChainState {
    fn next_tx(&mut self) -> H256 {
        self.nonce += 1;
        let tx = H256::from_low_u64_be(self.nonce);
        self.confirmed.insert(tx);
        tx
    }

    fn owned_wallet(&self, wallet: Address, account: Address) -> ContractResult<()> {
        match self.wallets.get(&account) {
            Some(owned) if *owned == wallet => Ok(()),
            _ => Err(ContractError::Reverted(
                "caller is not the wallet owner".to_string(),
            )),
        }
    }

    fn deploy_wallet(&mut self, account: Address) -> ContractResult<Address> {
        if self.wallets.contains_key(&account) {
            return Err(ContractError::Reverted("wallet already exists".to_string()));
        }
        let mut bytes = [0u8; 20];
        bytes[0] = 0x5a;
        bytes[12..].copy_from_slice(&(self.wallets.len() as u64 + 1).to_be_bytes());
        let wallet = Address::from(bytes);
        self.wallets.insert(account, wallet);
        Ok(wallet)
    }

    fn register(&mut self, identifier: &str, wallet: Address) -> ContractResult<()> {
        if identifier.is_empty() {
            return Err(ContractError::Reverted("empty identifier".to_string()));
        }
        if self.registry.contains_key(identifier) {
            return Err(ContractError::Reverted(
                "identifier already registered".to_string(),
            ));
        }
        self.registry.insert(identifier.to_string(), wallet);
        self.identifiers
            .entry(wallet)
            .or_default()
            .push(identifier.to_string());
        Ok(())
    }

    fn balance(&self, wallet: Address, token: Address) -> U256 {
        self.balances
            .get(&wallet)
            .and_then(|tokens| tokens.get(&token))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &mut self,
        wallet: Address,
        identifier: &str,
        token: Address,
        amount: U256,
    ) -> ContractResult<()> {
        let recipient = *self.registry.get(identifier).ok_or_else(|| {
            ContractError::Reverted(format!("identifier {identifier} not registered"))
        })?;
        if recipient == wallet {
            return Err(ContractError::Reverted("cannot pay yourself".to_string()));
        }

        let available = self.balance(wallet, token);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| ContractError::Reverted("insufficient balance".to_string()))?;
        let credited = self
            .balance(recipient, token)
            .checked_add(amount)
            .ok_or_else(|| ContractError::Reverted("balance overflow".to_string()))?;

        self.balances
            .entry(wallet)
            .or_default()
            .insert(token, remaining);
        self.balances
            .entry(recipient)
            .or_default()
            .insert(token, credited);

        let timestamp = unix_now();
        let sender_label = self
            .identifiers
            .get(&wallet)
            .and_then(|ids| ids.first().cloned())
            .unwrap_or_else(|| format!("{wallet:#x}"));
        self.sent.entry(wallet).or_default().push(PaymentRecord {
            identifier: identifier.to_string(),
            token,
            amount,
            timestamp,
        });
        self.received.entry(recipient).or_default().push(PaymentRecord {
            identifier: sender_label,
            token,
            amount,
            timestamp,
        });
        Ok(())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// A local stand-in for the deployed contracts.
///
/// Transactions execute and confirm as soon as they are submitted. Cloning
/// shares the underlying state.
#[derive(Debug, Default, Clone)]
pub struct InMemoryChain {
    state: Arc<RwLock<ChainState>>,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ChainState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn snapshot(&self) -> ChainState {
        self.state.read().await.clone()
    }

    /// Credits `amount` of `token` to `wallet` out of thin air.
    pub async fn mint(&self, wallet: Address, token: Address, amount: U256) {
        let mut state = self.state.write().await;
        let balance = state.balances.entry(wallet).or_default().entry(token).or_default();
        *balance = balance.saturating_add(amount);
        debug!(?wallet, ?token, %amount, "minted");
    }

    pub async fn is_confirmed(&self, tx: H256) -> bool {
        self.state.read().await.confirmed.contains(&tx)
    }
}

#[async_trait]
impl ContractClient for InMemoryChain {
    async fn has_wallet(&self, account: Address) -> ContractResult<bool> {
        Ok(self.state.read().await.wallets.contains_key(&account))
    }

    async fn get_user_wallet(&self, account: Address) -> ContractResult<Address> {
        Ok(self
            .state
            .read()
            .await
            .wallets
            .get(&account)
            .copied()
            .unwrap_or(Address::zero()))
    }

    async fn create_wallet(&self, account: Address) -> ContractResult<H256> {
        let mut state = self.state.write().await;
        state.deploy_wallet(account)?;
        Ok(state.next_tx())
    }

    async fn create_wallet_with_identifier(
        &self,
        identifier: &str,
        _kind: IdentifierKind,
        account: Address,
    ) -> ContractResult<H256> {
        let mut state = self.state.write().await;
        if identifier.is_empty() || state.registry.contains_key(identifier) {
            return Err(ContractError::Reverted(
                "identifier unavailable".to_string(),
            ));
        }
        let wallet = state.deploy_wallet(account)?;
        state.register(identifier, wallet)?;
        Ok(state.next_tx())
    }

    async fn is_identifier_available(&self, identifier: &str) -> ContractResult<bool> {
        Ok(!self.state.read().await.registry.contains_key(identifier))
    }

    async fn get_wallet_by_identifier(&self, identifier: &str) -> ContractResult<Address> {
        Ok(self
            .state
            .read()
            .await
            .registry
            .get(identifier)
            .copied()
            .unwrap_or(Address::zero()))
    }

    async fn get_identifiers_by_wallet(&self, wallet: Address) -> ContractResult<Vec<String>> {
        Ok(self
            .state
            .read()
            .await
            .identifiers
            .get(&wallet)
            .cloned()
            .unwrap_or_default())
    }

    async fn register_user(
        &self,
        identifier: &str,
        _kind: IdentifierKind,
        wallet: Address,
        account: Address,
    ) -> ContractResult<H256> {
        let mut state = self.state.write().await;
        state.owned_wallet(wallet, account)?;
        state.register(identifier, wallet)?;
        Ok(state.next_tx())
    }

    async fn get_balance(&self, wallet: Address, _account: Address) -> ContractResult<U256> {
        Ok(self.state.read().await.balance(wallet, Address::zero()))
    }

    async fn get_token_balance(
        &self,
        wallet: Address,
        _account: Address,
        token: Address,
    ) -> ContractResult<U256> {
        Ok(self.state.read().await.balance(wallet, token))
    }

    async fn send_payment(
        &self,
        wallet: Address,
        identifier: &str,
        amount: U256,
        account: Address,
    ) -> ContractResult<H256> {
        let mut state = self.state.write().await;
        state.owned_wallet(wallet, account)?;
        state.transfer(wallet, identifier, Address::zero(), amount)?;
        Ok(state.next_tx())
    }

    async fn send_token_payment(
        &self,
        wallet: Address,
        identifier: &str,
        token: Address,
        amount: U256,
        account: Address,
    ) -> ContractResult<H256> {
        if token.is_zero() {
            return Err(ContractError::Reverted("invalid token".to_string()));
        }
        let mut state = self.state.write().await;
        state.owned_wallet(wallet, account)?;
        state.transfer(wallet, identifier, token, amount)?;
        Ok(state.next_tx())
    }

    async fn get_sent_payments(
        &self,
        wallet: Address,
        _account: Address,
    ) -> ContractResult<Vec<PaymentRecord>> {
        Ok(self
            .state
            .read()
            .await
            .sent
            .get(&wallet)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_received_payments(
        &self,
        wallet: Address,
        _account: Address,
    ) -> ContractResult<Vec<PaymentRecord>> {
        Ok(self
            .state
            .read()
            .await
            .received
            .get(&wallet)
            .cloned()
            .unwrap_or_default())
    }

    async fn wait_for_transaction(&self, tx: H256) -> ContractResult<()> {
        if self.is_confirmed(tx).await {
            Ok(())
        } else {
            Err(ContractError::NotFound(format!("transaction {tx:#x}")))
        }
    }
}
