use crate::domain::identifier::Identifier;
use crate::domain::ports::{SharedContractClient, SharedNotifier};
use crate::error::{PaymentError, Result};
use ethers_core::types::{Address, H256};
use tracing::{debug, error, info};

/// A connected account together with its resolved smart wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletContext {
    pub account: Address,
    pub wallet: Address,
}

/// Connection state for one account.
///
/// Holds at most one wallet handle, which is never replaced once resolved.
pub struct WalletSession {
    contracts: SharedContractClient,
    notifier: SharedNotifier,
    account: Option<Address>,
    wallet: Option<Address>,
    error: Option<String>,
}

impl WalletSession {
    pub fn new(contracts: SharedContractClient, notifier: SharedNotifier) -> Self {
        Self {
            contracts,
            notifier,
            account: None,
            wallet: None,
            error: None,
        }
    }

    /// Connects `account` and resolves its wallet, if it has one.
    ///
    /// Lookup failures are kept in [`error`](Self::error) rather than returned.
    pub async fn initialize(&mut self, account: Address) {
        self.account = Some(account);
        self.wallet = None;
        self.error = None;

        debug!(?account, "initializing wallet session");
        match self.resolve_wallet(account).await {
            Ok(Some(wallet)) => {
                info!(?account, ?wallet, "wallet found");
                self.wallet = Some(wallet);
            }
            Ok(None) => info!(?account, "no wallet found for account"),
            Err(e) => {
                error!(?account, error = %e, "failed to initialize wallet");
                self.error = Some("Failed to load wallet information".to_string());
            }
        }
    }

    async fn resolve_wallet(&self, account: Address) -> Result<Option<Address>> {
        if !self.contracts.has_wallet(account).await? {
            return Ok(None);
        }
        Ok(Some(self.contracts.get_user_wallet(account).await?))
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn wallet(&self) -> Option<Address> {
        self.wallet
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The account and wallet, once both are known.
    pub fn context(&self) -> Option<WalletContext> {
        Some(WalletContext {
            account: self.account?,
            wallet: self.wallet?,
        })
    }

    /// Deploys a wallet for the connected account, optionally registering an
    /// identifier in the same transaction.
    pub async fn create_wallet(&mut self, identifier: Option<&str>) -> Result<Address> {
        let account = self.account.ok_or(PaymentError::NotInitialized)?;

        match self.deploy_wallet(account, identifier).await {
            Ok(wallet) => {
                info!(?account, ?wallet, "wallet created");
                self.wallet = Some(wallet);
                self.notifier.success("Smart wallet created successfully!");
                Ok(wallet)
            }
            Err(e) => {
                error!(?account, error = %e, "failed to create wallet");
                self.notifier.failure("Failed to create wallet");
                Err(e)
            }
        }
    }

    async fn deploy_wallet(&self, account: Address, identifier: Option<&str>) -> Result<Address> {
        let tx = match identifier {
            Some(raw) => {
                let identifier = Identifier::new(raw)?;
                self.contracts
                    .create_wallet_with_identifier(identifier.as_str(), identifier.kind(), account)
                    .await?
            }
            None => self.contracts.create_wallet(account).await?,
        };

        debug!(?tx, "waiting for wallet creation");
        self.contracts.wait_for_transaction(tx).await?;
        Ok(self.contracts.get_user_wallet(account).await?)
    }

    /// Registers an additional identifier for the connected wallet.
    pub async fn register_identifier(&self, identifier: &str) -> Result<H256> {
        let context = self.context().ok_or(PaymentError::NotInitialized)?;

        let result = async {
            let identifier = Identifier::new(identifier)?;
            let tx = self
                .contracts
                .register_user(
                    identifier.as_str(),
                    identifier.kind(),
                    context.wallet,
                    context.account,
                )
                .await?;
            self.contracts.wait_for_transaction(tx).await?;
            Ok::<_, PaymentError>(tx)
        }
        .await;

        match result {
            Ok(tx) => {
                info!(?tx, identifier, "identifier registered");
                self.notifier.success("Identifier registered successfully!");
                Ok(tx)
            }
            Err(e) => {
                error!(identifier, error = %e, "failed to register identifier");
                self.notifier.failure("Failed to register identifier");
                Err(e)
            }
        }
    }

    /// Whether nobody has registered `identifier` yet.
    ///
    /// Registry errors are logged and reported as unavailable.
    pub async fn check_availability(&self, identifier: &str) -> bool {
        match self.contracts.is_identifier_available(identifier).await {
            Ok(available) => available,
            Err(e) => {
                error!(identifier, error = %e, "failed to check availability");
                false
            }
        }
    }
}
