use crate::application::session::WalletContext;
use crate::config::Config;
use crate::domain::ports::{SharedContractClient, SharedNotifier};
use crate::domain::token::{TokenKind, format_amount};
use crate::domain::transaction::PaymentIntent;
use crate::error::{PaymentError, Result};
use ethers_core::types::{Address, H256};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of a single pre-flight check.
#[derive(Debug)]
enum Check {
    Pass,
    Fail(PaymentError),
}

/// Pre-flight checks, run in this order before anything is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreflightStep {
    RecipientRegistered,
    SufficientBalance,
    RecipientWallet,
    NotOwnIdentifier,
}

impl PreflightStep {
    const ORDER: [PreflightStep; 4] = [
        PreflightStep::RecipientRegistered,
        PreflightStep::SufficientBalance,
        PreflightStep::RecipientWallet,
        PreflightStep::NotOwnIdentifier,
    ];
}

/// Drives a single payment through the registry checks, the transfer and the
/// confirmation wait.
///
/// The orchestrator holds no state of its own; concurrent submissions are not
/// serialized here; nonce ordering is left to the signer behind the
/// [`ContractClient`](crate::domain::ports::ContractClient).
pub struct PaymentOrchestrator {
    contracts: SharedContractClient,
    notifier: SharedNotifier,
    config: Arc<Config>,
}

impl PaymentOrchestrator {
    pub fn new(
        contracts: SharedContractClient,
        notifier: SharedNotifier,
        config: Arc<Config>,
    ) -> Self {
        Self {
            contracts,
            notifier,
            config,
        }
    }

    /// Sends `amount` of `token` to the wallet registered under `recipient`.
    ///
    /// Malformed input fails before any contract call is made. A transfer is
    /// only submitted once every pre-flight check has passed, and the returned
    /// hash refers to a confirmed transaction. Failures are reported once
    /// through the notifier and then returned; nothing is retried.
    pub async fn submit_payment(
        &self,
        context: Option<WalletContext>,
        recipient: &str,
        amount: &str,
        token: TokenKind,
    ) -> Result<H256> {
        let context = context.ok_or(PaymentError::NotInitialized)?;

        match self.run(context, recipient, amount, token).await {
            Ok(tx) => {
                info!(?tx, recipient, amount, %token, "payment confirmed");
                self.notifier.success("Payment sent successfully!");
                Ok(tx)
            }
            Err(e) => {
                error!(recipient, amount, %token, error = %e, "failed to send payment");
                self.notifier
                    .failure(&format!("Failed to send payment: {e}"));
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        context: WalletContext,
        recipient: &str,
        amount: &str,
        token: TokenKind,
    ) -> Result<H256> {
        let intent = PaymentIntent::new(recipient, amount, token)?;
        let token_address = self
            .config
            .token_address(token)
            .ok_or_else(|| PaymentError::UnsupportedToken(token.to_string()))?;

        for step in PreflightStep::ORDER {
            debug!(?step, recipient = %intent.recipient, "running pre-flight check");
            if let Check::Fail(reason) = self.check(step, &context, &intent, token_address).await {
                return Err(reason);
            }
        }

        info!(
            wallet = ?context.wallet,
            recipient = %intent.recipient,
            units = %intent.amount,
            %token,
            "pre-flight checks passed, submitting payment"
        );
        let tx = if token.is_native() {
            self.contracts
                .send_payment(
                    context.wallet,
                    intent.recipient.as_str(),
                    intent.amount,
                    context.account,
                )
                .await?
        } else {
            self.contracts
                .send_token_payment(
                    context.wallet,
                    intent.recipient.as_str(),
                    token_address,
                    intent.amount,
                    context.account,
                )
                .await?
        };

        debug!(?tx, "waiting for confirmation");
        self.contracts.wait_for_transaction(tx).await?;
        Ok(tx)
    }

    async fn check(
        &self,
        step: PreflightStep,
        context: &WalletContext,
        intent: &PaymentIntent,
        token_address: Address,
    ) -> Check {
        let outcome = match step {
            PreflightStep::RecipientRegistered => self.check_recipient_registered(intent).await,
            PreflightStep::SufficientBalance => {
                self.check_balance(context, intent, token_address).await
            }
            PreflightStep::RecipientWallet => self.check_recipient_wallet(context, intent).await,
            PreflightStep::NotOwnIdentifier => {
                return self.check_own_identifiers(context, intent).await;
            }
        };

        outcome.unwrap_or_else(Check::Fail)
    }

    async fn check_recipient_registered(&self, intent: &PaymentIntent) -> Result<Check> {
        // An available identifier is one nobody has registered yet.
        let available = self
            .contracts
            .is_identifier_available(intent.recipient.as_str())
            .await?;
        if available {
            return Ok(Check::Fail(PaymentError::RecipientNotRegistered(
                intent.recipient.to_string(),
            )));
        }
        Ok(Check::Pass)
    }

    async fn check_balance(
        &self,
        context: &WalletContext,
        intent: &PaymentIntent,
        token_address: Address,
    ) -> Result<Check> {
        let balance = if intent.token.is_native() {
            self.contracts
                .get_balance(context.wallet, context.account)
                .await?
        } else {
            self.contracts
                .get_token_balance(context.wallet, context.account, token_address)
                .await?
        };

        let decimals = intent.token.decimals();
        debug!(
            balance = %format_amount(balance, decimals),
            requested = %format_amount(intent.amount, decimals),
            token = %intent.token,
            "balance check"
        );
        if balance < intent.amount {
            return Ok(Check::Fail(PaymentError::InsufficientBalance {
                token: intent.token.symbol().to_string(),
                available: format_amount(balance, decimals),
                requested: format_amount(intent.amount, decimals),
            }));
        }
        Ok(Check::Pass)
    }

    async fn check_recipient_wallet(
        &self,
        context: &WalletContext,
        intent: &PaymentIntent,
    ) -> Result<Check> {
        let recipient_wallet = self
            .contracts
            .get_wallet_by_identifier(intent.recipient.as_str())
            .await?;
        debug!(?recipient_wallet, "resolved recipient wallet");

        let outcome = if recipient_wallet.is_zero() {
            Check::Fail(PaymentError::RecipientNotRegistered(
                intent.recipient.to_string(),
            ))
        } else if recipient_wallet == context.account || recipient_wallet == context.wallet {
            Check::Fail(PaymentError::SelfPayment(intent.recipient.to_string()))
        } else if recipient_wallet == self.config.contracts.smart_wallet {
            Check::Fail(PaymentError::RecipientIsContractItself)
        } else {
            Check::Pass
        };
        Ok(outcome)
    }

    /// Advisory only: a registry failure here degrades to a warning.
    async fn check_own_identifiers(&self, context: &WalletContext, intent: &PaymentIntent) -> Check {
        match self.contracts.get_identifiers_by_wallet(context.wallet).await {
            Ok(own) if own.iter().any(|id| id == intent.recipient.as_str()) => Check::Fail(
                PaymentError::SelfPayment(intent.recipient.to_string()),
            ),
            Ok(_) => Check::Pass,
            Err(e) => {
                warn!(
                    error = %e,
                    "could not verify own identifiers, proceeding with caution"
                );
                Check::Pass
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identifier::IdentifierKind;
    use crate::domain::ports::ContractClient;
    use crate::domain::token::parse_amount;
    use crate::infrastructure::in_memory::InMemoryChain;
    use crate::infrastructure::notifier::RecordingNotifier;
    use ethers_core::types::U256;

    struct Fixture {
        chain: InMemoryChain,
        notifier: Arc<RecordingNotifier>,
        orchestrator: PaymentOrchestrator,
        sender: WalletContext,
    }

    async fn fixture() -> Fixture {
        let chain = InMemoryChain::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let orchestrator = PaymentOrchestrator::new(
            Arc::new(chain.clone()),
            notifier.clone(),
            Arc::new(Config::default()),
        );

        let account = Address::from_low_u64_be(0xa11ce);
        chain
            .create_wallet_with_identifier("alice", IdentifierKind::Username, account)
            .await
            .unwrap();
        let wallet = chain.get_user_wallet(account).await.unwrap();

        Fixture {
            chain,
            notifier,
            orchestrator,
            sender: WalletContext { account, wallet },
        }
    }

    #[tokio::test]
    async fn test_native_payment_end_to_end() {
        let f = fixture().await;
        let bob = Address::from_low_u64_be(0xb0b);
        f.chain
            .create_wallet_with_identifier("+15550100", IdentifierKind::Phone, bob)
            .await
            .unwrap();
        f.chain
            .mint(f.sender.wallet, Address::zero(), parse_amount("5.0", 18).unwrap())
            .await;

        let tx = f
            .orchestrator
            .submit_payment(Some(f.sender), "+15550100", "2.5", TokenKind::Mnt)
            .await
            .unwrap();

        let bob_wallet = f.chain.get_user_wallet(bob).await.unwrap();
        assert_eq!(
            f.chain.get_balance(bob_wallet, bob).await.unwrap(),
            U256::from(2_500_000_000_000_000_000u128)
        );
        assert_eq!(
            f.chain.get_balance(f.sender.wallet, f.sender.account).await.unwrap(),
            U256::from(2_500_000_000_000_000_000u128)
        );
        assert!(f.chain.is_confirmed(tx).await);
        assert_eq!(f.notifier.successes(), vec!["Payment sent successfully!"]);
        assert!(f.notifier.failures().is_empty());
    }

    #[tokio::test]
    async fn test_missing_session_is_not_initialized() {
        let f = fixture().await;
        let result = f
            .orchestrator
            .submit_payment(None, "bob", "1", TokenKind::Mnt)
            .await;
        assert!(matches!(result, Err(PaymentError::NotInitialized)));
        assert!(f.notifier.failures().is_empty());
    }

    #[tokio::test]
    async fn test_paying_own_identifier_is_self_payment() {
        let f = fixture().await;
        f.chain
            .mint(f.sender.wallet, Address::zero(), parse_amount("1", 18).unwrap())
            .await;

        let result = f
            .orchestrator
            .submit_payment(Some(f.sender), "alice", "0.5", TokenKind::Mnt)
            .await;
        assert!(matches!(result, Err(PaymentError::SelfPayment(_))));
        assert_eq!(f.notifier.failures().len(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_token_is_rejected() {
        let f = fixture().await;
        let result = f
            .orchestrator
            .submit_payment(Some(f.sender), "bob", "1", TokenKind::Weth)
            .await;
        assert!(matches!(result, Err(PaymentError::UnsupportedToken(_))));
    }
}
