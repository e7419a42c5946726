//! Read-only projections of wallet state for display.
//!
//! Each view keeps the snapshot from its last successful refresh and is the
//! only writer of that snapshot.

use crate::application::session::WalletContext;
use crate::config::Config;
use crate::domain::identifier::IdentifierKind;
use crate::domain::ports::{SharedContractClient, SharedNotifier};
use crate::domain::price::{PriceAsset, PriceMap};
use crate::domain::token::{TokenKind, amount_to_decimal, format_amount};
use crate::domain::transaction::{
    Direction, PaymentRecord, TransactionRecord, TransactionStatus,
};
use crate::error::Result;
use ethers_core::types::{Address, U256};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenBalance {
    pub token: TokenKind,
    pub symbol: String,
    pub name: String,
    pub address: Address,
    pub units: U256,
    /// Four decimal places.
    pub balance: String,
    /// Two decimal places; absent when no price is known.
    pub usd_value: Option<Decimal>,
}

pub struct BalancesView {
    contracts: SharedContractClient,
    notifier: SharedNotifier,
    config: Arc<Config>,
    balances: Vec<TokenBalance>,
    total_usd_value: Decimal,
}

impl BalancesView {
    pub fn new(contracts: SharedContractClient, notifier: SharedNotifier, config: Arc<Config>) -> Self {
        Self {
            contracts,
            notifier,
            config,
            balances: Vec::new(),
            total_usd_value: Decimal::ZERO,
        }
    }

    pub fn balances(&self) -> &[TokenBalance] {
        &self.balances
    }

    pub fn total_usd_value(&self) -> Decimal {
        self.total_usd_value
    }

    /// Reloads every configured token balance. No-op without a wallet.
    pub async fn refresh(
        &mut self,
        context: Option<WalletContext>,
        prices: Option<&PriceMap>,
    ) -> Result<()> {
        let Some(context) = context else {
            return Ok(());
        };

        match self.load(context, prices).await {
            Ok(balances) => {
                self.total_usd_value = balances.iter().filter_map(|b| b.usd_value).sum();
                self.balances = balances;
                Ok(())
            }
            Err(e) => {
                error!(wallet = ?context.wallet, error = %e, "failed to fetch balances");
                self.notifier.failure("Failed to refresh balances");
                Err(e)
            }
        }
    }

    async fn load(
        &self,
        context: WalletContext,
        prices: Option<&PriceMap>,
    ) -> Result<Vec<TokenBalance>> {
        let mut balances = Vec::new();
        for token in self.config.supported_tokens() {
            let Some(address) = self.config.token_address(token) else {
                continue;
            };
            let units = if token.is_native() {
                self.contracts
                    .get_balance(context.wallet, context.account)
                    .await?
            } else {
                self.contracts
                    .get_token_balance(context.wallet, context.account, address)
                    .await?
            };
            debug!(%token, %units, "fetched balance");
            balances.push(project_balance(token, address, units, prices));
        }
        Ok(balances)
    }
}

fn usd_price(token: TokenKind, prices: Option<&PriceMap>) -> Option<Decimal> {
    if token.is_stable() {
        return Some(Decimal::ONE);
    }
    let prices = prices?;
    match token {
        TokenKind::Mnt => Some(prices.usd(PriceAsset::Mantle)),
        TokenKind::Weth => Some(prices.usd(PriceAsset::Ethereum)),
        TokenKind::Usdc | TokenKind::Usdt => None,
    }
}

fn project_balance(
    token: TokenKind,
    address: Address,
    units: U256,
    prices: Option<&PriceMap>,
) -> TokenBalance {
    let amount = amount_to_decimal(units, token.decimals()).unwrap_or_default();
    TokenBalance {
        token,
        symbol: token.symbol().to_string(),
        name: token.name().to_string(),
        address,
        units,
        balance: format!("{:.4}", amount.round_dp(4)),
        usd_value: usd_price(token, prices).map(|price| (amount * price).round_dp(2)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserIdentifier {
    pub id: String,
    pub identifier: String,
    pub kind: IdentifierKind,
    /// Registered identifiers are treated as verified.
    pub verified: bool,
    pub is_default: bool,
}

pub struct IdentifiersView {
    contracts: SharedContractClient,
    identifiers: Vec<UserIdentifier>,
}

impl IdentifiersView {
    pub fn new(contracts: SharedContractClient) -> Self {
        Self {
            contracts,
            identifiers: Vec::new(),
        }
    }

    pub fn identifiers(&self) -> &[UserIdentifier] {
        &self.identifiers
    }

    pub async fn refresh(&mut self, context: Option<WalletContext>) -> Result<()> {
        let Some(context) = context else {
            return Ok(());
        };

        match self.contracts.get_identifiers_by_wallet(context.wallet).await {
            Ok(raw) => {
                self.identifiers = raw
                    .into_iter()
                    .enumerate()
                    .map(|(index, identifier)| UserIdentifier {
                        id: index.to_string(),
                        kind: IdentifierKind::of(&identifier),
                        identifier,
                        verified: true,
                        is_default: index == 0,
                    })
                    .collect();
                Ok(())
            }
            Err(e) => {
                error!(wallet = ?context.wallet, error = %e, "failed to load identifiers");
                Err(e.into())
            }
        }
    }
}

pub struct TransactionsView {
    contracts: SharedContractClient,
    notifier: SharedNotifier,
    config: Arc<Config>,
    transactions: Vec<TransactionRecord>,
}

impl TransactionsView {
    pub fn new(contracts: SharedContractClient, notifier: SharedNotifier, config: Arc<Config>) -> Self {
        Self {
            contracts,
            notifier,
            config,
            transactions: Vec::new(),
        }
    }

    /// Newest first.
    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    pub async fn refresh(&mut self, context: Option<WalletContext>) -> Result<()> {
        let Some(context) = context else {
            return Ok(());
        };

        let fetched = tokio::try_join!(
            self.contracts
                .get_sent_payments(context.wallet, context.account),
            self.contracts
                .get_received_payments(context.wallet, context.account),
        );

        match fetched {
            Ok((sent, received)) => {
                self.transactions = merge_history(&self.config, sent, received);
                Ok(())
            }
            Err(e) => {
                error!(wallet = ?context.wallet, error = %e, "failed to load transactions");
                self.notifier.failure("Failed to load transaction history");
                Err(e.into())
            }
        }
    }
}

/// Merges sent and received payments into one list sorted newest first.
pub fn merge_history(
    config: &Config,
    sent: Vec<PaymentRecord>,
    received: Vec<PaymentRecord>,
) -> Vec<TransactionRecord> {
    let label = |direction: Direction, records: Vec<PaymentRecord>| {
        records
            .into_iter()
            .enumerate()
            .map(move |(index, record)| project_record(config, direction, index, record))
    };

    let mut history: Vec<TransactionRecord> = label(Direction::Sent, sent)
        .chain(label(Direction::Received, received))
        .collect();
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    history
}

fn project_record(
    config: &Config,
    direction: Direction,
    index: usize,
    record: PaymentRecord,
) -> TransactionRecord {
    let prefix = match direction {
        Direction::Sent => "sent",
        Direction::Received => "received",
    };
    let token = config.token_by_address(record.token);
    let decimals = token.map_or(18, |t| t.decimals());

    TransactionRecord {
        id: format!("{prefix}-{index}"),
        direction,
        amount: format_amount(record.amount, decimals),
        token: token.map_or("TOKEN", |t| t.symbol()).to_string(),
        identifier_kind: IdentifierKind::of(&record.identifier),
        identifier: record.identifier,
        timestamp: record.timestamp,
        status: TransactionStatus::Completed,
    }
}
