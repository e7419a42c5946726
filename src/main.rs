use clap::{Parser, Subcommand};
use ethers_core::types::Address;
use idpay::application::payment::PaymentOrchestrator;
use idpay::application::session::WalletSession;
use idpay::application::views::{BalancesView, IdentifiersView, TransactionsView};
use idpay::config::Config;
use idpay::domain::ports::{SharedContractClient, SharedNotifier};
use idpay::domain::price::{PriceAsset, format_fiat};
use idpay::domain::token::{TokenKind, format_amount, parse_amount};
use idpay::error::PaymentError;
use idpay::infrastructure::notifier::LogNotifier;
use idpay::infrastructure::price_feed::{PriceCache, PriceFeed};
use idpay::infrastructure::state_file::StateFile;
use idpay::interfaces::csv::balance_writer::BalanceWriter;
use idpay::interfaces::csv::history_writer::HistoryWriter;
use idpay::interfaces::csv::payment_reader::PaymentReader;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Devnet state file, created on first use
    #[arg(long, global = true, default_value = "idpay-state.json")]
    state: PathBuf,

    /// JSON file overriding the built-in network configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Account acting as the sender
    #[arg(
        long,
        global = true,
        default_value = "0x0000000000000000000000000000000000000001",
        value_parser = parse_address
    )]
    account: Address,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the account, its wallet and the network
    Status,
    /// Deploy a smart wallet, optionally registering an identifier with it
    CreateWallet {
        #[arg(long)]
        identifier: Option<String>,
    },
    /// Register another phone number or username for the wallet
    Register { identifier: String },
    /// Check whether an identifier is still free
    Available { identifier: String },
    /// Credit devnet funds to the wallet
    Faucet {
        amount: String,
        #[arg(long, default_value = "mnt")]
        token: TokenKind,
    },
    /// Send funds to a phone number or username
    Send {
        recipient: String,
        amount: String,
        #[arg(long, default_value = "mnt")]
        token: TokenKind,
    },
    /// Send every payment listed in a `recipient,amount,token` CSV file
    SendBatch { input: PathBuf },
    /// Print token balances as CSV
    Balances {
        /// Value MNT and WETH holdings with live prices
        #[arg(long)]
        with_prices: bool,
    },
    /// Print the wallet's registered identifiers as JSON
    Identifiers,
    /// Print sent and received payments as CSV, newest first
    History,
    /// Print current token prices
    Prices {
        #[arg(long)]
        with_change: bool,
    },
}

impl Command {
    fn mutates_state(&self) -> bool {
        matches!(
            self,
            Command::CreateWallet { .. }
                | Command::Register { .. }
                | Command::Faucet { .. }
                | Command::Send { .. }
                | Command::SendBatch { .. }
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("idpay=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Arc::new(match &cli.config {
        Some(path) => Config::load(path).into_diagnostic()?,
        None => Config::default(),
    });

    let state_file = StateFile::new(&cli.state);
    let chain = state_file.load().into_diagnostic()?;
    let contracts: SharedContractClient = Arc::new(chain.clone());
    let notifier: SharedNotifier = Arc::new(LogNotifier);

    let mut session = WalletSession::new(contracts.clone(), notifier.clone());
    session.initialize(cli.account).await;

    let mutates = cli.command.mutates_state();
    match cli.command {
        Command::Status => {
            println!("network: {} ({})", config.network, config.chain_id);
            println!("rpc: {}", config.rpc_url);
            println!("user registry: {:#x}", config.contracts.user_registry);
            println!("wallet factory: {:#x}", config.contracts.wallet_factory);
            println!(
                "wallet implementation: {:#x}",
                config.contracts.smart_wallet_implementation
            );
            println!("payment processor: {:#x}", config.contracts.payment_processor);
            println!("account: {:#x}", cli.account);
            match session.wallet() {
                Some(wallet) => {
                    println!("wallet: {wallet:#x}");
                    println!("explorer: {}", config.explorer_address_url(&wallet));
                }
                None => println!("wallet: none"),
            }
            if let Some(error) = session.error() {
                eprintln!("{error}");
            }
        }
        Command::CreateWallet { identifier } => {
            let wallet = session
                .create_wallet(identifier.as_deref())
                .await
                .into_diagnostic()?;
            println!("{wallet:#x}");
        }
        Command::Register { identifier } => {
            let tx = session
                .register_identifier(&identifier)
                .await
                .into_diagnostic()?;
            println!("{tx:#x}");
        }
        Command::Available { identifier } => {
            let available = session.check_availability(&identifier).await;
            println!("{}", if available { "available" } else { "taken" });
        }
        Command::Faucet { amount, token } => {
            let wallet = session
                .wallet()
                .ok_or(PaymentError::NotInitialized)
                .into_diagnostic()?;
            let address = config
                .token_address(token)
                .ok_or_else(|| PaymentError::UnsupportedToken(token.to_string()))
                .into_diagnostic()?;
            let units = parse_amount(&amount, token.decimals()).into_diagnostic()?;
            chain.mint(wallet, address, units).await;
            println!("{} {}", format_amount(units, token.decimals()), token);
        }
        Command::Send {
            recipient,
            amount,
            token,
        } => {
            let orchestrator =
                PaymentOrchestrator::new(contracts.clone(), notifier.clone(), config.clone());
            let tx = orchestrator
                .submit_payment(session.context(), &recipient, &amount, token)
                .await
                .into_diagnostic()?;
            println!("{tx:#x}");
            println!("{}", config.explorer_tx_url(&tx));
        }
        Command::SendBatch { input } => {
            let orchestrator =
                PaymentOrchestrator::new(contracts.clone(), notifier.clone(), config.clone());
            let file = File::open(input).into_diagnostic()?;
            for request in PaymentReader::new(file) {
                match request {
                    Ok(request) => {
                        match orchestrator
                            .submit_payment(
                                session.context(),
                                &request.recipient,
                                &request.amount,
                                request.token(),
                            )
                            .await
                        {
                            Ok(tx) => println!("{},{:#x}", request.recipient, tx),
                            Err(e) => eprintln!("Error processing payment: {}", e),
                        }
                    }
                    Err(e) => {
                        eprintln!("Error reading payment: {}", e);
                    }
                }
            }
        }
        Command::Balances { with_prices } => {
            let prices = if with_prices {
                Some(price_feed(&config).prices().await.into_diagnostic()?)
            } else {
                None
            };
            let mut view = BalancesView::new(contracts.clone(), notifier.clone(), config.clone());
            view.refresh(session.context(), prices.as_ref())
                .await
                .into_diagnostic()?;

            let stdout = io::stdout();
            let mut writer = BalanceWriter::new(stdout.lock());
            writer.write_balances(view.balances()).into_diagnostic()?;
            eprintln!("total: ${}", format_fiat(view.total_usd_value()));
        }
        Command::Identifiers => {
            let mut view = IdentifiersView::new(contracts.clone());
            view.refresh(session.context()).await.into_diagnostic()?;
            let stdout = io::stdout();
            serde_json::to_writer_pretty(stdout.lock(), view.identifiers()).into_diagnostic()?;
            println!();
        }
        Command::History => {
            let mut view =
                TransactionsView::new(contracts.clone(), notifier.clone(), config.clone());
            view.refresh(session.context()).await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = HistoryWriter::new(stdout.lock());
            writer
                .write_records(view.transactions())
                .into_diagnostic()?;
        }
        Command::Prices { with_change } => {
            let feed = price_feed(&config);
            if with_change {
                let quote = feed.prices_with_change().await.into_diagnostic()?;
                for asset in PriceAsset::ALL {
                    println!(
                        "{}: ${} ({}%)",
                        asset.symbol(),
                        format_fiat(quote.usd.usd(asset)),
                        format_fiat(quote.change_24h_pct.usd(asset))
                    );
                }
            } else {
                let prices = feed.prices().await.into_diagnostic()?;
                for asset in PriceAsset::ALL {
                    println!("{}: ${}", asset.symbol(), format_fiat(prices.usd(asset)));
                }
            }
        }
    }

    if mutates {
        state_file.save(&chain).await.into_diagnostic()?;
    }

    Ok(())
}

fn parse_address(raw: &str) -> std::result::Result<Address, PaymentError> {
    raw.parse()
        .map_err(|_| PaymentError::InvalidAddress(raw.to_string()))
}

fn price_feed(config: &Config) -> PriceFeed {
    PriceFeed::new(
        reqwest::Client::new(),
        &config.price_api_url,
        PriceCache::new(Duration::from_secs(config.price_cache_ttl_secs)),
    )
}
