use thiserror::Error;

/// Failure reported by the contract layer.
///
/// The message of the underlying transport or revert is always preserved so it
/// can be surfaced to the user unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("execution reverted: {0}")]
    Reverted(String),
    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Wallet not initialized")]
    NotInitialized,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("Unsupported token: {0}")]
    UnsupportedToken(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error(
        "Recipient identifier \"{0}\" is not registered. Please ask them to register first."
    )]
    RecipientNotRegistered(String),
    #[error(
        "Insufficient {token} balance. You have {available} {token}, but trying to send {requested} {token}"
    )]
    InsufficientBalance {
        token: String,
        available: String,
        requested: String,
    },
    #[error("Cannot send payment to yourself: {0}")]
    SelfPayment(String),
    #[error("Cannot send payment to the smart wallet contract")]
    RecipientIsContractItself,
    #[error("Contract call failed: {0}")]
    ExternalCall(#[from] ContractError),
    #[error("Price feed error: {0}")]
    PriceFeed(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
