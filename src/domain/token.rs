use crate::error::PaymentError;
use ethers_core::types::U256;
use ethers_core::utils::{format_units, parse_units};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transferable assets supported by the payment processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TokenKind {
    /// Native currency, represented on-chain by the zero token address.
    #[default]
    Mnt,
    Usdc,
    Usdt,
    Weth,
}

impl TokenKind {
    pub const ALL: [TokenKind; 4] = [
        TokenKind::Mnt,
        TokenKind::Usdc,
        TokenKind::Usdt,
        TokenKind::Weth,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Mnt => "MNT",
            TokenKind::Usdc => "USDC",
            TokenKind::Usdt => "USDT",
            TokenKind::Weth => "WETH",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Mnt => "Mantle",
            TokenKind::Usdc => "USD Coin",
            TokenKind::Usdt => "Tether USD",
            TokenKind::Weth => "Wrapped Ether",
        }
    }

    pub fn decimals(&self) -> u32 {
        match self {
            TokenKind::Usdc | TokenKind::Usdt => 6,
            TokenKind::Mnt | TokenKind::Weth => 18,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, TokenKind::Mnt)
    }

    pub fn is_stable(&self) -> bool {
        matches!(self, TokenKind::Usdc | TokenKind::Usdt)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl TryFrom<String> for TokenKind {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for TokenKind {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenKind::ALL
            .into_iter()
            .find(|kind| kind.symbol().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PaymentError::UnsupportedToken(s.to_string()))
    }
}

/// Largest number of decimal digits that always fits in a `uint256`.
const MAX_DIGITS: usize = 77;

/// Parses a positive decimal string into base units of the given precision.
///
/// Only plain decimal notation is accepted: digits with at most one `.`.
/// Zero, negative, non-numeric and over-precise inputs are rejected.
pub fn parse_amount(amount: &str, decimals: u32) -> Result<U256, PaymentError> {
    let trimmed = amount.trim();
    if trimmed.starts_with('-') {
        return Err(PaymentError::InvalidAmount(
            "Amount must be positive".to_string(),
        ));
    }

    let not_a_number = || PaymentError::InvalidAmount(format!("\"{amount}\" is not a number"));
    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
        return Err(not_a_number());
    }

    let frac = frac.trim_end_matches('0');
    if frac.len() > decimals as usize {
        return Err(PaymentError::InvalidAmount(format!(
            "\"{amount}\" has more than {decimals} decimal places"
        )));
    }
    let whole = whole.trim_start_matches('0');
    if whole.len() + decimals as usize > MAX_DIGITS {
        return Err(PaymentError::InvalidAmount(format!(
            "\"{amount}\" is out of range"
        )));
    }

    let normalized = match (whole.is_empty(), frac.is_empty()) {
        (true, true) => "0".to_string(),
        (_, true) => whole.to_string(),
        (true, false) => format!("0.{frac}"),
        (false, false) => format!("{whole}.{frac}"),
    };
    let units: U256 = parse_units(normalized, decimals)
        .map_err(|_| not_a_number())?
        .into();
    if units.is_zero() {
        return Err(PaymentError::InvalidAmount(
            "Amount must be positive".to_string(),
        ));
    }
    Ok(units)
}

/// Renders base units as a decimal string without trailing zeros.
pub fn format_amount(units: U256, decimals: u32) -> String {
    match format_units(units, decimals) {
        Ok(text) if text.contains('.') => text
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string(),
        Ok(text) => text,
        Err(_) => units.to_string(),
    }
}

/// Lossy conversion for display and fiat valuation. `None` when the amount
/// does not fit a `Decimal`.
pub fn amount_to_decimal(units: U256, decimals: u32) -> Option<Decimal> {
    Decimal::from_str(&format_amount(units, decimals)).ok()
}
