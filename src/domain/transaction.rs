use super::identifier::{Identifier, IdentifierKind};
use super::token::{TokenKind, parse_amount};
use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// A raw payment request as read from user input, before validation.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct PaymentRequest {
    pub recipient: String,
    pub amount: String,
    /// Defaults to the native currency when left blank.
    pub token: Option<TokenKind>,
}

impl PaymentRequest {
    pub fn token(&self) -> TokenKind {
        self.token.unwrap_or_default()
    }
}

/// A validated payment, ready to be checked against the chain.
///
/// Constructed per submission and dropped once the submission resolves.
#[derive(Debug, PartialEq, Clone)]
pub struct PaymentIntent {
    pub recipient: Identifier,
    /// Base units of `token`.
    pub amount: U256,
    pub token: TokenKind,
}

impl PaymentIntent {
    pub fn new(recipient: &str, amount: &str, token: TokenKind) -> crate::error::Result<Self> {
        let recipient = Identifier::new(recipient)?;
        let amount = parse_amount(amount, token.decimals())?;
        Ok(Self {
            recipient,
            amount,
            token,
        })
    }
}

/// A payment event as reported by the payment processor.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentRecord {
    pub identifier: String,
    /// Zero for the native currency.
    pub token: Address,
    pub amount: U256,
    /// Unix seconds.
    pub timestamp: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Completed,
    Pending,
    Failed,
}

/// Display projection of a sent or received payment.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct TransactionRecord {
    pub id: String,
    pub direction: Direction,
    pub amount: String,
    pub token: String,
    pub identifier: String,
    pub identifier_kind: IdentifierKind,
    pub timestamp: u64,
    pub status: TransactionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentError;

    #[test]
    fn test_payment_request_deserialization_defaults_token() {
        let csv = "recipient, amount, token\nalice, 1.5, \n+4412345, 2, USDC";
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv.as_bytes());
        let requests: Vec<PaymentRequest> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .expect("Failed to deserialize requests");

        assert_eq!(requests[0].token(), TokenKind::Mnt);
        assert_eq!(requests[1].recipient, "+4412345");
        assert_eq!(requests[1].token(), TokenKind::Usdc);
    }

    #[test]
    fn test_payment_intent_validation() {
        let intent = PaymentIntent::new("bob", "2.5", TokenKind::Mnt).unwrap();
        assert_eq!(intent.amount, U256::from(2_500_000_000_000_000_000u128));

        assert!(matches!(
            PaymentIntent::new("", "1", TokenKind::Mnt),
            Err(PaymentError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            PaymentIntent::new("bob", "-3", TokenKind::Usdt),
            Err(PaymentError::InvalidAmount(_))
        ));
    }
}
