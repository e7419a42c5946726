use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Assets quoted by the price feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceAsset {
    Mantle,
    Ethereum,
}

impl PriceAsset {
    pub const ALL: [PriceAsset; 2] = [PriceAsset::Mantle, PriceAsset::Ethereum];

    /// Key used by the price index, e.g. `coingecko:mantle`.
    pub fn coin_id(&self) -> &'static str {
        match self {
            PriceAsset::Mantle => "coingecko:mantle",
            PriceAsset::Ethereum => "coingecko:ethereum",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            PriceAsset::Mantle => "MNT",
            PriceAsset::Ethereum => "ETH",
        }
    }
}

/// Current USD prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceMap {
    pub mantle: Decimal,
    pub ethereum: Decimal,
}

impl PriceMap {
    pub fn usd(&self, asset: PriceAsset) -> Decimal {
        match asset {
            PriceAsset::Mantle => self.mantle,
            PriceAsset::Ethereum => self.ethereum,
        }
    }
}

/// Current USD prices with the percentage change over the last 24 hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceWithChange {
    pub usd: PriceMap,
    pub change_24h_pct: PriceMap,
}

/// Percentage change from `previous` to `current`; zero when there is no
/// previous price.
pub fn percent_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return Decimal::ZERO;
    }
    (current - previous) / previous * Decimal::ONE_HUNDRED
}

/// Renders a fiat amount with two decimals and thousands separators.
pub fn format_fiat(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(dec!(110), dec!(100)), dec!(10));
        assert_eq!(percent_change(dec!(50), dec!(100)), dec!(-50));
        assert_eq!(percent_change(dec!(50), dec!(0)), dec!(0));
    }

    #[test]
    fn test_format_fiat() {
        assert_eq!(format_fiat(dec!(0)), "0.00");
        assert_eq!(format_fiat(dec!(12.3)), "12.30");
        assert_eq!(format_fiat(dec!(1234.567)), "1,234.57");
        assert_eq!(format_fiat(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(format_fiat(dec!(-9876.5)), "-9,876.50");
    }
}
