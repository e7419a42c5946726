use crate::application::views::TokenBalance;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct BalanceRow<'a> {
    token: &'a str,
    name: &'a str,
    balance: &'a str,
    usd_value: Option<String>,
}

/// Writes token balances as CSV.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_balances(&mut self, balances: &[TokenBalance]) -> Result<()> {
        for balance in balances {
            self.writer.serialize(BalanceRow {
                token: &balance.symbol,
                name: &balance.name,
                balance: &balance.balance,
                usd_value: balance.usd_value.map(|v| format!("{v:.2}")),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
