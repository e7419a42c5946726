use crate::domain::transaction::PaymentRequest;
use crate::error::{PaymentError, Result};
use std::io::Read;

/// Source of batched payments.
///
/// The batch file has a `recipient,amount,token` header and one payment per
/// row. `recipient` is a phone number (leading `+`) or a username, `amount`
/// is a plain decimal in whole tokens, and `token` is a symbol matched
/// case-insensitively. The token cell may be blank or missing, which means
/// MNT. Rows are yielded one at a time so a bad row never aborts the batch.
pub struct PaymentReader<R: Read> {
    rows: csv::DeserializeRecordsIntoIter<R, PaymentRequest>,
}

impl<R: Read> PaymentReader<R> {
    pub fn new(source: R) -> Self {
        let rows = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source)
            .into_deserialize();
        Self { rows }
    }
}

impl<R: Read> Iterator for PaymentReader<R> {
    type Item = Result<PaymentRequest>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| row.map_err(PaymentError::from))
    }
}
