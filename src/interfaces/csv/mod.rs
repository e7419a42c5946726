pub mod balance_writer;
pub mod history_writer;
pub mod payment_reader;
