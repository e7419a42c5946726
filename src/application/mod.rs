//! Application layer: the payment pipeline, the wallet session and the read
//! views built on top of the contract and notifier ports.

pub mod payment;
pub mod session;
pub mod views;
