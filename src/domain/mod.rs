//! Client-side projections of on-chain state and the ports to reach it.

pub mod identifier;
pub mod ports;
pub mod price;
pub mod token;
pub mod transaction;
