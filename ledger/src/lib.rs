//! Crowdfunding ledger.
//!
//! Contributors send native currency to the ledger. Each contribution is
//! valued in a reference currency through an injected price feed and is
//! accepted only if it is worth at least a configured minimum. Accepted
//! contributions are recorded per contributor and accumulated into a held
//! balance that the owner, and only the owner, can withdraw in full.

mod auth;
mod config;
mod ledger;
mod state;
mod withdraw;

pub mod oracle;

pub use {
  auth::{Owner, Unauthorized},
  config::Config,
  ledger::{Crowdfund, Error},
  oracle::{
    Error as OracleError,
    FixedPriceFeed,
    PriceFeed,
    PriceOracle,
    Rate,
  },
  state::LedgerState,
  withdraw::{Payout, TransferError},
};
