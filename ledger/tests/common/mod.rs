#![allow(dead_code)]

use {
  fundme_ledger::{
    Config,
    Crowdfund,
    FixedPriceFeed,
    Payout,
    PriceOracle,
    TransferError,
  },
  fundme_primitives::{Address, NativeAmount},
  parking_lot::Mutex,
  std::sync::Arc,
};

pub fn owner() -> Address {
  account(0)
}

/// Stable test identities, account 0 is the deployer.
pub fn account(index: u8) -> Address {
  let mut bytes = [0u8; 32];
  bytes[0] = 0xfd;
  bytes[31] = index;
  Address::from(bytes)
}

pub fn native(amount: &str) -> NativeAmount {
  amount.parse().expect("valid amount literal")
}

/// A ledger owned by account 0, priced by a 2000.00000000 feed at
/// 8 decimals, with a minimum of 50.00000000.
pub fn crowdfund() -> (Crowdfund, Arc<FixedPriceFeed>) {
  let feed = Arc::new(FixedPriceFeed::default());
  let ledger = Crowdfund::new(
    PriceOracle::new(feed.clone()),
    owner(),
    Config::default(),
  );
  (ledger, feed)
}

/// Records every outbound transfer, optionally rejecting them.
#[derive(Default)]
pub struct RecordingPayout {
  pub reject: bool,
  pub transfers: Mutex<Vec<(Address, Address, NativeAmount)>>,
}

impl RecordingPayout {
  pub fn rejecting() -> Self {
    Self {
      reject: true,
      ..Default::default()
    }
  }

  pub fn total_to(&self, to: &Address) -> u128 {
    self
      .transfers
      .lock()
      .iter()
      .filter(|(_, recipient, _)| recipient == to)
      .map(|(_, _, amount)| amount.units())
      .sum()
  }
}

impl Payout for RecordingPayout {
  fn transfer(
    &self,
    from: &Address,
    to: &Address,
    amount: NativeAmount,
  ) -> Result<(), TransferError> {
    if self.reject {
      return Err(TransferError::Rejected("recipient refuses funds".into()));
    }
    if amount.is_zero() {
      return Err(TransferError::ZeroValue);
    }
    self.transfers.lock().push((*from, *to, amount));
    Ok(())
  }
}
