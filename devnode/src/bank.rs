use {
  dashmap::DashMap,
  fundme_ledger::{Payout, TransferError},
  fundme_primitives::{Address, NativeAmount},
  std::collections::HashMap,
  tracing::trace,
};

/// Native currency balances of every address known to the devnode.
///
/// Provides the value transfer primitives the ledger relies on: moving
/// funds from a contributor into the ledger's custody address, returning
/// them when a contribution is rejected, and paying out withdrawals.
#[derive(Debug, Default)]
pub struct Bank {
  balances: DashMap<Address, NativeAmount>,
}

impl Bank {
  pub fn from_snapshot(balances: HashMap<Address, NativeAmount>) -> Self {
    Self {
      balances: balances.into_iter().collect(),
    }
  }

  pub fn snapshot(&self) -> HashMap<Address, NativeAmount> {
    self
      .balances
      .iter()
      .map(|entry| (*entry.key(), *entry.value()))
      .collect()
  }

  pub fn balance_of(&self, address: &Address) -> NativeAmount {
    self
      .balances
      .get(address)
      .map(|b| *b.value())
      .unwrap_or_default()
  }

  /// Creates funds out of thin air, used to prefund dev accounts.
  pub fn mint(&self, to: &Address, amount: NativeAmount) {
    let mut balance = self.balances.entry(*to).or_default();
    *balance = balance.checked_add(amount).unwrap_or(*balance);
  }

  /// Moves `amount` from one address to another, all or nothing.
  pub fn transfer(
    &self,
    from: &Address,
    to: &Address,
    amount: NativeAmount,
  ) -> Result<(), TransferError> {
    if amount.is_zero() {
      return Err(TransferError::ZeroValue);
    }

    // debit first and release the entry before touching the
    // recipient, both may live in the same shard.
    {
      let mut source = self.balances.entry(*from).or_default();
      *source = source.checked_sub(amount).ok_or(
        TransferError::InsufficientFunds {
          available: *source,
          requested: amount,
        },
      )?;
    }

    let mut target = self.balances.entry(*to).or_default();
    match target.checked_add(amount) {
      Some(total) => *target = total,
      None => {
        drop(target);
        self.mint(from, amount);
        return Err(TransferError::Rejected(format!(
          "balance of {to} would overflow"
        )));
      }
    }

    trace!("transferred {amount} from {from} to {to}");
    Ok(())
  }
}

impl Payout for Bank {
  fn transfer(
    &self,
    from: &Address,
    to: &Address,
    amount: NativeAmount,
  ) -> Result<(), TransferError> {
    Bank::transfer(self, from, to, amount)
  }
}
