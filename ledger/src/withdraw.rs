use {
  crate::{Error, LedgerState},
  fundme_primitives::{Address, NativeAmount},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
  #[error("zero-value transfer")]
  ZeroValue,

  #[error("insufficient funds: {available} available, {requested} requested")]
  InsufficientFunds {
    available: NativeAmount,
    requested: NativeAmount,
  },

  #[error("transfer rejected by recipient: {0}")]
  Rejected(String),
}

/// Outbound value transfer, provided by the environment hosting
/// the ledger.
///
/// A transfer either moves the full amount from `from` to `to` or
/// fails without moving anything.
pub trait Payout {
  fn transfer(
    &self,
    from: &Address,
    to: &Address,
    amount: NativeAmount,
  ) -> Result<(), TransferError>;
}

impl LedgerState {
  /// First phase of a withdrawal.
  ///
  /// Checks that the caller is the owner and moves the entire held
  /// balance into the pending slot. Once this returns, the held balance
  /// is zero, so any withdrawal attempted while the transfer is in
  /// flight finds nothing to pay out.
  pub(crate) fn begin_withdrawal(
    &mut self,
    caller: &Address,
  ) -> Result<NativeAmount, Error> {
    self.owner.ensure(caller)?;

    if self.pending.is_some() {
      return Err(Error::WithdrawalInProgress);
    }

    if self.held.is_zero() {
      return Err(Error::NothingToWithdraw);
    }

    let amount = std::mem::take(&mut self.held);
    self.pending = Some(amount);
    Ok(amount)
  }

  /// Second phase of a withdrawal, after the outbound transfer ran.
  ///
  /// On success the funding cycle is closed. On failure the pending
  /// amount goes back into the held balance, on top of anything that
  /// was contributed in the meantime.
  pub(crate) fn settle_withdrawal(
    &mut self,
    outcome: Result<(), TransferError>,
  ) -> Result<NativeAmount, Error> {
    let amount = self.pending.take().unwrap_or_default();
    match outcome {
      Ok(()) => {
        self.cycle += 1;
        Ok(amount)
      }
      Err(e) => {
        // bounded in `record`
        self.held = self.held.checked_add(amount).ok_or(Error::Overflow)?;
        Err(Error::TransferFailed(e))
      }
    }
  }

  /// Returns the funds of a withdrawal that will never be settled, such
  /// as one captured mid-flight in a persisted snapshot.
  pub(crate) fn abandon_withdrawal(
    &mut self,
  ) -> Result<Option<NativeAmount>, Error> {
    let amount = match self.pending {
      Some(amount) => amount,
      None => return Ok(None),
    };
    self.held = self.held.checked_add(amount).ok_or(Error::Overflow)?;
    self.pending = None;
    Ok(Some(amount))
  }
}

#[cfg(test)]
mod tests {
  use {
    super::TransferError,
    crate::{auth::Unauthorized, Config, Error, LedgerState},
    fundme_primitives::{Address, NativeAmount},
  };

  fn addr(b: u8) -> Address {
    Address::from([b; 32])
  }

  fn funded() -> anyhow::Result<LedgerState> {
    let mut state = LedgerState::new(addr(0), Config::default());
    state.record(&addr(1), NativeAmount::new(100))?;
    state.record(&addr(2), NativeAmount::new(50))?;
    Ok(state)
  }

  #[test]
  fn balance_is_zeroed_before_settlement() -> anyhow::Result<()> {
    let mut state = funded()?;

    let amount = state.begin_withdrawal(&addr(0))?;
    assert_eq!(amount, NativeAmount::new(150));
    assert_eq!(state.held_balance(), NativeAmount::ZERO);
    assert_eq!(state.pending_withdrawal(), Some(NativeAmount::new(150)));

    // a second attempt while the first is in flight
    assert_eq!(
      state.begin_withdrawal(&addr(0)),
      Err(Error::WithdrawalInProgress)
    );

    assert_eq!(state.settle_withdrawal(Ok(()))?, NativeAmount::new(150));
    assert_eq!(state.pending_withdrawal(), None);
    assert_eq!(state.funding_cycle(), 1);

    // history survives the withdrawal
    assert_eq!(state.donors_count(), 2);
    assert_eq!(state.contribution_of(&addr(1)), NativeAmount::new(100));

    assert_eq!(
      state.begin_withdrawal(&addr(0)),
      Err(Error::NothingToWithdraw)
    );
    Ok(())
  }

  #[test]
  fn failed_transfer_restores_balance() -> anyhow::Result<()> {
    let mut state = funded()?;

    state.begin_withdrawal(&addr(0))?;
    state.record(&addr(3), NativeAmount::new(25))?;

    assert_eq!(
      state.settle_withdrawal(Err(TransferError::Rejected("nope".into()))),
      Err(Error::TransferFailed(TransferError::Rejected("nope".into())))
    );
    assert_eq!(state.held_balance(), NativeAmount::new(175));
    assert_eq!(state.pending_withdrawal(), None);
    assert_eq!(state.funding_cycle(), 0);
    Ok(())
  }

  #[test]
  fn abandoned_withdrawal_returns_funds() -> anyhow::Result<()> {
    let mut state = funded()?;
    assert_eq!(state.abandon_withdrawal()?, None);

    state.begin_withdrawal(&addr(0))?;
    assert_eq!(state.abandon_withdrawal()?, Some(NativeAmount::new(150)));
    assert_eq!(state.held_balance(), NativeAmount::new(150));
    assert_eq!(state.pending_withdrawal(), None);
    assert_eq!(state.funding_cycle(), 0);

    // the owner can withdraw again
    assert_eq!(state.begin_withdrawal(&addr(0))?, NativeAmount::new(150));
    Ok(())
  }

  #[test]
  fn strangers_cannot_begin() -> anyhow::Result<()> {
    let mut state = funded()?;
    let before = state.clone();

    assert_eq!(
      state.begin_withdrawal(&addr(1)),
      Err(Error::Unauthorized(Unauthorized(addr(1))))
    );
    assert_eq!(state, before);
    Ok(())
  }
}
