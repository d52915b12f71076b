use {
  crate::{
    auth::Unauthorized,
    oracle::{self, PriceOracle},
    Config,
    LedgerState,
    Payout,
    TransferError,
  },
  fundme_primitives::{Address, NativeAmount, ReferenceValue},
  parking_lot::RwLock,
  thiserror::Error,
  tracing::{debug, info, warn},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("contributions must be greater than zero")]
  ZeroContribution,

  #[error(
    "contribution valued at {} is below the minimum of {}",
    .value.units(),
    .minimum.units()
  )]
  InsufficientContribution {
    value: ReferenceValue,
    minimum: ReferenceValue,
  },

  #[error(transparent)]
  Unauthorized(#[from] Unauthorized),

  #[error("donor index {index} out of range, there are {len} donors")]
  IndexOutOfRange { index: usize, len: usize },

  #[error("oracle unavailable: {0}")]
  OracleUnavailable(oracle::Error),

  #[error("nothing to withdraw")]
  NothingToWithdraw,

  #[error("a withdrawal is already in progress")]
  WithdrawalInProgress,

  #[error("withdrawal transfer failed: {0}")]
  TransferFailed(#[from] TransferError),

  #[error("amount overflow")]
  Overflow,
}

impl From<oracle::Error> for Error {
  fn from(e: oracle::Error) -> Self {
    match e {
      oracle::Error::Overflow => Error::Overflow,
      e => Error::OracleUnavailable(e),
    }
  }
}

/// A crowdfunding ledger that can be shared between threads.
///
/// Contributions are valued through a price oracle and gated by a
/// minimum reference value. The owner that created the ledger can
/// withdraw everything it holds.
///
/// All mutations are serialized behind a single write lock, including
/// the oracle read of a contribution, so two contributions never
/// interleave. Queries share a read lock and never observe a roster
/// entry without its matching total.
#[derive(Debug)]
pub struct Crowdfund {
  oracle: PriceOracle,
  state: RwLock<LedgerState>,
}

impl Crowdfund {
  pub fn new(oracle: PriceOracle, owner: Address, config: Config) -> Self {
    let state = LedgerState::new(owner, config);
    info!(
      "ledger created by {owner}, funds held at {}, minimum contribution \
       {}",
      state.custody(),
      config.minimum.format(config.reference_decimals)
    );
    Self::restore(oracle, state)
  }

  /// Resumes a ledger from previously persisted state.
  ///
  /// A withdrawal that was still in flight when the state was captured
  /// never settled, so it is treated as failed and its funds go back
  /// into the held balance.
  pub fn restore(oracle: PriceOracle, mut state: LedgerState) -> Self {
    match state.abandon_withdrawal() {
      Ok(Some(amount)) => {
        warn!("unsettled withdrawal of {amount} returned to held balance")
      }
      Ok(None) => {}
      Err(e) => warn!("can't return unsettled withdrawal: {e}"),
    }
    Self {
      oracle,
      state: RwLock::new(state),
    }
  }

  /// Accepts `amount` from `caller` if it is worth at least the minimum.
  ///
  /// The caller's escrowed funds must be returned by the surrounding
  /// transfer mechanism when this fails. On failure nothing in the
  /// ledger changes.
  pub fn contribute(
    &self,
    caller: &Address,
    amount: NativeAmount,
  ) -> Result<(), Error> {
    if amount.is_zero() {
      return Err(Error::ZeroContribution);
    }

    let mut state = self.state.write();
    let config = *state.config();
    let value = self
      .oracle
      .value_of(amount, config.reference_decimals)
      .map_err(|e| {
        warn!("can't value contribution from {caller}: {e}");
        e
      })?;

    if value < config.minimum {
      debug!(
        "rejected contribution of {amount} from {caller} valued at {}",
        value.format(config.reference_decimals)
      );
      return Err(Error::InsufficientContribution {
        value,
        minimum: config.minimum,
      });
    }

    state.record(caller, amount)?;
    info!(
      "accepted contribution of {amount} from {caller} valued at {}, total \
       held {}",
      value.format(config.reference_decimals),
      state.held_balance()
    );
    Ok(())
  }

  /// Sends the entire held balance to the owner.
  ///
  /// The balance is zeroed under the lock, then the lock is released for
  /// the duration of the outbound transfer. Anything the payout path does
  /// with this ledger in the meantime, including calling `withdraw`
  /// again, sees an empty balance. If the transfer fails the funds are
  /// returned to the held balance.
  pub fn withdraw(
    &self,
    caller: &Address,
    payout: &dyn Payout,
  ) -> Result<NativeAmount, Error> {
    let (custody, owner, amount) = {
      let mut state = self.state.write();
      let amount = state.begin_withdrawal(caller).map_err(|e| {
        debug!("withdrawal by {caller} refused: {e}");
        e
      })?;
      (*state.custody(), *state.owner(), amount)
    };

    let outcome = payout.transfer(&custody, &owner, amount);
    let settled = self.state.write().settle_withdrawal(outcome);

    match &settled {
      Ok(amount) => info!("withdrew {amount} to {owner}"),
      Err(e) => warn!("withdrawal of {amount} to {owner} failed: {e}"),
    }
    settled
  }

  /// Pre-flight estimate of what `amount` is worth in the reference
  /// currency at the current rate.
  pub fn value_of(&self, amount: NativeAmount) -> Result<ReferenceValue, Error> {
    let decimals = self.reference_decimals();
    Ok(self.oracle.value_of(amount, decimals)?)
  }

  pub fn donors_count(&self) -> usize {
    self.state.read().donors_count()
  }

  pub fn donor_at(&self, index: usize) -> Result<Address, Error> {
    self.state.read().donor_at(index).copied()
  }

  pub fn contribution_of(&self, identity: &Address) -> NativeAmount {
    self.state.read().contribution_of(identity)
  }

  /// The whole roster with totals, read atomically. Enumerating with
  /// `donors_count` and `donor_at` may observe contributions made
  /// between the calls, this doesn't.
  pub fn donors(&self) -> Vec<(Address, NativeAmount)> {
    self
      .state
      .read()
      .donors()
      .map(|(addr, amount)| (*addr, amount))
      .collect()
  }

  pub fn owner(&self) -> Address {
    *self.state.read().owner()
  }

  pub fn is_owner(&self, identity: &Address) -> bool {
    self.state.read().owner.is_owner(identity)
  }

  /// Address under which contributed funds are held.
  pub fn custody(&self) -> Address {
    *self.state.read().custody()
  }

  pub fn minimum_reference_value(&self) -> ReferenceValue {
    self.state.read().config().minimum
  }

  pub fn reference_decimals(&self) -> u8 {
    self.state.read().config().reference_decimals
  }

  pub fn held_balance(&self) -> NativeAmount {
    self.state.read().held_balance()
  }

  pub fn funding_cycle(&self) -> u64 {
    self.state.read().funding_cycle()
  }

  pub fn total_raised(&self) -> NativeAmount {
    self.state.read().total_raised()
  }

  /// Copy of the current state, for persistence.
  pub fn snapshot(&self) -> LedgerState {
    self.state.read().clone()
  }
}
