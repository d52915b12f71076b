use {
  crate::{auth::Owner, Config, Error},
  fundme_primitives::{Address, NativeAmount},
  serde::{Deserialize, Serialize},
  std::collections::HashMap,
};

/// Seeds used to derive the address under which the ledger keeps
/// contributed funds.
const CUSTODY_SEEDS: &[&[u8]] = &[b"fundme", b"custody"];

/// Everything the ledger knows, in a form that can be persisted by the
/// hosting environment and restored later.
///
/// The roster and per-contributor totals are a permanent record: a
/// withdrawal resets the held balance but never clears who contributed
/// or how much.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
  pub(crate) owner: Owner,
  pub(crate) custody: Address,
  pub(crate) config: Config,

  /// cumulative amount per contributor
  pub(crate) contributions: HashMap<Address, NativeAmount>,

  /// contributors in first-contribution order, each exactly once
  pub(crate) contributors: Vec<Address>,

  /// funds available for withdrawal
  pub(crate) held: NativeAmount,

  /// funds taken out of `held` by a withdrawal whose outbound
  /// transfer has not completed yet
  pub(crate) pending: Option<NativeAmount>,

  /// number of completed withdrawals
  pub(crate) cycle: u64,

  /// lifetime total of accepted contributions
  pub(crate) raised: NativeAmount,
}

impl LedgerState {
  pub fn new(owner: Address, config: Config) -> Self {
    Self {
      owner: Owner::new(owner),
      custody: owner.derive(CUSTODY_SEEDS),
      config,
      contributions: HashMap::new(),
      contributors: Vec::new(),
      held: NativeAmount::ZERO,
      pending: None,
      cycle: 0,
      raised: NativeAmount::ZERO,
    }
  }

  /// Records an accepted contribution.
  ///
  /// All new totals are computed before anything is written, so an
  /// overflow leaves the state untouched. The bound includes funds in
  /// flight to the owner, which guarantees that returning them to the
  /// held balance after a failed transfer can't overflow either.
  pub(crate) fn record(
    &mut self,
    caller: &Address,
    amount: NativeAmount,
  ) -> Result<(), Error> {
    let current = self.contribution_of(caller);
    let total = current.checked_add(amount).ok_or(Error::Overflow)?;
    let held = self.held.checked_add(amount).ok_or(Error::Overflow)?;
    let raised = self.raised.checked_add(amount).ok_or(Error::Overflow)?;
    held
      .checked_add(self.pending.unwrap_or_default())
      .ok_or(Error::Overflow)?;

    if !self.contributions.contains_key(caller) {
      self.contributors.push(*caller);
    }
    self.contributions.insert(*caller, total);
    self.held = held;
    self.raised = raised;
    Ok(())
  }

  pub fn owner(&self) -> &Address {
    self.owner.identity()
  }

  pub fn custody(&self) -> &Address {
    &self.custody
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn donors_count(&self) -> usize {
    self.contributors.len()
  }

  pub fn donor_at(&self, index: usize) -> Result<&Address, Error> {
    self.contributors.get(index).ok_or(Error::IndexOutOfRange {
      index,
      len: self.contributors.len(),
    })
  }

  pub fn contribution_of(&self, identity: &Address) -> NativeAmount {
    self
      .contributions
      .get(identity)
      .copied()
      .unwrap_or_default()
  }

  /// Contributors and their totals, in roster order.
  pub fn donors(&self) -> impl Iterator<Item = (&Address, NativeAmount)> {
    self
      .contributors
      .iter()
      .map(|addr| (addr, self.contribution_of(addr)))
  }

  pub fn held_balance(&self) -> NativeAmount {
    self.held
  }

  pub fn pending_withdrawal(&self) -> Option<NativeAmount> {
    self.pending
  }

  pub fn funding_cycle(&self) -> u64 {
    self.cycle
  }

  pub fn total_raised(&self) -> NativeAmount {
    self.raised
  }
}
