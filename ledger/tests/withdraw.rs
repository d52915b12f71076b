use {
  common::{account, crowdfund, native, owner, RecordingPayout},
  fundme_ledger::{Crowdfund, Error, Payout, TransferError, Unauthorized},
  fundme_primitives::{Address, NativeAmount},
  parking_lot::Mutex,
};

mod common;

#[test]
fn owner_withdraws_everything_once() -> anyhow::Result<()> {
  let (ledger, _) = crowdfund();
  let payout = RecordingPayout::default();

  ledger.contribute(&owner(), native("0.1"))?;
  ledger.contribute(&owner(), native("0.05"))?;
  ledger.contribute(&account(1), native("1"))?;

  assert_eq!(ledger.withdraw(&owner(), &payout)?, native("1.15"));
  assert_eq!(ledger.held_balance(), NativeAmount::ZERO);
  assert_eq!(payout.total_to(&owner()), native("1.15").units());
  assert_eq!(payout.transfers.lock()[0].0, ledger.custody());
  assert_eq!(ledger.funding_cycle(), 1);

  // the historical record is kept
  assert_eq!(ledger.donors_count(), 2);
  assert_eq!(ledger.contribution_of(&owner()), native("0.15"));
  assert_eq!(ledger.contribution_of(&account(1)), native("1"));

  // immediate second withdrawal fails
  assert_eq!(
    ledger.withdraw(&owner(), &payout),
    Err(Error::NothingToWithdraw)
  );
  assert_eq!(payout.transfers.lock().len(), 1);
  Ok(())
}

#[test]
fn strangers_cannot_withdraw() -> anyhow::Result<()> {
  let (ledger, _) = crowdfund();
  let payout = RecordingPayout::default();
  let mallory = account(6);

  ledger.contribute(&account(1), native("1"))?;
  assert_eq!(
    ledger.withdraw(&mallory, &payout),
    Err(Error::Unauthorized(Unauthorized(mallory)))
  );
  assert_eq!(ledger.held_balance(), native("1"));
  assert!(payout.transfers.lock().is_empty());

  // a contributor is not an owner either
  assert!(matches!(
    ledger.withdraw(&account(1), &payout),
    Err(Error::Unauthorized(_))
  ));
  assert!(ledger.is_owner(&owner()));
  assert!(!ledger.is_owner(&account(1)));
  Ok(())
}

#[test]
fn rejected_transfer_keeps_funds() -> anyhow::Result<()> {
  let (ledger, _) = crowdfund();
  ledger.contribute(&account(1), native("2"))?;

  assert_eq!(
    ledger.withdraw(&owner(), &RecordingPayout::rejecting()),
    Err(Error::TransferFailed(TransferError::Rejected(
      "recipient refuses funds".into()
    )))
  );
  assert_eq!(ledger.held_balance(), native("2"));
  assert_eq!(ledger.funding_cycle(), 0);

  // and a later attempt can still succeed
  let payout = RecordingPayout::default();
  assert_eq!(ledger.withdraw(&owner(), &payout)?, native("2"));
  Ok(())
}

/// A recipient that tries to withdraw again while being paid.
struct ReentrantPayout<'a> {
  ledger: &'a Crowdfund,
  observed: Mutex<Vec<Result<NativeAmount, Error>>>,
  received: Mutex<u128>,
}

impl Payout for ReentrantPayout<'_> {
  fn transfer(
    &self,
    _from: &Address,
    _to: &Address,
    amount: NativeAmount,
  ) -> Result<(), TransferError> {
    // the held balance is already zero at this point
    assert_eq!(self.ledger.held_balance(), NativeAmount::ZERO);
    let nested = self.ledger.withdraw(&owner(), self);
    self.observed.lock().push(nested);
    *self.received.lock() += amount.units();
    Ok(())
  }
}

#[test]
fn reentrant_withdrawal_pays_once() -> anyhow::Result<()> {
  let (ledger, _) = crowdfund();
  ledger.contribute(&account(1), native("3"))?;

  let payout = ReentrantPayout {
    ledger: &ledger,
    observed: Mutex::new(vec![]),
    received: Mutex::new(0),
  };

  assert_eq!(ledger.withdraw(&owner(), &payout)?, native("3"));
  assert_eq!(*payout.received.lock(), native("3").units());
  assert_eq!(*payout.observed.lock(), vec![Err(
    Error::WithdrawalInProgress
  )]);
  assert_eq!(ledger.held_balance(), NativeAmount::ZERO);
  Ok(())
}

/// A recipient that contributes while the payout is in flight.
struct ContributingPayout<'a> {
  ledger: &'a Crowdfund,
  reject: bool,
}

impl Payout for ContributingPayout<'_> {
  fn transfer(
    &self,
    _from: &Address,
    _to: &Address,
    _amount: NativeAmount,
  ) -> Result<(), TransferError> {
    self
      .ledger
      .contribute(&account(9), native("0.5"))
      .expect("contributions are accepted during a payout");
    match self.reject {
      true => Err(TransferError::ZeroValue),
      false => Ok(()),
    }
  }
}

#[test]
fn contributions_during_payout_are_kept() -> anyhow::Result<()> {
  let (ledger, _) = crowdfund();
  ledger.contribute(&account(1), native("1"))?;

  let payout = ContributingPayout {
    ledger: &ledger,
    reject: false,
  };
  assert_eq!(ledger.withdraw(&owner(), &payout)?, native("1"));
  assert_eq!(ledger.held_balance(), native("0.5"));

  let payout = ContributingPayout {
    ledger: &ledger,
    reject: true,
  };
  assert!(ledger.withdraw(&owner(), &payout).is_err());
  // the restored half plus the new half
  assert_eq!(ledger.held_balance(), native("1"));
  assert_eq!(ledger.contribution_of(&account(9)), native("1"));
  Ok(())
}
