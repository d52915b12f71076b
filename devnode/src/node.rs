use {
  crate::{
    accounts::DevAccounts,
    bank::Bank,
    storage::{self, load, save, Storage},
  },
  anyhow::Context,
  fundme_ledger::{Config, Crowdfund, LedgerState, PriceOracle},
  fundme_primitives::{Address, NativeAmount, ReferenceValue},
  std::collections::HashMap,
  tracing::info,
};

const LEDGER_KEY: &str = "ledger";
const BANK_KEY: &str = "bank";

/// A deployed ledger together with the environment around it: dev
/// accounts and the bank that moves native currency between them.
pub struct Node {
  ledger: Crowdfund,
  bank: Bank,
  accounts: DevAccounts,
}

impl Node {
  /// Loads the ledger from storage, or deploys a new one owned by the
  /// first dev account and prefunds all dev accounts.
  pub fn open(
    storage: &dyn Storage,
    oracle: PriceOracle,
    accounts: DevAccounts,
    config: Config,
    initial_balance: NativeAmount,
  ) -> anyhow::Result<Self> {
    let persisted: Option<LedgerState> = load(storage, LEDGER_KEY)?;
    let node = match persisted {
      Some(state) => {
        let balances: HashMap<Address, NativeAmount> =
          load(storage, BANK_KEY)?.unwrap_or_default();
        info!(
          "resuming ledger owned by {} with {} donors",
          state.owner(),
          state.donors_count()
        );
        Self {
          ledger: Crowdfund::restore(oracle, state),
          bank: Bank::from_snapshot(balances),
          accounts,
        }
      }
      None => {
        let owner = accounts.deployer()?;
        let bank = Bank::default();
        for address in accounts.iter() {
          bank.mint(address, initial_balance);
        }
        info!(
          "prefunded {} dev accounts with {initial_balance} each",
          accounts.len()
        );
        Self {
          ledger: Crowdfund::new(oracle, owner, config),
          bank,
          accounts,
        }
      }
    };
    Ok(node)
  }

  pub fn persist(&self, storage: &mut dyn Storage) -> Result<(), storage::Error> {
    save(storage, LEDGER_KEY, &self.ledger.snapshot())?;
    save(storage, BANK_KEY, &self.bank.snapshot())
  }

  pub fn ledger(&self) -> &Crowdfund {
    &self.ledger
  }

  pub fn account(&self, index: usize) -> anyhow::Result<Address> {
    Ok(self.accounts.get(index)?)
  }

  pub fn balance_of(&self, address: &Address) -> NativeAmount {
    self.bank.balance_of(address)
  }

  /// Contributes from a dev account.
  ///
  /// The amount is escrowed into the ledger's custody address before the
  /// ledger sees it, and returned to the contributor if the ledger
  /// rejects the contribution.
  pub fn fund(&self, index: usize, amount: NativeAmount) -> anyhow::Result<()> {
    let caller = self.account(index)?;
    let custody = self.ledger.custody();

    self
      .bank
      .transfer(&caller, &custody, amount)
      .with_context(|| format!("account {index} can't send {amount}"))?;

    if let Err(e) = self.ledger.contribute(&caller, amount) {
      self
        .bank
        .transfer(&custody, &caller, amount)
        .context("returning rejected contribution")?;
      return Err(e.into());
    }
    Ok(())
  }

  /// Moves native currency between two dev accounts, outside the ledger.
  pub fn send(
    &self,
    from: usize,
    to: usize,
    amount: NativeAmount,
  ) -> anyhow::Result<()> {
    let (sender, recipient) = (self.account(from)?, self.account(to)?);
    self
      .bank
      .transfer(&sender, &recipient, amount)
      .with_context(|| format!("account {from} can't send {amount}"))?;
    info!("sent {amount} from {sender} to {recipient}");
    Ok(())
  }

  pub fn withdraw(&self, index: usize) -> anyhow::Result<NativeAmount> {
    let caller = self.account(index)?;
    Ok(self.ledger.withdraw(&caller, &self.bank)?)
  }

  pub fn estimate(&self, amount: NativeAmount) -> anyhow::Result<ReferenceValue> {
    Ok(self.ledger.value_of(amount)?)
  }
}
