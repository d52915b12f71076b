use {
  crate::storage::{self, InMemoryStorage, OnDiskStorage, Storage},
  clap::{Parser, Subcommand},
  fundme_ledger::Config,
  fundme_primitives::{AmountError, NativeAmount, ReferenceValue},
  std::path::PathBuf,
};

/// FundMe Local Devnode
///
/// Hosts a single crowdfunding ledger with a set of prefunded dev
/// accounts and a mock price feed, for local use, CI and scripted
/// scenarios. Account 0 deploys the ledger and owns it.
#[derive(Debug, Parser)]
pub struct SystemSettings {
  /// Mnemonic the dev accounts are derived from
  #[clap(long,
    default_value = "test test test test test test test test test test test junk",
    value_name = "WORDS")]
  mnemonic: String,

  /// Number of prefunded dev accounts
  #[clap(long, default_value = "10", value_name = "COUNT")]
  accounts: usize,

  /// Native balance each dev account starts with
  #[clap(long, default_value = "10000", value_name = "AMOUNT")]
  initial_balance: NativeAmount,

  /// Directory for persistent state, state is kept in memory if omitted
  #[clap(long, short, value_name = "PATH")]
  data_dir: Option<PathBuf>,

  /// Answer published by the mock price feed
  #[clap(long, default_value = "200000000000", value_name = "ANSWER")]
  mock_price: i128,

  /// Number of decimals of the mock price feed answer
  #[clap(long, default_value = "8", value_name = "DECIMALS")]
  mock_decimals: u8,

  /// Minimum contribution in reference currency units, e.g. "50" or "49.99"
  #[clap(long, default_value = "50", value_name = "VALUE")]
  minimum: String,

  /// Decimals of reference currency values
  #[clap(long, default_value = "8", value_name = "DECIMALS")]
  reference_decimals: u8,

  #[clap(subcommand)]
  command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
  /// Deploys the ledger, if it is not deployed yet
  Deploy,

  /// Contributes native currency from a dev account
  Fund {
    /// Index of the contributing dev account
    #[clap(long, short, default_value = "1")]
    account: usize,

    /// Amount of native currency, e.g. "0.1"
    #[clap(long)]
    amount: NativeAmount,
  },

  /// Sends native currency from one dev account to another
  Send {
    /// Index of the sending dev account
    #[clap(long)]
    from: usize,

    /// Index of the receiving dev account
    #[clap(long)]
    to: usize,

    /// Amount of native currency, e.g. "1.5"
    #[clap(long)]
    amount: NativeAmount,
  },

  /// Withdraws the entire held balance to the owner
  Withdraw {
    /// Index of the dev account requesting the withdrawal
    #[clap(long, short, default_value = "0")]
    account: usize,
  },

  /// Values an amount in the reference currency without contributing
  Estimate {
    #[clap(long)]
    amount: NativeAmount,
  },

  /// Lists contributors and their totals
  Donors,

  /// Shows the native balance of a dev account, or of the ledger
  Balance {
    #[clap(long, short)]
    account: Option<usize>,
  },

  /// Runs the full fund and withdraw flow against a fresh ledger
  Demo {
    /// Number of concurrent contributors in the last phase
    #[clap(long, default_value = "8")]
    contributors: usize,
  },
}

impl SystemSettings {
  pub fn command(&self) -> &Command {
    &self.command
  }

  pub fn mnemonic(&self) -> &str {
    &self.mnemonic
  }

  pub fn accounts(&self) -> usize {
    self.accounts
  }

  pub fn initial_balance(&self) -> NativeAmount {
    self.initial_balance
  }

  pub fn mock_price(&self) -> i128 {
    self.mock_price
  }

  pub fn mock_decimals(&self) -> u8 {
    self.mock_decimals
  }

  pub fn ledger_config(&self) -> Result<Config, AmountError> {
    Ok(Config {
      minimum: ReferenceValue::parse(&self.minimum, self.reference_decimals)?,
      reference_decimals: self.reference_decimals,
    })
  }

  /// Persistent on-disk storage when a data directory is given,
  /// otherwise an ephemeral in-memory one.
  pub fn storage(&self) -> Result<Box<dyn Storage>, storage::Error> {
    Ok(match &self.data_dir {
      Some(path) => Box::new(OnDiskStorage::new(path, "fundme")?),
      None => Box::<InMemoryStorage>::default(),
    })
  }
}
