use {
  crate::{
    accounts::DevAccounts,
    node::Node,
    settings::{Command, SystemSettings},
    storage::InMemoryStorage,
  },
  clap::Parser,
  fundme_ledger::{FixedPriceFeed, PriceOracle},
  std::sync::Arc,
  tracing::{info, subscriber::set_global_default},
  tracing_subscriber::{EnvFilter, FmtSubscriber},
};

mod accounts;
mod bank;
mod demo;
mod node;
mod settings;
mod storage;

/// `RUST_LOG` when set, info and above otherwise.
fn log_filter() -> EnvFilter {
  EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // configure logging
  set_global_default(
    FmtSubscriber::builder()
      .with_env_filter(log_filter())
      .finish(),
  )?;

  // gather CLI parameters
  let settings = SystemSettings::parse();
  info!("startup settings: {settings:#?}");

  let accounts = DevAccounts::derive(settings.mnemonic(), settings.accounts())?;
  let oracle = PriceOracle::new(Arc::new(FixedPriceFeed::new(
    settings.mock_decimals(),
    settings.mock_price(),
  )));
  let config = settings.ledger_config()?;

  // the demo always runs against a fresh ledger
  if let Command::Demo { contributors } = settings.command() {
    let node = Node::open(
      &InMemoryStorage::default(),
      oracle,
      accounts,
      config,
      settings.initial_balance(),
    )?;
    demo::run(Arc::new(node), *contributors).await?;
    println!("demo completed");
    return Ok(());
  }

  // either an in-memory ephemeral storage if no data directory
  // is provided by cli or persistent on-disk store otherwise.
  let mut storage = settings.storage()?;
  let node = Node::open(
    &*storage,
    oracle,
    accounts,
    config,
    settings.initial_balance(),
  )?;
  let ledger = node.ledger();
  let decimals = ledger.reference_decimals();

  match settings.command() {
    Command::Deploy => {
      println!("ledger owner:   {}", ledger.owner());
      println!("ledger custody: {}", ledger.custody());
      println!(
        "minimum value:  {}",
        ledger.minimum_reference_value().format(decimals)
      );
    }
    Command::Fund { account, amount } => {
      node.fund(*account, *amount)?;
      let address = node.account(*account)?;
      println!(
        "{address} contributed {amount}, total {}",
        ledger.contribution_of(&address)
      );
    }
    Command::Send { from, to, amount } => {
      node.send(*from, *to, *amount)?;
      println!("sent {amount} from account {from} to account {to}");
    }
    Command::Withdraw { account } => {
      let amount = node.withdraw(*account)?;
      println!("withdrew {amount} to {}", ledger.owner());
    }
    Command::Estimate { amount } => {
      let value = node.estimate(*amount)?;
      println!(
        "{amount} is worth {} (minimum {})",
        value.format(decimals),
        ledger.minimum_reference_value().format(decimals)
      );
    }
    Command::Donors => {
      for (address, total) in ledger.donors() {
        println!("{address}  {total}");
      }
      println!(
        "{} donors, {} held, {} raised over {} withdrawals",
        ledger.donors_count(),
        ledger.held_balance(),
        ledger.total_raised(),
        ledger.funding_cycle()
      );
    }
    Command::Balance { account } => {
      let address = match account {
        Some(index) => node.account(*index)?,
        None => ledger.custody(),
      };
      println!("{address}  {}", node.balance_of(&address));
    }
    Command::Demo { .. } => unreachable!("handled above"),
  }

  node.persist(&mut *storage)?;
  Ok(())
}
