use {
  crate::node::Node,
  anyhow::ensure,
  fundme_ledger::Error,
  fundme_primitives::NativeAmount,
  std::sync::Arc,
  tokio::task::JoinSet,
  tracing::info,
};

/// Walks a freshly deployed ledger through the full lifecycle:
/// rejected and accepted contributions, a withdrawal by the owner, a
/// failing second withdrawal, and a round of concurrent contributors.
pub async fn run(node: Arc<Node>, contributors: usize) -> anyhow::Result<()> {
  let ledger = node.ledger();
  let owner = node.account(0)?;
  ensure!(ledger.owner() == owner, "owner should be the deployer");
  info!("owner verified: {owner}");

  // too small to pass the minimum
  let small: NativeAmount = "0.01".parse()?;
  match node.fund(1, small) {
    Err(e) => info!("fund of {small} failed as expected: {e}"),
    Ok(()) => anyhow::bail!("fund of {small} should have been rejected"),
  }
  ensure!(ledger.donors_count() == 0, "rejected fund must not add a donor");

  let first: NativeAmount = "0.1".parse()?;
  let second: NativeAmount = "0.05".parse()?;
  node.fund(0, first)?;
  ensure!(ledger.contribution_of(&owner) == first, "donation not recorded");
  ensure!(ledger.donors_count() == 1, "should have 1 donor");

  node.fund(0, second)?;
  let total = ledger.contribution_of(&owner);
  let expected: NativeAmount = "0.15".parse()?;
  ensure!(total == expected, "total should be {first} + {second}");
  ensure!(ledger.donors_count() == 1, "should still have 1 donor");
  info!("donations of {owner} total {total}");

  let custody = ledger.custody();
  ensure!(
    node.balance_of(&custody) == total,
    "ledger custody should hold exactly the donations"
  );

  let before = node.balance_of(&owner);
  let withdrawn = node.withdraw(0)?;
  let after = node.balance_of(&owner);
  ensure!(node.balance_of(&custody).is_zero(), "custody should be empty");
  ensure!(after > before, "owner balance should increase");
  info!("owner withdrew {withdrawn}, balance now {after}");

  match node.withdraw(0) {
    Err(e) => match e.downcast_ref::<Error>() {
      Some(Error::NothingToWithdraw) => {
        info!("second withdrawal correctly rejected")
      }
      _ => return Err(e),
    },
    Ok(amount) => anyhow::bail!("second withdrawal paid out {amount}"),
  }

  // concurrent contributors, each from its own dev account
  let mut tasks = JoinSet::new();
  let amount: NativeAmount = "1".parse()?;
  for index in 1..=contributors {
    let node = Arc::clone(&node);
    tasks.spawn_blocking(move || node.fund(index, amount));
  }
  while let Some(result) = tasks.join_next().await {
    result??;
  }

  ensure!(
    ledger.donors_count() == contributors + 1,
    "every contributor should be listed once"
  );
  ensure!(
    node.balance_of(&custody) == ledger.held_balance(),
    "custody and ledger balance diverged"
  );
  info!(
    "{} donors, {} held for the next withdrawal",
    ledger.donors_count(),
    ledger.held_balance()
  );

  Ok(())
}
