use {
  fundme_primitives::Address,
  serde::{Deserialize, Serialize},
  thiserror::Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is not the owner")]
pub struct Unauthorized(pub Address);

/// The single identity allowed to withdraw funds.
///
/// Set once when the ledger is created, never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner(Address);

impl Owner {
  pub fn new(identity: Address) -> Self {
    Self(identity)
  }

  pub fn identity(&self) -> &Address {
    &self.0
  }

  pub fn is_owner(&self, identity: &Address) -> bool {
    self.0 == *identity
  }

  pub fn ensure(&self, caller: &Address) -> Result<(), Unauthorized> {
    match self.is_owner(caller) {
      true => Ok(()),
      false => Err(Unauthorized(*caller)),
    }
  }
}
