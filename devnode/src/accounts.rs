use {
  ed25519_dalek::{PublicKey, SecretKey},
  fundme_primitives::Address,
  sha2::{Digest, Sha256},
  thiserror::Error,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("no dev account at index {0}, there are {1}")]
  NoSuchAccount(usize, usize),

  #[error("invalid key material: {0}")]
  Key(#[from] ed25519_dalek::SignatureError),
}

/// Prefunded identities of the local devnode.
///
/// Keys are derived deterministically from a mnemonic, so every run with
/// the same mnemonic sees the same addresses. Account 0 is the deployer
/// and becomes the ledger owner.
#[derive(Debug, Clone)]
pub struct DevAccounts {
  addresses: Vec<Address>,
}

impl DevAccounts {
  pub fn derive(mnemonic: &str, count: usize) -> Result<Self, Error> {
    let addresses = (0..count as u64)
      .map(|index| -> Result<Address, Error> {
        let mut hasher = Sha256::new();
        hasher.update(mnemonic.as_bytes());
        hasher.update(&index.to_le_bytes());
        let secret = SecretKey::from_bytes(&hasher.finalize())?;
        Ok(PublicKey::from(&secret).into())
      })
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self { addresses })
  }

  pub fn deployer(&self) -> Result<Address, Error> {
    self.get(0)
  }

  pub fn get(&self, index: usize) -> Result<Address, Error> {
    self
      .addresses
      .get(index)
      .copied()
      .ok_or(Error::NoSuchAccount(index, self.addresses.len()))
  }

  pub fn iter(&self) -> impl Iterator<Item = &Address> {
    self.addresses.iter()
  }

  pub fn len(&self) -> usize {
    self.addresses.len()
  }
}
