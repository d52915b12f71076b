use {
  curve25519_dalek::edwards::CompressedEdwardsY,
  ed25519_dalek::PublicKey,
  serde::{Deserialize, Serialize},
  sha2::{Digest, Sha256},
  std::{
    fmt::{Debug, Display},
    str::FromStr,
  },
};

/// Identity of a participant in the ledger.
///
/// Contributors and the owner are externally owned identities that
/// have a corresponding private key on the ed25519 curve. The ledger
/// itself holds funds under a derived address that is not on the curve,
/// so no signer can ever move funds out of it except the ledger.
#[derive(
  Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Address([u8; 32]);

impl Address {
  /// Given a list of seeds this method will generate a new
  /// derived address that is not on the Ed25519 curve
  /// (no private key exists for the resulting address).
  ///
  /// The same set of seeds will always return the same
  /// derived address.
  pub fn derive(&self, seeds: &[&[u8]]) -> Self {
    let mut bump: u64 = 0;
    loop {
      let mut hasher = Sha256::new();
      hasher.update(&self.0);
      for seed in seeds.iter() {
        hasher.update(seed);
      }
      hasher.update(&bump.to_le_bytes());

      let mut bytes = [0u8; 32];
      bytes.copy_from_slice(&hasher.finalize());
      let key = Address(bytes);
      if !key.has_private_key() {
        return key;
      }
      bump += 1;
    }
  }

  /// Checks if the given address lies on the Ed25519 elliptic curve.
  ///
  /// When true, then there exists a private key that makes up a valid
  /// Ed25519 keypair together with this address.
  pub fn has_private_key(&self) -> bool {
    CompressedEdwardsY::from_slice(&self.0)
      .decompress()
      .is_some()
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", bs58::encode(self.0).into_string())
  }
}

impl Debug for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "address({})", bs58::encode(self.0).into_string())
  }
}

impl From<[u8; 32]> for Address {
  fn from(bytes: [u8; 32]) -> Self {
    Self(bytes)
  }
}

impl From<PublicKey> for Address {
  fn from(p: PublicKey) -> Self {
    Self(*p.as_bytes())
  }
}

impl FromStr for Address {
  type Err = bs58::decode::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut bytes = [0u8; 32];
    let len = bs58::decode(s).into(&mut bytes)?;
    if len != bytes.len() {
      return Err(bs58::decode::Error::BufferTooSmall);
    }
    Ok(Self(bytes))
  }
}
