use {
  once_cell::sync::OnceCell,
  rmp_serde::{from_slice, to_vec},
  serde::{de::DeserializeOwned, Serialize},
  std::{collections::HashMap, path::Path},
  thiserror::Error,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] sled::Error),

  #[error("failed to encode {0}: {1}")]
  Encode(&'static str, rmp_serde::encode::Error),

  #[error("corrupt {0} record: {1}")]
  Decode(&'static str, rmp_serde::decode::Error),
}

/// Key-value storage for devnode state.
pub trait Storage {
  fn get(&self, key: &'static str) -> Result<Option<Vec<u8>>, Error>;
  fn put(&mut self, key: &'static str, value: Vec<u8>) -> Result<(), Error>;
}

pub fn load<T: DeserializeOwned>(
  storage: &dyn Storage,
  key: &'static str,
) -> Result<Option<T>, Error> {
  match storage.get(key)? {
    Some(bytes) => from_slice(&bytes)
      .map(Some)
      .map_err(|e| Error::Decode(key, e)),
    None => Ok(None),
  }
}

pub fn save<T: Serialize>(
  storage: &mut dyn Storage,
  key: &'static str,
  value: &T,
) -> Result<(), Error> {
  storage.put(key, to_vec(value).map_err(|e| Error::Encode(key, e))?)
}

/// Ephemeral storage, everything is gone when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
  data: HashMap<&'static str, Vec<u8>>,
}

impl Storage for InMemoryStorage {
  fn get(&self, key: &'static str) -> Result<Option<Vec<u8>>, Error> {
    Ok(self.data.get(key).cloned())
  }

  fn put(&mut self, key: &'static str, value: Vec<u8>) -> Result<(), Error> {
    self.data.insert(key, value);
    Ok(())
  }
}

pub struct OnDiskStorage {
  tree: sled::Tree,
}

impl OnDiskStorage {
  pub fn new(path: &Path, name: &str) -> Result<Self, Error> {
    static DB: OnceCell<sled::Db> = OnceCell::new();
    Ok(Self {
      tree: DB.get_or_try_init(|| sled::open(path))?.open_tree(name)?,
    })
  }
}

impl Storage for OnDiskStorage {
  fn get(&self, key: &'static str) -> Result<Option<Vec<u8>>, Error> {
    Ok(self.tree.get(key)?.map(|bytes| bytes.to_vec()))
  }

  fn put(&mut self, key: &'static str, value: Vec<u8>) -> Result<(), Error> {
    self.tree.insert(key, value)?;
    self.tree.flush()?;
    Ok(())
  }
}
