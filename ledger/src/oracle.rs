use {
  fundme_primitives::{NativeAmount, ReferenceValue, NATIVE_DECIMALS},
  parking_lot::RwLock,
  primitive_types::U256,
  std::sync::Arc,
  thiserror::Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("price feed unavailable: {0}")]
  Unavailable(String),

  #[error("price feed returned a non-positive answer: {0}")]
  NonPositiveAnswer(i128),

  #[error("reference value computation overflowed")]
  Overflow,
}

/// The most recent answer published by a price feed.
///
/// `answer` is the price of one whole native unit in the reference
/// currency, scaled by `10^decimals`. So with `decimals = 8`, an answer
/// of `2000_00000000` means one native unit is worth 2000 reference units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
  pub answer: i128,
  pub decimals: u8,
}

/// External source of the native-to-reference exchange rate.
///
/// Implementations are read-only from the ledger's point of view, and
/// every call is expected to return the latest published value. There is
/// no caching or retrying in the adapter, a failed read fails the
/// operation that requested it.
pub trait PriceFeed: Send + Sync {
  fn latest_rate(&self) -> Result<Rate, Error>;
}

/// A price feed that publishes whatever it is told to.
///
/// Used by local deployments and tests in place of a live aggregator.
/// The answer can be moved at runtime, and the feed can be taken
/// offline to simulate an unreachable or uninitialized aggregator.
#[derive(Debug)]
pub struct FixedPriceFeed {
  decimals: u8,
  answer: RwLock<Option<i128>>,
}

impl FixedPriceFeed {
  pub fn new(decimals: u8, answer: i128) -> Self {
    Self {
      decimals,
      answer: RwLock::new(Some(answer)),
    }
  }

  /// Publishes a new answer.
  pub fn update(&self, answer: i128) {
    *self.answer.write() = Some(answer);
  }

  /// Makes all subsequent reads fail until the next `update`.
  pub fn take_offline(&self) {
    *self.answer.write() = None;
  }
}

impl Default for FixedPriceFeed {
  /// 2000 reference units per native unit at 8 decimals.
  fn default() -> Self {
    Self::new(8, 2000_00000000)
  }
}

impl PriceFeed for FixedPriceFeed {
  fn latest_rate(&self) -> Result<Rate, Error> {
    match *self.answer.read() {
      Some(answer) => Ok(Rate {
        answer,
        decimals: self.decimals,
      }),
      None => Err(Error::Unavailable("no answer published".into())),
    }
  }
}

/// Converts native amounts into the reference currency using an
/// injected price feed.
#[derive(Clone)]
pub struct PriceOracle {
  feed: Arc<dyn PriceFeed>,
}

impl PriceOracle {
  pub fn new(feed: Arc<dyn PriceFeed>) -> Self {
    Self { feed }
  }

  /// Reads the current rate from the feed.
  ///
  /// Answers that are zero or negative are rejected, they can't be
  /// used to value a contribution.
  pub fn latest_rate(&self) -> Result<Rate, Error> {
    let rate = self.feed.latest_rate()?;
    if rate.answer <= 0 {
      return Err(Error::NonPositiveAnswer(rate.answer));
    }
    Ok(rate)
  }

  /// Values a native amount in the reference currency, expressed in
  /// units with `reference_decimals` fractional digits.
  pub fn value_of(
    &self,
    amount: NativeAmount,
    reference_decimals: u8,
  ) -> Result<ReferenceValue, Error> {
    scale(amount, self.latest_rate()?, reference_decimals)
  }
}

impl std::fmt::Debug for PriceOracle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PriceOracle").finish_non_exhaustive()
  }
}

/// value = amount * answer * 10^reference_decimals / 10^(18 + rate.decimals)
///
/// All multiplications happen before the single truncating division,
/// in 256 bits, so the product of two u128 factors can't overflow. Only
/// a final value that doesn't fit a `ReferenceValue` does.
fn scale(
  amount: NativeAmount,
  rate: Rate,
  reference_decimals: u8,
) -> Result<ReferenceValue, Error> {
  let answer = u128::try_from(rate.answer)
    .map_err(|_| Error::NonPositiveAnswer(rate.answer))?;

  let numerator_exp = reference_decimals as u32;
  let denominator_exp = NATIVE_DECIMALS as u32 + rate.decimals as u32;
  let (multiplier, divisor) = match numerator_exp >= denominator_exp {
    true => (pow10(numerator_exp - denominator_exp)?, U256::one()),
    false => (U256::one(), pow10(denominator_exp - numerator_exp)?),
  };

  let value = U256::from(amount.units())
    .checked_mul(U256::from(answer))
    .and_then(|v| v.checked_mul(multiplier))
    .ok_or(Error::Overflow)?
    / divisor;

  match value.bits() > 128 {
    true => Err(Error::Overflow),
    false => Ok(ReferenceValue::new(value.low_u128())),
  }
}

fn pow10(exp: u32) -> Result<U256, Error> {
  U256::from(10u8)
    .checked_pow(U256::from(exp))
    .ok_or(Error::Overflow)
}
