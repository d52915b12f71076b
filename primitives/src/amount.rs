use {
  serde::{Deserialize, Serialize},
  std::{
    fmt::{Debug, Display},
    str::FromStr,
  },
  thiserror::Error,
};

/// Number of fractional digits implied by the integer native amount.
pub const NATIVE_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("empty amount")]
  Empty,

  #[error("invalid character {0:?} in amount")]
  InvalidCharacter(char),

  #[error("amount has more than {0} fractional digits")]
  TooPrecise(u8),

  #[error("amount does not fit in 128 bits")]
  Overflow,
}

/// Amount of the native transfer currency, in its smallest unit.
///
/// The native currency has 18 implied fractional digits, so
/// `NativeAmount(10^18)` is one whole native unit. String conversions
/// go through the decimal representation ("0.15", "10").
#[derive(
  Copy,
  Clone,
  Default,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
)]
pub struct NativeAmount(u128);

impl NativeAmount {
  pub const ZERO: NativeAmount = NativeAmount(0);

  pub const fn new(units: u128) -> Self {
    Self(units)
  }

  pub const fn units(&self) -> u128 {
    self.0
  }

  pub const fn is_zero(&self) -> bool {
    self.0 == 0
  }

  pub fn checked_add(self, other: NativeAmount) -> Option<NativeAmount> {
    self.0.checked_add(other.0).map(NativeAmount)
  }

  pub fn checked_sub(self, other: NativeAmount) -> Option<NativeAmount> {
    self.0.checked_sub(other.0).map(NativeAmount)
  }
}

impl From<u128> for NativeAmount {
  fn from(units: u128) -> Self {
    Self(units)
  }
}

impl FromStr for NativeAmount {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    parse_fixed(s, NATIVE_DECIMALS).map(NativeAmount)
  }
}

impl Display for NativeAmount {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", format_fixed(self.0, NATIVE_DECIMALS, true))
  }
}

impl Debug for NativeAmount {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "native({})", format_fixed(self.0, NATIVE_DECIMALS, true))
  }
}

/// A value expressed in the reference currency's smallest unit.
///
/// Unlike native amounts, the precision of reference values is not fixed
/// by the type. It is chosen by the ledger configuration, so formatting
/// takes the number of decimals explicitly.
#[derive(
  Copy,
  Clone,
  Debug,
  Default,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
)]
pub struct ReferenceValue(u128);

impl ReferenceValue {
  pub const fn new(units: u128) -> Self {
    Self(units)
  }

  /// Builds a value out of whole reference units, e.g. `50` dollars
  /// at 8 decimals is `50_00000000`.
  pub fn from_whole(whole: u128, decimals: u8) -> Option<Self> {
    10u128
      .checked_pow(decimals as u32)
      .and_then(|scale| whole.checked_mul(scale))
      .map(ReferenceValue)
  }

  pub fn parse(s: &str, decimals: u8) -> Result<Self, Error> {
    parse_fixed(s, decimals).map(ReferenceValue)
  }

  pub const fn units(&self) -> u128 {
    self.0
  }

  /// Renders the value with all of its fractional digits,
  /// e.g. `200.00000000` at 8 decimals.
  pub fn format(&self, decimals: u8) -> String {
    format_fixed(self.0, decimals, false)
  }
}

fn parse_fixed(s: &str, decimals: u8) -> Result<u128, Error> {
  let s = s.trim();
  let (whole, fraction) = match s.split_once('.') {
    Some((whole, fraction)) => (whole, fraction),
    None => (s, ""),
  };

  if whole.is_empty() && fraction.is_empty() {
    return Err(Error::Empty);
  }

  if fraction.len() > decimals as usize {
    return Err(Error::TooPrecise(decimals));
  }

  let mut units: u128 = 0;
  let digits = whole
    .chars()
    .chain(fraction.chars())
    .chain(std::iter::repeat('0').take(decimals as usize - fraction.len()));

  for c in digits {
    let digit = c.to_digit(10).ok_or(Error::InvalidCharacter(c))?;
    units = units
      .checked_mul(10)
      .and_then(|u| u.checked_add(digit as u128))
      .ok_or(Error::Overflow)?;
  }

  Ok(units)
}

fn format_fixed(units: u128, decimals: u8, trim: bool) -> String {
  if decimals == 0 {
    return units.to_string();
  }

  let digits = format!("{units:0>width$}", width = decimals as usize + 1);
  let (whole, fraction) = digits.split_at(digits.len() - decimals as usize);
  let fraction = match trim {
    true => fraction.trim_end_matches('0'),
    false => fraction,
  };

  match fraction.is_empty() {
    true => whole.to_string(),
    false => format!("{whole}.{fraction}"),
  }
}

#[cfg(test)]
mod tests {
  use super::{Error, NativeAmount, ReferenceValue};

  const ONE: u128 = 1_000_000_000_000_000_000;

  #[test]
  fn parse_native_amounts() -> anyhow::Result<()> {
    assert_eq!("10".parse::<NativeAmount>()?.units(), 10 * ONE);
    assert_eq!("0.1".parse::<NativeAmount>()?.units(), ONE / 10);
    assert_eq!("0.05".parse::<NativeAmount>()?.units(), ONE / 20);
    assert_eq!(".5".parse::<NativeAmount>()?.units(), ONE / 2);
    assert_eq!("0.000000000000000001".parse::<NativeAmount>()?.units(), 1);
    Ok(())
  }

  #[test]
  fn reject_malformed_amounts() {
    assert_eq!("".parse::<NativeAmount>(), Err(Error::Empty));
    assert_eq!(".".parse::<NativeAmount>(), Err(Error::Empty));
    assert_eq!(
      "1,5".parse::<NativeAmount>(),
      Err(Error::InvalidCharacter(','))
    );
    assert_eq!("-1".parse::<NativeAmount>(), Err(Error::InvalidCharacter('-')));
    assert_eq!(
      "0.0000000000000000001".parse::<NativeAmount>(),
      Err(Error::TooPrecise(18))
    );
    assert_eq!(
      "999999999999999999999999".parse::<NativeAmount>(),
      Err(Error::Overflow)
    );
  }

  #[test]
  fn display_is_shortest_exact_decimal() {
    assert_eq!(NativeAmount::new(ONE / 10 + ONE / 20).to_string(), "0.15");
    assert_eq!(NativeAmount::new(10 * ONE).to_string(), "10");
    assert_eq!(NativeAmount::new(1).to_string(), "0.000000000000000001");
    assert_eq!(NativeAmount::ZERO.to_string(), "0");
  }

  #[test]
  fn reference_values() -> anyhow::Result<()> {
    let minimum = ReferenceValue::from_whole(50, 8).expect("fits");
    assert_eq!(minimum.units(), 50_00000000);
    assert_eq!(minimum.format(8), "50.00000000");
    assert_eq!(ReferenceValue::new(20_00000000).format(2), "20000000.00");
    assert_eq!(ReferenceValue::parse("200.5", 8)?.units(), 200_50000000);
    assert!(ReferenceValue::from_whole(u128::MAX, 8).is_none());
    Ok(())
  }
}
