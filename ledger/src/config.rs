use {
  fundme_primitives::ReferenceValue,
  serde::{Deserialize, Serialize},
};

/// Parameters fixed at ledger construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  /// Smallest accepted contribution, valued in the reference currency
  /// at `reference_decimals` precision. Contributions valued strictly
  /// below this are rejected.
  pub minimum: ReferenceValue,

  /// Number of fractional digits of reference values. Oracle answers
  /// are rescaled to this precision regardless of the feed's own
  /// decimals.
  pub reference_decimals: u8,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      minimum: ReferenceValue::new(50_00000000), // 50.00 at 8 decimals
      reference_decimals: 8,
    }
  }
}
