mod address;
mod amount;

pub use {
  address::Address,
  amount::{Error as AmountError, NativeAmount, ReferenceValue, NATIVE_DECIMALS},
};
