pub mod abi;
pub mod contracts;

pub use abi::methods;
pub use contracts::{AddressesProvider, Erc20, InterestRateMode, LendingPool, PriceFeed, WrappedNative};
