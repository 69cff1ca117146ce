use std::fmt::{self, Display, Formatter};

use alloy_primitives::Address;
use serde::Serialize;

/// 某个网络上的 ERC20 代币
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRef {
    pub symbol: &'static str,
    pub address: Address,
    pub network: &'static str,
}

impl TokenRef {
    pub fn new(symbol: &'static str, address: Address, network: &'static str) -> Self {
        Self {
            symbol,
            address,
            network,
        }
    }
}

impl Display for TokenRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}({})", self.symbol, self.network, self.address)
    }
}
