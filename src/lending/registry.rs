//! 各网络的合约地址簿
//!
//! 按网络名或链 ID 查询，未收录的网络返回 `UnknownNetwork`。

use std::collections::HashMap;

use alloy_primitives::{address, Address};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::lending::model::TokenRef;

/// 一个网络上工作流需要的全部地址
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkAddresses {
    pub name: &'static str,
    pub chain_id: u64,
    pub native_symbol: &'static str,
    pub wrapped_native: TokenRef,
    pub lending_pool_addresses_provider: Address,
    pub borrow_token: TokenRef,
    /// borrow_token / 原生币 价格源
    pub price_feed: Address,
}

impl NetworkAddresses {
    fn mainnet_fork(name: &'static str, chain_id: u64) -> Self {
        NetworkAddresses {
            name,
            chain_id,
            native_symbol: "ETH",
            wrapped_native: TokenRef::new(
                "WETH",
                address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
                name,
            ),
            lending_pool_addresses_provider: address!("B53C1a33016B2DC2fF3653530bfF1848a515c8c5"),
            borrow_token: TokenRef::new(
                "DAI",
                address!("6B175474E89094C44Da98b954EedeAC495271d0F"),
                name,
            ),
            price_feed: address!("773616E4d11A78F511299002da57A0a94577F1f4"),
        }
    }

    fn kovan() -> Self {
        NetworkAddresses {
            name: "kovan",
            chain_id: 42,
            native_symbol: "ETH",
            wrapped_native: TokenRef::new(
                "WETH",
                address!("d0a1e359811322d97991e03f863a0c30c2cf029c"),
                "kovan",
            ),
            lending_pool_addresses_provider: address!("88757f2f99175387aB4C6a4b3067c77A695b0349"),
            borrow_token: TokenRef::new(
                "DAI",
                address!("Ff795577d9AC8bD7D90Ee22b6C1703490b6512FD"),
                "kovan",
            ),
            price_feed: address!("22B58f1EbEDfCA50feF632bD73368b2FdA96D541"),
        }
    }
}

// hardhat / localhost 默认 fork 主网，地址与主网一致
static NETWORKS: Lazy<Vec<NetworkAddresses>> = Lazy::new(|| {
    vec![
        NetworkAddresses::mainnet_fork("mainnet", 1),
        NetworkAddresses::mainnet_fork("hardhat", 31337),
        NetworkAddresses::mainnet_fork("localhost", 31337),
        NetworkAddresses::kovan(),
    ]
});

static BY_NAME: Lazy<HashMap<&'static str, &'static NetworkAddresses>> =
    Lazy::new(|| NETWORKS.iter().map(|n| (n.name, n)).collect());

/// 按网络名（大小写不敏感）或十进制链 ID 查询
///
/// 多个网络共享同一链 ID 时取最先收录的那个。
pub fn lookup(network: &str) -> Result<&'static NetworkAddresses> {
    let key = network.trim().to_ascii_lowercase();
    if let Some(entry) = BY_NAME.get(key.as_str()) {
        return Ok(*entry);
    }
    if let Ok(chain_id) = key.parse::<u64>() {
        if let Some(entry) = NETWORKS.iter().find(|n| n.chain_id == chain_id) {
            return Ok(entry);
        }
    }
    Err(AppError::UnknownNetwork(network.to_string()))
}
