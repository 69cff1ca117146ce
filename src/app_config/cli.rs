use std::time::Duration;

use alloy_primitives::Address;
use clap::Parser;

use crate::app_config::workflow_config::WorkflowConfig;
use crate::lending::protocol::InterestRateMode;

/// 包装 ETH -> 存入 Aave -> 按可借额度借 DAI -> 还款
#[derive(Parser, Debug, Default)]
#[command(name = "rust_lending", version, about)]
pub struct Cli {
    /// 网络名或链 ID（mainnet / hardhat / localhost / kovan / 1 / 31337 / 42）
    #[arg(long)]
    pub network: Option<String>,

    /// 节点 JSON-RPC 地址
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// 安全系数 (0, 1]
    #[arg(long)]
    pub safety_margin: Option<f64>,

    /// 每笔交易等待的确认数
    #[arg(long)]
    pub confirmations: Option<u64>,

    /// 包装并存入的 ETH 数量
    #[arg(long)]
    pub amount: Option<f64>,

    #[arg(long)]
    pub confirmation_timeout_secs: Option<u64>,

    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// stable | variable
    #[arg(long)]
    pub rate_mode: Option<InterestRateMode>,

    /// 签名账户
    #[arg(long)]
    pub account: Option<Address>,
}

impl Cli {
    /// 命令行参数覆盖环境变量配置
    pub fn apply(self, mut config: WorkflowConfig) -> WorkflowConfig {
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(rpc_url) = self.rpc_url {
            config.rpc_url = rpc_url;
        }
        if let Some(margin) = self.safety_margin {
            config.safety_margin = margin;
        }
        if let Some(confirmations) = self.confirmations {
            config.confirmations = confirmations;
        }
        if let Some(amount) = self.amount {
            config.amount_to_wrap = amount;
        }
        if let Some(secs) = self.confirmation_timeout_secs {
            config.confirmation_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(mode) = self.rate_mode {
            config.interest_rate_mode = mode;
        }
        if self.account.is_some() {
            config.account = self.account;
        }
        config
    }
}
