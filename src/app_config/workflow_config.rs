use std::time::Duration;

use alloy_primitives::Address;

use crate::app_config::env::{env_optional, env_or_default, env_parse};
use crate::error::{AppError, Result};
use crate::lending::ledger::RpcLedgerConfig;
use crate::lending::protocol::InterestRateMode;
use crate::lending::services::SafetyMargin;
use crate::lending::units::{self, NATIVE_DECIMALS};

pub const DEFAULT_NETWORK: &str = "hardhat";
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
/// 默认包装 0.01 ETH
pub const DEFAULT_AMOUNT_TO_WRAP: f64 = 0.01;

/// 工作流配置，构造编排器时传入
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    /// 网络名或链 ID，用于查地址簿
    pub network: String,
    pub rpc_url: String,
    pub safety_margin: f64,
    /// 每笔交易需要的确认数
    pub confirmations: u64,
    /// 包装并存入的原生币数量
    pub amount_to_wrap: f64,
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
    pub interest_rate_mode: InterestRateMode,
    /// 签名账户，不设置时取节点的第一个账户
    pub account: Option<Address>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        WorkflowConfig {
            network: DEFAULT_NETWORK.to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            safety_margin: SafetyMargin::DEFAULT,
            confirmations: 1,
            amount_to_wrap: DEFAULT_AMOUNT_TO_WRAP,
            confirmation_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(1000),
            interest_rate_mode: InterestRateMode::Stable,
            account: None,
        }
    }
}

impl WorkflowConfig {
    /// 从环境变量读取，缺省项取默认值
    pub fn from_env() -> Result<Self> {
        let defaults = WorkflowConfig::default();
        Ok(WorkflowConfig {
            network: env_or_default("NETWORK", DEFAULT_NETWORK),
            rpc_url: env_or_default("RPC_URL", DEFAULT_RPC_URL),
            safety_margin: env_parse("SAFETY_MARGIN", defaults.safety_margin)?,
            confirmations: env_parse("CONFIRMATIONS", defaults.confirmations)?,
            amount_to_wrap: env_parse("AMOUNT_TO_WRAP", defaults.amount_to_wrap)?,
            confirmation_timeout: Duration::from_secs(env_parse(
                "CONFIRMATION_TIMEOUT_SECS",
                defaults.confirmation_timeout.as_secs(),
            )?),
            poll_interval: Duration::from_millis(env_parse(
                "POLL_INTERVAL_MS",
                defaults.poll_interval.as_millis() as u64,
            )?),
            interest_rate_mode: env_parse("INTEREST_RATE_MODE", defaults.interest_rate_mode)?,
            account: env_optional("ACCOUNT")?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        SafetyMargin::new(self.safety_margin)?;
        if self.confirmations == 0 {
            return Err(AppError::InvalidConfig("确认数至少为 1".to_string()));
        }
        if self.confirmation_timeout.is_zero() {
            return Err(AppError::InvalidConfig("确认超时不能为 0".to_string()));
        }
        if self.poll_interval.is_zero() {
            return Err(AppError::InvalidConfig("轮询间隔不能为 0".to_string()));
        }
        units::to_base_units(self.amount_to_wrap, NATIVE_DECIMALS)?;
        Ok(())
    }

    pub fn rpc_ledger_config(&self) -> RpcLedgerConfig {
        RpcLedgerConfig {
            url: self.rpc_url.clone(),
            confirmation_timeout: self.confirmation_timeout,
            poll_interval: self.poll_interval,
        }
    }
}
