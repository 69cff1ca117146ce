use std::fmt;

use thiserror::Error;

use crate::lending::workflow::step::WorkflowStep;

pub type Result<T> = std::result::Result<T, AppError>;

/// 应用错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// 地址簿中没有该网络
    #[error("未知网络: {0}")]
    UnknownNetwork(String),

    /// 数量为负数或非有限值，或超出定点表示范围
    #[error("非法数量: {quantity} ({reason})")]
    InvalidQuantity { quantity: String, reason: String },

    /// 价格为零、负数或非有限值
    #[error("非法报价: {0}")]
    InvalidPriceQuote(String),

    #[error("交易回滚: {method} tx={tx_hash} {reason}")]
    TransactionReverted {
        method: String,
        tx_hash: String,
        reason: String,
    },

    #[error("等待确认超时: {method} tx={tx_hash} 需要 {confirmations} 个确认, 已等待 {waited_secs}s")]
    ConfirmationTimeout {
        method: String,
        tx_hash: String,
        confirmations: u64,
        waited_secs: u64,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    InvalidConfig(String),

    #[error("节点RPC错误: {method} code={code} {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    /// 网络错误
    #[error("网络错误: {0}")]
    Transport(String),

    #[error("ABI解码错误: {method} {reason}")]
    Abi { method: String, reason: String },

    #[error("节点没有可用的签名账户")]
    NoAccount,

    #[error("后置检查失败: {0}")]
    PostCondition(String),
}

impl AppError {
    pub fn invalid_quantity(quantity: impl fmt::Display, reason: impl Into<String>) -> Self {
        AppError::InvalidQuantity {
            quantity: quantity.to_string(),
            reason: reason.into(),
        }
    }

    /// 错误种类名，用于日志和退出信息
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::UnknownNetwork(_) => "UnknownNetwork",
            AppError::InvalidQuantity { .. } => "InvalidQuantity",
            AppError::InvalidPriceQuote(_) => "InvalidPriceQuote",
            AppError::TransactionReverted { .. } => "TransactionReverted",
            AppError::ConfirmationTimeout { .. } => "ConfirmationTimeout",
            AppError::InvalidConfig(_) => "InvalidConfig",
            AppError::Rpc { .. } => "Rpc",
            AppError::Transport(_) => "Transport",
            AppError::Abi { .. } => "Abi",
            AppError::NoAccount => "NoAccount",
            AppError::PostCondition(_) => "PostCondition",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Transport(format!("响应解析失败: {}", err))
    }
}

/// 工作流失败：出错的步骤 + 原始错误
#[derive(Error, Debug, Clone, PartialEq)]
#[error("步骤 {step} 失败: [{kind}] {source}", kind = .source.kind())]
pub struct StepError {
    pub step: WorkflowStep,
    #[source]
    pub source: AppError,
}

impl StepError {
    pub fn new(step: WorkflowStep, source: AppError) -> Self {
        Self { step, source }
    }
}
