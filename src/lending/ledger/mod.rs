//! 链上账本客户端能力接口
//!
//! 工作流只依赖这里的 trait：读合约状态、提交交易、等待确认。
//! 等待确认成功返回之后，状态变更对后续读取可见。

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

pub mod rpc_client;

pub use rpc_client::{RpcLedgerClient, RpcLedgerConfig};

/// 一次合约调用：目标合约、方法名、calldata、附带的原生币
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub to: Address,
    /// `合约.方法` 形式，仅用于日志和测试断言
    pub method: &'static str,
    pub data: Bytes,
    pub value: U256,
}

impl ContractCall {
    pub fn new(to: Address, method: &'static str, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            method,
            data: data.into(),
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// 已提交、尚未确认的交易句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTx {
    pub tx_hash: B256,
    pub method: &'static str,
}

impl PendingTx {
    pub fn new(tx_hash: B256, method: &'static str) -> Self {
        Self { tx_hash, method }
    }
}

/// 已确认交易的回执，由客户端生成，工作流消费一次
///
/// 失败的交易不会产生回执，而是以错误返回。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxReceipt {
    pub method: &'static str,
    pub tx_hash: B256,
    pub block_number: u64,
    pub confirmations: u64,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// 节点管理的账户列表，第一个作为默认签名者
    async fn accounts(&self) -> Result<Vec<Address>>;

    /// 只读调用，不需要确认
    async fn read_contract_state(&self, call: &ContractCall) -> Result<Bytes>;

    /// 提交状态变更交易，立即返回句柄
    async fn submit_transaction(&self, call: &ContractCall, signer: Address) -> Result<PendingTx>;

    /// 挂起直到观察到 `confirmations` 个确认
    ///
    /// 交易回滚返回 `TransactionReverted`，超过期限返回 `ConfirmationTimeout`。
    async fn await_confirmations(&self, pending: &PendingTx, confirmations: u64) -> Result<TxReceipt>;
}
