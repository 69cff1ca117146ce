use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::lending::ledger::{ContractCall, LedgerClient, PendingTx, TxReceipt};

#[derive(Debug, Clone)]
pub struct RpcLedgerConfig {
    pub url: String,
    /// 等待确认的最长时间
    pub confirmation_timeout: Duration,
    /// 轮询回执的间隔
    pub poll_interval: Duration,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize, Debug)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize, Debug)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Serialize, Debug)]
struct TransactionRequest {
    from: Address,
    to: Address,
    data: Bytes,
    #[serde(skip_serializing_if = "U256::is_zero")]
    value: U256,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: B256,
    block_number: Option<U64>,
    status: Option<U64>,
}

/// 基于以太坊 JSON-RPC 的账本客户端
///
/// 交易由节点管理的账户签名（`eth_sendTransaction`），适用于 hardhat 这类本地节点。
pub struct RpcLedgerClient {
    client: Client,
    config: RpcLedgerConfig,
    next_id: AtomicU64,
}

impl RpcLedgerClient {
    pub fn new(config: RpcLedgerConfig) -> Self {
        RpcLedgerClient {
            client: Client::new(),
            config,
            next_id: AtomicU64::new(1),
        }
    }

    async fn send_request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let response = self
            .client
            .post(&self.config.url)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&request)?)
            .send()
            .await?;

        let status_code = response.status();
        let response_body = response.text().await?;
        debug!("method:{}, rpc_response: {}", method, response_body);

        if status_code != StatusCode::OK {
            return Err(AppError::Transport(format!(
                "请求失败: {} status={} body={}",
                method, status_code, response_body
            )));
        }
        let response: RpcResponse<T> = serde_json::from_str(&response_body)?;
        if let Some(error) = response.error {
            return Err(AppError::Rpc {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result)
    }

    async fn send_required<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        self.send_request(method, params).await?.ok_or_else(|| AppError::Rpc {
            method: method.to_string(),
            code: 0,
            message: "empty result".to_string(),
        })
    }

    async fn block_number(&self) -> Result<u64> {
        let block: U64 = self.send_required("eth_blockNumber", json!([])).await?;
        Ok(block.to::<u64>())
    }

    /// 轮询回执直到确认数满足，没有期限，由调用方包一层超时
    async fn poll_confirmations(&self, pending: &PendingTx, confirmations: u64) -> Result<TxReceipt> {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        loop {
            interval.tick().await;
            let receipt: Option<RpcReceipt> = self
                .send_request("eth_getTransactionReceipt", json!([pending.tx_hash]))
                .await?;
            let Some(receipt) = receipt else {
                continue;
            };
            if receipt.status.map(|s| s.is_zero()).unwrap_or(false) {
                return Err(AppError::TransactionReverted {
                    method: pending.method.to_string(),
                    tx_hash: receipt.transaction_hash.to_string(),
                    reason: "receipt status 0".to_string(),
                });
            }
            let Some(included_at) = receipt.block_number.map(|b| b.to::<u64>()) else {
                continue;
            };
            let head = self.block_number().await?;
            let observed = head.saturating_sub(included_at) + 1;
            if observed >= confirmations {
                return Ok(TxReceipt {
                    method: pending.method,
                    tx_hash: receipt.transaction_hash,
                    block_number: included_at,
                    confirmations: observed,
                });
            }
            debug!(
                "{} 已确认 {}/{} tx={}",
                pending.method, observed, confirmations, pending.tx_hash
            );
        }
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn accounts(&self) -> Result<Vec<Address>> {
        self.send_required("eth_accounts", json!([])).await
    }

    async fn read_contract_state(&self, call: &ContractCall) -> Result<Bytes> {
        self.send_required(
            "eth_call",
            json!([{ "to": call.to, "data": call.data }, "latest"]),
        )
        .await
    }

    async fn submit_transaction(&self, call: &ContractCall, signer: Address) -> Result<PendingTx> {
        let tx = TransactionRequest {
            from: signer,
            to: call.to,
            data: call.data.clone(),
            value: call.value,
        };
        let tx_hash: B256 = self
            .send_required("eth_sendTransaction", json!([tx]))
            .await
            .map_err(|e| match e {
                // 节点在估算 gas 时就会拒绝必然回滚的交易
                AppError::Rpc { message, .. } if message.to_lowercase().contains("revert") => {
                    AppError::TransactionReverted {
                        method: call.method.to_string(),
                        tx_hash: "-".to_string(),
                        reason: message,
                    }
                }
                other => other,
            })?;
        info!("{} 已提交 tx={}", call.method, tx_hash);
        Ok(PendingTx::new(tx_hash, call.method))
    }

    async fn await_confirmations(&self, pending: &PendingTx, confirmations: u64) -> Result<TxReceipt> {
        let deadline = self.config.confirmation_timeout;
        match tokio::time::timeout(deadline, self.poll_confirmations(pending, confirmations)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::ConfirmationTimeout {
                method: pending.method.to_string(),
                tx_hash: pending.tx_hash.to_string(),
                confirmations,
                waited_secs: deadline.as_secs(),
            }),
        }
    }
}
