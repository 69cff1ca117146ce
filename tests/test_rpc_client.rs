use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use rust_lending::error::AppError;
use rust_lending::lending::ledger::{
    ContractCall, LedgerClient, PendingTx, RpcLedgerClient, RpcLedgerConfig,
};

type Handler = Arc<dyn Fn(&str) -> Value + Send + Sync>;

const TX_HASH: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

fn ok(result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result })
}

fn rpc_error(code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": code, "message": message } })
}

fn receipt(block: &str, status: &str) -> Value {
    ok(json!({ "transactionHash": TX_HASH, "blockNumber": block, "status": status }))
}

/// 本地 JSON-RPC 节点：按 method 返回预设的响应
async fn start_node(handler: Handler) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(serve_connection(socket, handler.clone()));
        }
    });
    url
}

async fn serve_connection(mut socket: TcpStream, handler: Handler) {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        // 读完请求头和 Content-Length 指定的请求体
        let (head_len, body_len) = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + body_len {
                    break (pos + 4, body_len);
                }
            }
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        };
        let request: Value = serde_json::from_slice(&buf[head_len..head_len + body_len]).unwrap();
        buf.drain(..head_len + body_len);

        let method = request["method"].as_str().unwrap_or_default().to_string();
        let body = handler(&method).to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        if socket.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

fn client(url: String, timeout: Duration) -> RpcLedgerClient {
    RpcLedgerClient::new(RpcLedgerConfig {
        url,
        confirmation_timeout: timeout,
        poll_interval: Duration::from_millis(10),
    })
}

fn pending() -> PendingTx {
    PendingTx::new(TX_HASH.parse::<B256>().unwrap(), "LendingPool.borrow")
}

#[tokio::test]
async fn test_receipt_status_zero_is_reverted() {
    let url = start_node(Arc::new(|method| match method {
        "eth_getTransactionReceipt" => receipt("0x10", "0x0"),
        "eth_blockNumber" => ok(json!("0x10")),
        other => rpc_error(-32601, other),
    }))
    .await;

    let err = client(url, Duration::from_secs(5))
        .await_confirmations(&pending(), 1)
        .await
        .unwrap_err();
    match err {
        AppError::TransactionReverted { method, tx_hash, .. } => {
            assert_eq!(method, "LendingPool.borrow");
            assert_eq!(tx_hash, TX_HASH);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_waits_until_enough_confirmations() -> anyhow::Result<()> {
    // 交易在 0x10 区块打包，每次查询区块高度前进一个块
    let head = Arc::new(AtomicU64::new(0x10));
    let head_in_node = head.clone();
    let url = start_node(Arc::new(move |method| match method {
        "eth_getTransactionReceipt" => receipt("0x10", "0x1"),
        "eth_blockNumber" => {
            let block = head_in_node.fetch_add(1, Ordering::SeqCst);
            ok(json!(format!("0x{:x}", block)))
        }
        other => rpc_error(-32601, other),
    }))
    .await;

    let receipt = client(url, Duration::from_secs(5))
        .await_confirmations(&pending(), 3)
        .await?;

    assert_eq!(receipt.block_number, 0x10);
    assert_eq!(receipt.confirmations, 3);
    // 高度 0x10、0x11 时确认数不足，0x12 时满足
    assert_eq!(head.load(Ordering::SeqCst), 0x13);
    Ok(())
}

#[tokio::test]
async fn test_pending_receipt_times_out() {
    let url = start_node(Arc::new(|method| match method {
        "eth_getTransactionReceipt" => ok(Value::Null),
        other => rpc_error(-32601, other),
    }))
    .await;

    let err = client(url, Duration::from_millis(200))
        .await_confirmations(&pending(), 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "ConfirmationTimeout");
    match err {
        AppError::ConfirmationTimeout { method, confirmations, .. } => {
            assert_eq!(method, "LendingPool.borrow");
            assert_eq!(confirmations, 1);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_send_revert_maps_to_transaction_reverted() {
    let url = start_node(Arc::new(|method| match method {
        "eth_sendTransaction" => rpc_error(
            -32603,
            "Error: VM Exception while processing transaction: reverted with reason string '11'",
        ),
        other => rpc_error(-32601, other),
    }))
    .await;

    let call = ContractCall::new(Address::repeat_byte(0x50), "LendingPool.borrow", Bytes::new());
    let err = client(url, Duration::from_secs(5))
        .submit_transaction(&call, Address::repeat_byte(0xAA))
        .await
        .unwrap_err();
    match err {
        AppError::TransactionReverted { method, reason, .. } => {
            assert_eq!(method, "LendingPool.borrow");
            assert!(reason.contains("reverted with reason string '11'"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_other_rpc_errors_pass_through() -> anyhow::Result<()> {
    let url = start_node(Arc::new(|method| match method {
        "eth_sendTransaction" => rpc_error(-32000, "nonce too low"),
        "eth_accounts" => ok(json!(["0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"])),
        other => rpc_error(-32601, other),
    }))
    .await;
    let ledger = client(url, Duration::from_secs(5));

    assert_eq!(ledger.accounts().await?, vec![Address::repeat_byte(0xAA)]);

    let call = ContractCall::new(Address::repeat_byte(0x50), "LendingPool.deposit", Bytes::new());
    let err = ledger
        .submit_transaction(&call, Address::repeat_byte(0xAA))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AppError::Rpc {
            method: "eth_sendTransaction".to_string(),
            code: -32000,
            message: "nonce too low".to_string(),
        }
    );
    Ok(())
}
