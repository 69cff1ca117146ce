#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use alloy_primitives::aliases::U80;
use alloy_primitives::{Address, Bytes, B256, I256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;

use rust_lending::app_config::WorkflowConfig;
use rust_lending::error::{AppError, Result};
use rust_lending::lending::ledger::{ContractCall, LedgerClient, PendingTx, TxReceipt};
use rust_lending::lending::protocol::abi::{
    methods, AggregatorV3Interface, IERC20, ILendingPool, ILendingPoolAddressesProvider,
};

pub const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

pub fn ether(n: u128) -> U256 {
    U256::from(n) * U256::from(ONE_ETHER)
}

pub fn test_config() -> WorkflowConfig {
    WorkflowConfig {
        network: "hardhat".to_string(),
        ..WorkflowConfig::default()
    }
}

struct MockState {
    calls: Vec<String>,
    submitted: Vec<ContractCall>,
    pending: HashMap<B256, ContractCall>,
    next_tx: u64,
    block: u64,
    wrapped_balance: U256,
    collateral: U256,
    debt: U256,
}

/// 内存账本：按方法标签返回预设数据，记录每一次调用
pub struct MockLedger {
    pub accounts: Vec<Address>,
    pub pool: Address,
    pub available_borrow: U256,
    pub price_answer: I256,
    pub feed_decimals: u8,
    pub token_decimals: u8,
    /// 某方法的确认阶段返回指定错误
    pub confirm_failures: HashMap<&'static str, AppError>,
    /// 某方法的提交阶段返回指定错误
    pub submit_failures: HashMap<&'static str, AppError>,
    /// WETH.deposit 确认后不增加余额，用于测试后置检查
    pub swallow_wrap: bool,
    state: Mutex<MockState>,
}

impl MockLedger {
    pub fn new() -> Self {
        MockLedger {
            accounts: vec![Address::repeat_byte(0xAA)],
            pool: Address::repeat_byte(0x50),
            available_borrow: ether(1),
            // 0.002 ETH / DAI，18 位小数
            price_answer: I256::from_raw(U256::from(2_000_000_000_000_000u64)),
            feed_decimals: 18,
            token_decimals: 18,
            confirm_failures: HashMap::new(),
            submit_failures: HashMap::new(),
            swallow_wrap: false,
            state: Mutex::new(MockState {
                calls: vec![],
                submitted: vec![],
                pending: HashMap::new(),
                next_tx: 1,
                block: 100,
                wrapped_balance: U256::ZERO,
                collateral: U256::ZERO,
                debt: U256::ZERO,
            }),
        }
    }

    pub fn with_available_borrow(mut self, value: U256) -> Self {
        self.available_borrow = value;
        self
    }

    pub fn with_price_answer(mut self, answer: I256) -> Self {
        self.price_answer = answer;
        self
    }

    pub fn with_token_decimals(mut self, decimals: u8) -> Self {
        self.token_decimals = decimals;
        self
    }

    pub fn without_accounts(mut self) -> Self {
        self.accounts.clear();
        self
    }

    pub fn fail_confirmation(mut self, method: &'static str, error: AppError) -> Self {
        self.confirm_failures.insert(method, error);
        self
    }

    pub fn fail_submission(mut self, method: &'static str, error: AppError) -> Self {
        self.submit_failures.insert(method, error);
        self
    }

    pub fn swallow_wrap(mut self) -> Self {
        self.swallow_wrap = true;
        self
    }

    /// 完整调用记录，形如 `submit:LendingPool.borrow`
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// 按提交顺序列出写操作的方法标签
    pub fn submitted_methods(&self) -> Vec<&'static str> {
        self.state
            .lock()
            .unwrap()
            .submitted
            .iter()
            .map(|c| c.method)
            .collect()
    }

    pub fn submitted(&self, method: &str) -> Vec<ContractCall> {
        self.state
            .lock()
            .unwrap()
            .submitted
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    fn account_data(&self, state: &MockState) -> Vec<u8> {
        let health_factor = if state.debt.is_zero() {
            U256::MAX
        } else {
            U256::from(2u64) * U256::from(ONE_ETHER)
        };
        ILendingPool::getUserAccountDataCall::abi_encode_returns(&(
            state.collateral,
            state.debt,
            self.available_borrow,
            U256::from(8250u64),
            U256::from(8000u64),
            health_factor,
        ))
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn accounts(&self) -> Result<Vec<Address>> {
        self.state.lock().unwrap().calls.push("read:accounts".to_string());
        Ok(self.accounts.clone())
    }

    async fn read_contract_state(&self, call: &ContractCall) -> Result<Bytes> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("read:{}", call.method));
        let data = match call.method {
            m if m == methods::ERC20_BALANCE_OF => {
                IERC20::balanceOfCall::abi_encode_returns(&(state.wrapped_balance,))
            }
            m if m == methods::ERC20_DECIMALS => {
                IERC20::decimalsCall::abi_encode_returns(&(self.token_decimals,))
            }
            m if m == methods::PROVIDER_GET_LENDING_POOL => {
                ILendingPoolAddressesProvider::getLendingPoolCall::abi_encode_returns(&(self.pool,))
            }
            m if m == methods::POOL_GET_USER_ACCOUNT_DATA => self.account_data(&state),
            m if m == methods::FEED_DECIMALS => {
                AggregatorV3Interface::decimalsCall::abi_encode_returns(&(self.feed_decimals,))
            }
            m if m == methods::FEED_LATEST_ROUND_DATA => {
                AggregatorV3Interface::latestRoundDataCall::abi_encode_returns(&(
                    U80::from(7u64),
                    self.price_answer,
                    U256::from(1_700_000_000u64),
                    U256::from(1_700_000_000u64),
                    U80::from(7u64),
                ))
            }
            other => {
                return Err(AppError::Rpc {
                    method: other.to_string(),
                    code: -32601,
                    message: "mock: unsupported read".to_string(),
                })
            }
        };
        Ok(Bytes::from(data))
    }

    async fn submit_transaction(&self, call: &ContractCall, _signer: Address) -> Result<PendingTx> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("submit:{}", call.method));
        if let Some(err) = self.submit_failures.get(call.method) {
            return Err(err.clone());
        }
        state.submitted.push(call.clone());
        let tx_hash = B256::left_padding_from(&state.next_tx.to_be_bytes());
        state.next_tx += 1;
        state.pending.insert(tx_hash, call.clone());
        Ok(PendingTx::new(tx_hash, call.method))
    }

    async fn await_confirmations(&self, pending: &PendingTx, confirmations: u64) -> Result<TxReceipt> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("confirm:{}", pending.method));
        if let Some(err) = self.confirm_failures.get(pending.method) {
            return Err(err.clone());
        }
        let call = state
            .pending
            .remove(&pending.tx_hash)
            .ok_or_else(|| AppError::Transport("mock: unknown tx".to_string()))?;

        // 确认后状态对后续读取可见
        match call.method {
            m if m == methods::WETH_DEPOSIT && !self.swallow_wrap => {
                state.wrapped_balance += call.value;
            }
            m if m == methods::POOL_DEPOSIT => {
                let decoded = ILendingPool::depositCall::abi_decode(&call.data, true).unwrap();
                state.wrapped_balance -= decoded.amount;
                state.collateral += decoded.amount;
            }
            m if m == methods::POOL_BORROW => {
                let decoded = ILendingPool::borrowCall::abi_decode(&call.data, true).unwrap();
                state.debt += decoded.amount;
            }
            m if m == methods::POOL_REPAY => {
                let decoded = ILendingPool::repayCall::abi_decode(&call.data, true).unwrap();
                state.debt = state.debt.saturating_sub(decoded.amount);
            }
            _ => {}
        }

        state.block += confirmations;
        Ok(TxReceipt {
            method: pending.method,
            tx_hash: pending.tx_hash,
            block_number: state.block,
            confirmations,
        })
    }
}
