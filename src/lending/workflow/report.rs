use alloy_primitives::Address;
use serde::Serialize;

use crate::lending::ledger::TxReceipt;
use crate::lending::model::{AccountPosition, Amount, PriceQuote, Target, Wrapped};

/// 某个时间点的账户快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSnapshot {
    pub label: &'static str,
    pub position: AccountPosition,
}

/// 一次完整运行的结果
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub run_id: String,
    pub network: &'static str,
    pub account: Address,
    pub lending_pool: Address,
    pub wrapped: Amount<Wrapped>,
    pub wrapped_balance: Amount<Wrapped>,
    pub price: PriceQuote,
    pub borrowed: Amount<Target>,
    /// 可借额度为零时跳过借款和还款
    pub borrow_skipped: bool,
    pub positions: Vec<PositionSnapshot>,
    pub receipts: Vec<TxReceipt>,
}

impl WorkflowReport {
    pub fn final_position(&self) -> Option<&AccountPosition> {
        self.positions.last().map(|s| &s.position)
    }
}
