use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// 工作流步骤，严格按顺序执行，任一步失败即终止
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowStep {
    ResolveAccount,
    WrapNative,
    ResolveLendingPool,
    ApproveSpender,
    DepositCollateral,
    QueryPosition,
    ReadPrice,
    ComputeBorrowAmount,
    Borrow,
    Repay,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::ResolveAccount => "ResolveAccount",
            WorkflowStep::WrapNative => "WrapNative",
            WorkflowStep::ResolveLendingPool => "ResolveLendingPool",
            WorkflowStep::ApproveSpender => "ApproveSpender",
            WorkflowStep::DepositCollateral => "DepositCollateral",
            WorkflowStep::QueryPosition => "QueryPosition",
            WorkflowStep::ReadPrice => "ReadPrice",
            WorkflowStep::ComputeBorrowAmount => "ComputeBorrowAmount",
            WorkflowStep::Borrow => "Borrow",
            WorkflowStep::Repay => "Repay",
        }
    }
}

impl Display for WorkflowStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
