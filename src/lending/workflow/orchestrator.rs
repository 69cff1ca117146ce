use std::sync::Arc;

use alloy_primitives::Address;
use tracing::{info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::app_config::WorkflowConfig;
use crate::error::{AppError, Result, StepError};
use crate::lending::ledger::{ContractCall, LedgerClient, TxReceipt};
use crate::lending::model::{AccountPosition, Amount, Denomination, Native, TokenRef, Wrapped};
use crate::lending::protocol::{AddressesProvider, Erc20, LendingPool, PriceFeed, WrappedNative};
use crate::lending::registry::{self, NetworkAddresses};
use crate::lending::services::{BorrowCapacityCalculator, SafetyMargin};
use crate::lending::units::NATIVE_DECIMALS;
use crate::lending::workflow::report::{PositionSnapshot, WorkflowReport};
use crate::lending::workflow::step::WorkflowStep;

fn at(step: WorkflowStep) -> impl FnOnce(AppError) -> StepError {
    move |source| StepError::new(step, source)
}

fn step_span(step: WorkflowStep) -> Span {
    info_span!("step", name = step.as_str())
}

/// 抵押借贷工作流
///
/// 包装 -> 授权 -> 存入 -> 查询 -> 报价 -> 计算 -> 借款 -> 查询 -> 授权 -> 还款 -> 查询。
/// 每个写操作都等确认后才进入下一步；任一步失败立即返回，已确认的交易不回滚。
pub struct LendingWorkflow {
    ledger: Arc<dyn LedgerClient>,
    network: &'static NetworkAddresses,
    calculator: BorrowCapacityCalculator,
    config: WorkflowConfig,
}

impl LendingWorkflow {
    pub fn new(config: WorkflowConfig, ledger: Arc<dyn LedgerClient>) -> Result<Self> {
        config.validate()?;
        let network = registry::lookup(&config.network)?;
        let calculator = BorrowCapacityCalculator::new(SafetyMargin::new(config.safety_margin)?);
        Ok(Self {
            ledger,
            network,
            calculator,
            config,
        })
    }

    pub fn network(&self) -> &'static NetworkAddresses {
        self.network
    }

    pub async fn run(&self) -> std::result::Result<WorkflowReport, StepError> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("lending_workflow", run_id = %run_id, network = self.network.name);
        self.execute(run_id).instrument(span).await
    }

    async fn execute(&self, run_id: String) -> std::result::Result<WorkflowReport, StepError> {
        use WorkflowStep::*;

        let ledger = self.ledger.as_ref();
        let mut receipts = Vec::new();
        let mut positions = Vec::new();

        info!("1. 确定签名账户");
        let account = self
            .resolve_account()
            .instrument(step_span(ResolveAccount))
            .await
            .map_err(at(ResolveAccount))?;
        info!("签名账户: {}", account);

        info!("2. 包装 {} {}", self.config.amount_to_wrap, self.network.native_symbol);
        let native = Amount::<Native>::from_human(self.config.amount_to_wrap, NATIVE_DECIMALS)
            .map_err(at(WrapNative))?;
        let weth = WrappedNative::new(self.network.wrapped_native.address);
        receipts.push(self.submit_and_confirm(WrapNative, weth.deposit(native), account).await?);
        let wrapped = native.into_wrapped();
        let wrapped_balance = Amount::<Wrapped>::new(
            weth.token
                .balance_of(ledger, account)
                .instrument(step_span(WrapNative))
                .await
                .map_err(at(WrapNative))?,
            NATIVE_DECIMALS,
        );
        info!("持有 {} {}", wrapped_balance, self.network.wrapped_native.symbol);
        if wrapped_balance < wrapped {
            return Err(StepError::new(
                WrapNative,
                AppError::PostCondition(format!("包装后余额 {} 小于 {}", wrapped_balance, wrapped)),
            ));
        }

        info!("3. 解析借贷池地址");
        let provider = AddressesProvider::new(self.network.lending_pool_addresses_provider);
        let pool = provider
            .lending_pool(ledger)
            .instrument(step_span(ResolveLendingPool))
            .await
            .map_err(at(ResolveLendingPool))?;
        info!("借贷池: {}", pool.address);

        info!("4. 授权借贷池使用 {}", self.network.wrapped_native.symbol);
        receipts.push(
            self.approve(&self.network.wrapped_native, pool.address, wrapped, account)
                .await?,
        );

        info!("5. 存入抵押品");
        receipts.push(
            self.submit_and_confirm(
                DepositCollateral,
                pool.deposit(self.network.wrapped_native.address, wrapped, account),
                account,
            )
            .await?,
        );

        let after_deposit = self.query_position(&pool, account, "after_deposit").await?;
        positions.push(after_deposit.clone());

        info!("6. 读取 {} 价格", self.network.borrow_token.symbol);
        let price = PriceFeed::new(self.network.price_feed)
            .latest_quote(ledger, self.network.borrow_token.symbol, self.network.native_symbol)
            .instrument(step_span(ReadPrice))
            .await
            .map_err(at(ReadPrice))?;
        info!("{}/{} 价格: {}", price.base, price.quote, price.rate);

        info!("7. 计算可借 {} 数量", self.network.borrow_token.symbol);
        let borrow_token = Erc20::new(self.network.borrow_token.address);
        let borrowed = async {
            let target_decimals = borrow_token.decimals(ledger).await?;
            self.calculator
                .compute(after_deposit.position.available_borrow, &price, target_decimals)
        }
        .instrument(step_span(ComputeBorrowAmount))
        .await
        .map_err(at(ComputeBorrowAmount))?;
        info!("可以借 {} {}", borrowed, self.network.borrow_token.symbol);

        let borrow_skipped = borrowed.is_zero();
        if borrow_skipped {
            warn!("可借额度为 0，跳过借款和还款");
        } else {
            info!("8. 借入 {}", self.network.borrow_token.symbol);
            let mode = self.config.interest_rate_mode;
            receipts.push(
                self.submit_and_confirm(
                    Borrow,
                    pool.borrow(borrow_token.address, borrowed, mode, account),
                    account,
                )
                .await?,
            );
            positions.push(self.query_position(&pool, account, "after_borrow").await?);

            info!("9. 归还 {}", self.network.borrow_token.symbol);
            receipts.push(
                self.approve(&self.network.borrow_token, pool.address, borrowed, account)
                    .await?,
            );
            receipts.push(
                self.submit_and_confirm(
                    Repay,
                    pool.repay(borrow_token.address, borrowed, mode, account),
                    account,
                )
                .await?,
            );
        }

        positions.push(self.query_position(&pool, account, "after_repay").await?);

        Ok(WorkflowReport {
            run_id,
            network: self.network.name,
            account,
            lending_pool: pool.address,
            wrapped,
            wrapped_balance,
            price,
            borrowed,
            borrow_skipped,
            positions,
            receipts,
        })
    }

    async fn resolve_account(&self) -> Result<Address> {
        if let Some(account) = self.config.account {
            return Ok(account);
        }
        self.ledger
            .accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::NoAccount)
    }

    /// 授权 spender 使用恰好 amount 数量的代币
    async fn approve<D: Denomination>(
        &self,
        token: &TokenRef,
        spender: Address,
        amount: Amount<D>,
        signer: Address,
    ) -> std::result::Result<TxReceipt, StepError> {
        info!("授权 {} 使用 {} {}", spender, amount, token.symbol);
        let call = Erc20::new(token.address).approve(spender, amount);
        self.submit_and_confirm(WorkflowStep::ApproveSpender, call, signer)
            .await
    }

    /// 提交交易并等待确认，确认返回前不会进入下一步
    async fn submit_and_confirm(
        &self,
        step: WorkflowStep,
        call: ContractCall,
        signer: Address,
    ) -> std::result::Result<TxReceipt, StepError> {
        let span = info_span!("step", name = step.as_str(), method = call.method);
        async {
            let pending = self
                .ledger
                .submit_transaction(&call, signer)
                .await
                .map_err(at(step))?;
            let receipt = self
                .ledger
                .await_confirmations(&pending, self.config.confirmations)
                .await
                .map_err(at(step))?;
            info!(
                "{} 已确认 tx={} block={} confirmations={}",
                call.method, receipt.tx_hash, receipt.block_number, receipt.confirmations
            );
            Ok::<_, StepError>(receipt)
        }
        .instrument(span)
        .await
    }

    async fn query_position(
        &self,
        pool: &LendingPool,
        account: Address,
        label: &'static str,
    ) -> std::result::Result<PositionSnapshot, StepError> {
        let position: AccountPosition = pool
            .user_account_data(self.ledger.as_ref(), account)
            .instrument(step_span(WorkflowStep::QueryPosition))
            .await
            .map_err(at(WorkflowStep::QueryPosition))?;
        position.log(label);
        Ok(PositionSnapshot { label, position })
    }
}
