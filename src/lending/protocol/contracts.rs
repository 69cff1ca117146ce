use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use alloy_primitives::{Address, I256, U256};
use alloy_sol_types::SolCall;
use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::lending::ledger::{ContractCall, LedgerClient};
use crate::lending::model::{
    AccountPosition, Amount, Denomination, Native, PriceQuote, Target, Wrapped,
};
use crate::lending::protocol::abi::{
    methods, AggregatorV3Interface, IERC20, ILendingPool, ILendingPoolAddressesProvider, IWeth,
};
use crate::lending::units;

/// Aave 推荐码已停用，固定为 0
const REFERRAL_CODE: u16 = 0;

/// 执行只读调用并解码返回值
pub async fn read<C: SolCall>(
    ledger: &dyn LedgerClient,
    to: Address,
    method: &'static str,
    call: C,
) -> Result<C::Return> {
    let request = ContractCall::new(to, method, call.abi_encode());
    let data = ledger.read_contract_state(&request).await?;
    C::abi_decode_returns(&data, true).map_err(|e| AppError::Abi {
        method: method.to_string(),
        reason: e.to_string(),
    })
}

/// 利率模式，借款与还款必须一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InterestRateMode {
    Stable,
    Variable,
}

impl InterestRateMode {
    pub fn code(&self) -> U256 {
        match self {
            InterestRateMode::Stable => U256::from(1u8),
            InterestRateMode::Variable => U256::from(2u8),
        }
    }
}

impl Display for InterestRateMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InterestRateMode::Stable => write!(f, "stable"),
            InterestRateMode::Variable => write!(f, "variable"),
        }
    }
}

impl FromStr for InterestRateMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stable" | "1" => Ok(InterestRateMode::Stable),
            "variable" | "2" => Ok(InterestRateMode::Variable),
            other => Err(AppError::InvalidConfig(format!("未知利率模式: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Erc20 {
    pub address: Address,
}

impl Erc20 {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn approve<D: Denomination>(&self, spender: Address, amount: Amount<D>) -> ContractCall {
        let call = IERC20::approveCall {
            spender,
            amount: amount.raw(),
        };
        ContractCall::new(self.address, methods::ERC20_APPROVE, call.abi_encode())
    }

    pub async fn balance_of(&self, ledger: &dyn LedgerClient, owner: Address) -> Result<U256> {
        let ret = read(
            ledger,
            self.address,
            methods::ERC20_BALANCE_OF,
            IERC20::balanceOfCall { account: owner },
        )
        .await?;
        Ok(ret._0)
    }

    pub async fn decimals(&self, ledger: &dyn LedgerClient) -> Result<u8> {
        let ret = read(ledger, self.address, methods::ERC20_DECIMALS, IERC20::decimalsCall {}).await?;
        Ok(ret._0)
    }
}

/// WETH：在 ERC20 之上多一个 payable 的 deposit
#[derive(Debug, Clone, Copy)]
pub struct WrappedNative {
    pub token: Erc20,
}

impl WrappedNative {
    pub fn new(address: Address) -> Self {
        Self {
            token: Erc20::new(address),
        }
    }

    pub fn deposit(&self, amount: Amount<Native>) -> ContractCall {
        ContractCall::new(self.token.address, methods::WETH_DEPOSIT, IWeth::depositCall {}.abi_encode())
            .with_value(amount.raw())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AddressesProvider {
    pub address: Address,
}

impl AddressesProvider {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// 借贷池地址可被协议升级，每次运行都重新读取
    pub async fn lending_pool(&self, ledger: &dyn LedgerClient) -> Result<LendingPool> {
        let ret = read(
            ledger,
            self.address,
            methods::PROVIDER_GET_LENDING_POOL,
            ILendingPoolAddressesProvider::getLendingPoolCall {},
        )
        .await?;
        Ok(LendingPool::new(ret._0))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LendingPool {
    pub address: Address,
}

impl LendingPool {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn deposit(&self, asset: Address, amount: Amount<Wrapped>, on_behalf_of: Address) -> ContractCall {
        let call = ILendingPool::depositCall {
            asset,
            amount: amount.raw(),
            onBehalfOf: on_behalf_of,
            referralCode: REFERRAL_CODE,
        };
        ContractCall::new(self.address, methods::POOL_DEPOSIT, call.abi_encode())
    }

    pub fn borrow(
        &self,
        asset: Address,
        amount: Amount<Target>,
        mode: InterestRateMode,
        on_behalf_of: Address,
    ) -> ContractCall {
        let call = ILendingPool::borrowCall {
            asset,
            amount: amount.raw(),
            interestRateMode: mode.code(),
            referralCode: REFERRAL_CODE,
            onBehalfOf: on_behalf_of,
        };
        ContractCall::new(self.address, methods::POOL_BORROW, call.abi_encode())
    }

    pub fn repay(
        &self,
        asset: Address,
        amount: Amount<Target>,
        mode: InterestRateMode,
        on_behalf_of: Address,
    ) -> ContractCall {
        let call = ILendingPool::repayCall {
            asset,
            amount: amount.raw(),
            rateMode: mode.code(),
            onBehalfOf: on_behalf_of,
        };
        ContractCall::new(self.address, methods::POOL_REPAY, call.abi_encode())
    }

    pub async fn user_account_data(&self, ledger: &dyn LedgerClient, user: Address) -> Result<AccountPosition> {
        let ret = read(
            ledger,
            self.address,
            methods::POOL_GET_USER_ACCOUNT_DATA,
            ILendingPool::getUserAccountDataCall { user },
        )
        .await?;
        AccountPosition::from_raw(
            ret.totalCollateralETH,
            ret.totalDebtETH,
            ret.availableBorrowsETH,
            ret.currentLiquidationThreshold,
            ret.ltv,
            ret.healthFactor,
        )
    }
}

/// Chainlink 价格源
#[derive(Debug, Clone, Copy)]
pub struct PriceFeed {
    pub address: Address,
}

impl PriceFeed {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// 读取最新一轮报价，rate = answer / 10^decimals
    pub async fn latest_quote(
        &self,
        ledger: &dyn LedgerClient,
        base: &str,
        quote: &str,
    ) -> Result<PriceQuote> {
        let decimals = read(
            ledger,
            self.address,
            methods::FEED_DECIMALS,
            AggregatorV3Interface::decimalsCall {},
        )
        .await?
        ._0;
        let round = read(
            ledger,
            self.address,
            methods::FEED_LATEST_ROUND_DATA,
            AggregatorV3Interface::latestRoundDataCall {},
        )
        .await?;
        debug!("{}/{} round={} answer={} decimals={}", base, quote, round.roundId, round.answer, decimals);

        let rate = signed_to_human(round.answer, decimals)?;
        Ok(PriceQuote::new(base, quote, rate).with_round(
            round.roundId.to::<u128>(),
            u64::try_from(round.updatedAt).unwrap_or(u64::MAX),
        ))
    }
}

fn signed_to_human(answer: I256, decimals: u8) -> Result<f64> {
    let magnitude = units::to_human(answer.unsigned_abs(), decimals)?;
    Ok(if answer.is_negative() { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_mode_parsing() {
        assert_eq!("Stable".parse::<InterestRateMode>().unwrap(), InterestRateMode::Stable);
        assert_eq!("2".parse::<InterestRateMode>().unwrap(), InterestRateMode::Variable);
        assert!("fixed".parse::<InterestRateMode>().is_err());
        assert_eq!(InterestRateMode::Stable.code(), U256::from(1u8));
    }

    #[test]
    fn negative_answer_keeps_sign() {
        let answer = I256::try_from(-2_000_000i64).unwrap();
        assert_eq!(signed_to_human(answer, 6).unwrap(), -2.0);
    }

    #[test]
    fn deposit_call_carries_value() {
        let weth = WrappedNative::new(Address::repeat_byte(0x11));
        let amount = Amount::from_human(0.01, 18).unwrap();
        let call = weth.deposit(amount);
        assert_eq!(call.method, methods::WETH_DEPOSIT);
        assert_eq!(call.value, amount.raw());
        assert_eq!(call.data.len(), 4);
    }
}
