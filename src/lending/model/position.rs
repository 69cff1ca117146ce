use alloy_primitives::U256;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::lending::model::amount::{Amount, Native};
use crate::lending::units::{self, NATIVE_DECIMALS};

/// 健康因子按 1e18 存储
const HEALTH_FACTOR_DECIMALS: u8 = 18;
/// 清算阈值与 LTV 以基点表示
const BASIS_POINTS: f64 = 10_000.0;

/// 借贷协议返回的账户快照，金额均以原生币计价
///
/// 每次查询生成新的快照，不原地更新。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountPosition {
    pub total_collateral: Amount<Native>,
    pub total_debt: Amount<Native>,
    pub available_borrow: Amount<Native>,
    /// 清算阈值，0~1
    pub liquidation_threshold: f64,
    /// 贷款价值比，0~1
    pub ltv: f64,
    /// 无负债时协议返回 uint256 最大值，这里记为无穷大
    pub health_factor: f64,
}

impl AccountPosition {
    pub fn from_raw(
        total_collateral: U256,
        total_debt: U256,
        available_borrow: U256,
        liquidation_threshold_bps: U256,
        ltv_bps: U256,
        health_factor_wad: U256,
    ) -> Result<Self> {
        let health_factor = if health_factor_wad == U256::MAX {
            f64::INFINITY
        } else {
            units::to_human(health_factor_wad, HEALTH_FACTOR_DECIMALS)?
        };
        Ok(Self {
            total_collateral: Amount::new(total_collateral, NATIVE_DECIMALS),
            total_debt: Amount::new(total_debt, NATIVE_DECIMALS),
            available_borrow: Amount::new(available_borrow, NATIVE_DECIMALS),
            liquidation_threshold: units::to_human(liquidation_threshold_bps, 0)? / BASIS_POINTS,
            ltv: units::to_human(ltv_bps, 0)? / BASIS_POINTS,
            health_factor,
        })
    }

    pub fn log(&self, label: &str) {
        info!("----------------账户状态 [{}]", label);
        info!("抵押品总值: {}", self.total_collateral);
        info!("负债总值: {}", self.total_debt);
        info!("可借额度: {}", self.available_borrow);
        info!("清算阈值: {}", self.liquidation_threshold);
        info!("LTV: {}", self.ltv);
        info!("健康因子: {}", self.health_factor);
    }
}
