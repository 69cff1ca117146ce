use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::lending::model::{Amount, Native, PriceQuote, Target};

/// 安全系数，取值 (0, 1]
///
/// 协议报告的可借额度在读取和借款之间会变化（价格波动、利息累积），少借一点避免被健康因子检查回滚。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SafetyMargin(f64);

impl SafetyMargin {
    pub const DEFAULT: f64 = 0.95;

    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 && value <= 1.0 {
            Ok(SafetyMargin(value))
        } else {
            Err(AppError::InvalidConfig(format!(
                "安全系数必须在 (0, 1] 区间内: {}",
                value
            )))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for SafetyMargin {
    fn default() -> Self {
        SafetyMargin(Self::DEFAULT)
    }
}

/// 借款额度计算器
#[derive(Debug, Clone, Copy)]
pub struct BorrowCapacityCalculator {
    margin: SafetyMargin,
}

impl BorrowCapacityCalculator {
    pub fn new(margin: SafetyMargin) -> Self {
        Self { margin }
    }

    /// 把以原生币计价的可借额度换算成目标代币数量
    ///
    /// `price.rate` 是一个目标代币值多少原生币。所有运算先在原生币下完成，最后再按目标代币的小数位转为定点数。
    pub fn compute(
        &self,
        available: Amount<Native>,
        price: &PriceQuote,
        target_decimals: u8,
    ) -> Result<Amount<Target>> {
        if !price.rate.is_finite() || price.rate <= 0.0 {
            return Err(AppError::InvalidPriceQuote(format!(
                "{}/{} rate={}",
                price.base, price.quote, price.rate
            )));
        }
        if available.is_zero() {
            return Ok(Amount::zero(target_decimals));
        }

        let human_native = available.to_human()?;
        let human_target = human_native * self.margin.value() * (1.0 / price.rate);
        debug!(
            "可借 {} {} * 安全系数 {} / 价格 {} = {} {}",
            human_native,
            price.quote,
            self.margin.value(),
            price.rate,
            human_target,
            price.base
        );
        Amount::from_human(human_target, target_decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_bounds() {
        assert!(SafetyMargin::new(1.0).is_ok());
        assert!(SafetyMargin::new(0.0).is_err());
        assert!(SafetyMargin::new(1.01).is_err());
        assert!(SafetyMargin::new(f64::NAN).is_err());
        assert_eq!(SafetyMargin::default().value(), 0.95);
    }
}
