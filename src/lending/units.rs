//! 原生币与链上定点数之间的换算
//!
//! 人类可读数量使用 f64，链上数量使用 U256，小数位由代币决定。

use alloy_primitives::utils::{format_units, parse_units, ParseUnits};
use alloy_primitives::U256;

use crate::error::{AppError, Result};

/// 原生币（ETH）的小数位，1 ETH = 10^18 wei
pub const NATIVE_DECIMALS: u8 = 18;

/// 把人类可读数量放大 10^decimals 转为定点数
pub fn to_base_units(quantity: f64, decimals: u8) -> Result<U256> {
    if !quantity.is_finite() {
        return Err(AppError::invalid_quantity(quantity, "非有限值"));
    }
    if quantity < 0.0 {
        return Err(AppError::invalid_quantity(quantity, "不能为负数"));
    }
    // -0.0 也走这里
    if quantity == 0.0 {
        return Ok(U256::ZERO);
    }
    let text = decimal_text(quantity, decimals);
    match parse_units(&text, decimals) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(AppError::invalid_quantity(quantity, "不能为负数")),
        Err(e) => Err(AppError::invalid_quantity(quantity, e.to_string())),
    }
}

/// f64 的最短十进制表示（`0.1` 就是 "0.1"），小数部分超出 decimals 位的截掉
///
/// `Display` 对 f64 不会输出指数形式。
fn decimal_text(quantity: f64, decimals: u8) -> String {
    let text = quantity.to_string();
    match text.split_once('.') {
        Some((int, _)) if decimals == 0 => int.to_string(),
        Some((int, frac)) if frac.len() > decimals as usize => {
            format!("{}.{}", int, &frac[..decimals as usize])
        }
        _ => text,
    }
}

/// 定点数还原为人类可读数量
pub fn to_human(amount: U256, decimals: u8) -> Result<f64> {
    let text = format_units(amount, decimals)
        .map_err(|e| AppError::invalid_quantity(amount, e.to_string()))?;
    text.parse::<f64>()
        .map_err(|e| AppError::invalid_quantity(amount, e.to_string()))
}
