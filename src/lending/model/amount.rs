use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::marker::PhantomData;

use alloy_primitives::U256;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::lending::units;

/// 数量所属的计价单位
pub trait Denomination: Copy + Debug + Eq + Send + Sync + 'static {
    const LABEL: &'static str;
}

/// 链的原生币（ETH）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Native;

/// 原生币的包装代币（WETH）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrapped;

/// 借入的目标代币（DAI）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target;

impl Denomination for Native {
    const LABEL: &'static str = "native";
}

impl Denomination for Wrapped {
    const LABEL: &'static str = "wrapped";
}

impl Denomination for Target {
    const LABEL: &'static str = "target";
}

/// 带计价单位的定点数量
///
/// 不同单位的数量不能直接比较或相加，编译期即被拒绝。
/// 同一单位但小数位不同的两个数量没有大小关系，`partial_cmp` 返回 `None`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount<D: Denomination> {
    raw: U256,
    decimals: u8,
    unit: PhantomData<D>,
}

impl<D: Denomination> Amount<D> {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self {
            raw,
            decimals,
            unit: PhantomData,
        }
    }

    pub fn zero(decimals: u8) -> Self {
        Self::new(U256::ZERO, decimals)
    }

    pub fn from_human(quantity: f64, decimals: u8) -> Result<Self> {
        Ok(Self::new(units::to_base_units(quantity, decimals)?, decimals))
    }

    pub fn to_human(&self) -> Result<f64> {
        units::to_human(self.raw, self.decimals)
    }

    pub fn raw(&self) -> U256 {
        self.raw
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

impl Amount<Native> {
    /// 包装代币与原生币 1:1 兑换
    pub fn into_wrapped(self) -> Amount<Wrapped> {
        Amount::new(self.raw, self.decimals)
    }
}

impl<D: Denomination> PartialOrd for Amount<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.decimals != other.decimals {
            return None;
        }
        Some(self.raw.cmp(&other.raw))
    }
}

impl<D: Denomination> Display for Amount<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.to_human() {
            Ok(human) => write!(f, "{} {} ({})", human, D::LABEL, self.raw),
            Err(_) => write!(f, "{} {} (raw)", self.raw, D::LABEL),
        }
    }
}

impl<D: Denomination> Serialize for Amount<D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Amount", 4)?;
        state.serialize_field("unit", D::LABEL)?;
        state.serialize_field("raw", &self.raw.to_string())?;
        state.serialize_field("decimals", &self.decimals)?;
        state.serialize_field("human", &self.to_human().ok())?;
        state.end()
    }
}
