use std::env;
use std::str::FromStr;

use crate::error::{AppError, Result};

/// 读取字符串环境变量，若不存在则返回默认值
pub fn env_or_default(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(v) => v,
        Err(_) => default.to_string(),
    }
}

/// 读取并解析环境变量，不存在时返回默认值，格式错误时报配置错误
pub fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::InvalidConfig(format!("{}={} 解析失败: {}", key, v, e))),
        _ => Ok(default),
    }
}

/// 可选的环境变量，空字符串视为未设置
pub fn env_optional<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::InvalidConfig(format!("{}={} 解析失败: {}", key, v, e))),
        _ => Ok(None),
    }
}
