//! 请求参数归一化
//!
//! 缓存键由归一化后的参数构造，相同请求一定落到同一个键上。

use crate::error::{AppError, AppResult};

/// 单币种成交量追踪的天数范围
pub const SINGLE_COIN_MIN_DAYS: u32 = 7;
pub const SINGLE_COIN_MAX_DAYS: u32 = 365;
/// 多币种成交量追踪的天数范围
pub const MULTI_COIN_MIN_DAYS: u32 = 7;
pub const MULTI_COIN_MAX_DAYS: u32 = 30;
/// 批量请求最多处理的币种数
pub const MAX_BATCH_COINS: usize = 10;
/// 单页最多条数（上游限制）
pub const MAX_PER_PAGE: u32 = 250;
pub const MAX_HISTORY_DAYS: u32 = 365;

pub fn clamp_days(days: u32, min: u32, max: u32) -> u32 {
    days.clamp(min, max)
}

pub fn normalize_coin_id(raw: &str) -> AppResult<String> {
    let coin_id = raw.trim().to_ascii_lowercase();
    if coin_id.is_empty() {
        return Err(AppError::BadRequest("coin id is required".to_string()));
    }
    Ok(coin_id)
}

/// 逗号分隔的币种列表：去空白、去重，保留前 10 个
pub fn parse_coin_ids(raw: &str) -> AppResult<Vec<String>> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(|s| s.trim().to_ascii_lowercase()) {
        if id.is_empty() || ids.contains(&id) {
            continue;
        }
        ids.push(id);
        if ids.len() == MAX_BATCH_COINS {
            break;
        }
    }
    if ids.is_empty() {
        return Err(AppError::BadRequest(
            "coinIds parameter is required (comma-separated list)".to_string(),
        ));
    }
    Ok(ids)
}

pub fn normalize_query(raw: &str) -> AppResult<String> {
    let query = raw.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest("search query is required".to_string()));
    }
    Ok(query.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_days() {
        assert_eq!(clamp_days(1, SINGLE_COIN_MIN_DAYS, SINGLE_COIN_MAX_DAYS), 7);
        assert_eq!(clamp_days(30, SINGLE_COIN_MIN_DAYS, SINGLE_COIN_MAX_DAYS), 30);
        assert_eq!(clamp_days(1000, SINGLE_COIN_MIN_DAYS, SINGLE_COIN_MAX_DAYS), 365);
        assert_eq!(clamp_days(90, MULTI_COIN_MIN_DAYS, MULTI_COIN_MAX_DAYS), 30);
    }

    #[test]
    fn test_parse_coin_ids() {
        let ids = parse_coin_ids(" Bitcoin, ethereum,,bitcoin ").unwrap();
        assert_eq!(ids, vec!["bitcoin", "ethereum"]);

        let many: Vec<String> = (0..15).map(|i| format!("coin{}", i)).collect();
        assert_eq!(parse_coin_ids(&many.join(",")).unwrap().len(), MAX_BATCH_COINS);

        assert!(matches!(parse_coin_ids(" , "), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_normalize_coin_id() {
        assert_eq!(normalize_coin_id(" BitCoin ").unwrap(), "bitcoin");
        assert!(normalize_coin_id("  ").is_err());
    }
}
