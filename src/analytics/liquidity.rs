/// 24h 成交量 / 市值（%），市值为 0 时取 0
pub fn volume_to_mcap_ratio(volume_24h: f64, market_cap: f64) -> f64 {
    if market_cap > 0.0 {
        volume_24h / market_cap * 100.0
    } else {
        0.0
    }
}

/// 流动性评分 0..=10
///
/// 按成交量市值比分段，从高到低依次判断；市值为 0 时评分为 0。
pub fn calculate_liquidity_score(volume_24h: f64, market_cap: f64) -> u8 {
    if market_cap <= 0.0 {
        return 0;
    }
    let ratio = volume_to_mcap_ratio(volume_24h, market_cap);
    if ratio > 50.0 {
        10
    } else if ratio > 25.0 {
        8
    } else if ratio > 15.0 {
        6
    } else if ratio > 5.0 {
        4
    } else if ratio > 1.0 {
        2
    } else {
        1
    }
}
