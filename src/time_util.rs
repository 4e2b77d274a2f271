use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

/// 毫秒时间戳转 UTC 时间，非法时间戳回退到 1970-01-01
pub fn mill_time_to_datetime(timestamp_ms: i64) -> DateTime<Utc> {
    match Utc.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(datetime) => datetime,
        _ => DateTime::<Utc>::default(),
    }
}

pub fn mill_time_to_date(timestamp_ms: i64) -> NaiveDate {
    mill_time_to_datetime(timestamp_ms).date_naive()
}

/// `YYYY-MM-DD`
pub fn iso_date(timestamp_ms: i64) -> String {
    mill_time_to_date(timestamp_ms).format("%Y-%m-%d").to_string()
}

/// 展示用日期，如 `Mon, Jan 1`
pub fn display_label(timestamp_ms: i64) -> String {
    mill_time_to_date(timestamp_ms).format("%a, %b %-d").to_string()
}

/// 星期几，0 = 周日
pub fn day_of_week(timestamp_ms: i64) -> u32 {
    mill_time_to_date(timestamp_ms)
        .weekday()
        .num_days_from_sunday()
}

/// 所在周的周日
pub fn sunday_week_start(timestamp_ms: i64) -> NaiveDate {
    let date = mill_time_to_date(timestamp_ms);
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// ISO 周：(年, 周序号)
pub fn iso_week(timestamp_ms: i64) -> (i32, u32) {
    let week = mill_time_to_date(timestamp_ms).iso_week();
    (week.year(), week.week())
}
