//! 浏览器时钟
//!
//! `wasm32-unknown-unknown` 上没有系统时钟，当前时间和本地时区都从 `js_sys::Date` 读取。

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// 当前时间 (UTC)
pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

/// 浏览器本地时区偏移
///
/// `getTimezoneOffset()` 返回 "UTC - 本地" 的分钟数，符号与通常的写法相反。
pub fn local_offset() -> FixedOffset {
    let minutes = js_sys::Date::new_0().get_timezone_offset() as i32;
    FixedOffset::west_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
}
