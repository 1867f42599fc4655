//! 展示格式

use chrono::{DateTime, FixedOffset, Utc};
use martdesk_shared::catalog::DiscountType;
use rust_decimal::{Decimal, RoundingStrategy};

pub const CURRENCY: &str = "₵";

/// 金额，固定两位小数
pub fn money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{}{:.2}", CURRENCY, rounded)
}

/// 百分比，一位小数
pub fn percent(value: Decimal) -> String {
    format!("{:.1}%", value)
}

/// 本地时间，如 "05 Mar 2024, 02:30 PM"；缺失时显示占位符
pub fn date_time(value: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
    match value {
        Some(dt) => dt
            .with_timezone(&offset)
            .format("%d %b %Y, %I:%M %p")
            .to_string(),
        None => "-".to_string(),
    }
}

/// 本地日期，如 "05 Mar 2024"
pub fn date(value: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
    match value {
        Some(dt) => dt.with_timezone(&offset).format("%d %b %Y").to_string(),
        None => "-".to_string(),
    }
}

/// 优惠额度：百分比显示为 "15%"，固定金额显示为货币
pub fn discount(kind: DiscountType, value: Decimal) -> String {
    match kind {
        DiscountType::Percent => format!("{}%", value.normalize()),
        DiscountType::Fixed => money(value),
        DiscountType::Unknown => value.normalize().to_string(),
    }
}
