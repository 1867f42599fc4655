//! 仪表盘指标聚合
//!
//! 纯函数、无状态：输入是完整的订单快照，每次渲染都从头计算。
//! 参考时间 `now` 和本地时区偏移由调用方传入，聚合器内部从不读取系统时钟。

use crate::order::{Order, OrderStatus};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{BTreeMap, HashMap};

#[cfg(test)]
mod tests;

/// "最近订单"窗口长度
pub const RECENT_WINDOW_HOURS: i64 = 24;

// =========================================================
// 汇总计数 (Summary)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryCounters {
    pub total_orders: usize,
    /// `payment_status == Paid`
    pub paid_orders: usize,
    /// `status == Processing`
    pub processing_orders: usize,
    /// 仅统计已支付订单的 `total_amount`
    pub revenue: Decimal,
}

pub fn summarize(orders: &[Order]) -> SummaryCounters {
    let mut summary = SummaryCounters {
        total_orders: orders.len(),
        ..Default::default()
    };

    for order in orders {
        if order.is_paid() {
            summary.paid_orders += 1;
            summary.revenue += order.total_amount;
        }
        if order.status == OrderStatus::Processing {
            summary.processing_orders += 1;
        }
    }
    summary
}

// =========================================================
// 月度序列 (Monthly Series)
// =========================================================

/// 一个自然月的累计值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyBucket {
    /// "MMM YYYY"，如 "Mar 2024"
    pub month_key: String,
    pub year: i32,
    pub month: u32,
    /// 该月所有订单的 `total_amount` 之和（不区分支付状态）
    pub revenue: Decimal,
    pub order_count: usize,
}

/// 按 `order_date` 在 `offset` 时区下所在的自然月分组
///
/// 与表格中显示的本地日期保持一致。结果按真实日期升序排列，
/// 而不是按 "MMM YYYY" 字符串排序。没有日期的订单无法分桶，直接跳过。
pub fn monthly_series(orders: &[Order], offset: FixedOffset) -> Vec<MonthlyBucket> {
    let mut buckets: BTreeMap<(i32, u32), (Decimal, usize)> = BTreeMap::new();

    for order in orders {
        let Some(date) = order.order_date else {
            continue;
        };
        let date = date.with_timezone(&offset);
        let entry = buckets
            .entry((date.year(), date.month()))
            .or_insert((Decimal::ZERO, 0));
        entry.0 += order.total_amount;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|((year, month), (revenue, order_count))| MonthlyBucket {
            month_key: month_key(year, month),
            year,
            month,
            revenue,
            order_count,
        })
        .collect()
}

fn month_key(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{:02} {}", month, year))
}

// =========================================================
// 状态分布 (Status Distribution)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCategory {
    Approved,
    /// 对应 `OrderStatus::Processing`
    Pending,
    Cancelled,
}

impl StatusCategory {
    pub const ALL: [StatusCategory; 3] = [Self::Approved, Self::Pending, Self::Cancelled];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Pending => "Pending",
            Self::Cancelled => "Cancelled",
        }
    }

    fn of(status: &OrderStatus) -> Option<Self> {
        match status {
            OrderStatus::Approved => Some(Self::Approved),
            OrderStatus::Processing => Some(Self::Pending),
            OrderStatus::Cancelled => Some(Self::Cancelled),
            OrderStatus::Other(_) => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Approved => 0,
            Self::Pending => 1,
            Self::Cancelled => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSlice {
    pub category: StatusCategory,
    pub count: usize,
}

/// 固定输出三项（Approved, Pending, Cancelled），数量为 0 也保留
pub fn status_distribution(orders: &[Order]) -> [StatusSlice; 3] {
    let mut counts = [0usize; 3];
    for category in orders.iter().filter_map(|o| StatusCategory::of(&o.status)) {
        counts[category.index()] += 1;
    }

    StatusCategory::ALL.map(|category| StatusSlice {
        category,
        count: counts[category.index()],
    })
}

// =========================================================
// 支付方式分布 (Payment Methods)
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethodSlice {
    pub method: String,
    pub count: usize,
    /// `100 * count / total`，保留一位小数（四舍五入）
    pub percentage: Decimal,
}

/// 按支付方式分组，缺失的归为 "Unknown"
///
/// 分组顺序为首次出现的顺序；没有订单时返回空。
pub fn payment_method_distribution(orders: &[Order]) -> Vec<PaymentMethodSlice> {
    let total = orders.len();
    if total == 0 {
        return Vec::new();
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, usize)> = Vec::new();
    for order in orders {
        let method = order.payment_method_label();
        match index.get(method) {
            Some(&i) => groups[i].1 += 1,
            None => {
                index.insert(method, groups.len());
                groups.push((method, 1));
            }
        }
    }

    groups
        .into_iter()
        .map(|(method, count)| PaymentMethodSlice {
            method: method.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

fn percentage(count: usize, total: usize) -> Decimal {
    (Decimal::from(count as u64) * Decimal::ONE_HUNDRED / Decimal::from(total as u64))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

// =========================================================
// 最近订单 (Recent Orders)
// =========================================================

/// `order_date` 严格晚于 `now - 24h` 的订单，保持输入顺序
pub fn recent_orders(orders: &[Order], now: DateTime<Utc>) -> Vec<&Order> {
    let cutoff = now - Duration::hours(RECENT_WINDOW_HOURS);
    orders
        .iter()
        .filter(|o| o.order_date.is_some_and(|d| d > cutoff))
        .collect()
}

// =========================================================
// 汇总结果
// =========================================================

/// 仪表盘一次渲染所需的全部指标
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardMetrics {
    pub summary: SummaryCounters,
    pub monthly: Vec<MonthlyBucket>,
    pub status: [StatusSlice; 3],
    pub payment_methods: Vec<PaymentMethodSlice>,
    pub recent: Vec<Order>,
}

impl DashboardMetrics {
    pub fn compute(orders: &[Order], now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            summary: summarize(orders),
            monthly: monthly_series(orders, offset),
            status: status_distribution(orders),
            payment_methods: payment_method_distribution(orders),
            recent: recent_orders(orders, now).into_iter().cloned().collect(),
        }
    }
}

impl Default for DashboardMetrics {
    fn default() -> Self {
        Self {
            summary: SummaryCounters::default(),
            monthly: Vec::new(),
            status: status_distribution(&[]),
            payment_methods: Vec::new(),
            recent: Vec::new(),
        }
    }
}
