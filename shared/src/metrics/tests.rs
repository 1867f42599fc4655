use super::*;
use crate::order::PaymentStatus;
use chrono::{FixedOffset, TimeZone};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn order(id: &str, date: Option<DateTime<Utc>>, amount: &str) -> Order {
    Order {
        order_id: id.to_string(),
        order_date: date,
        total_amount: dec(amount),
        ..Default::default()
    }
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

// =========================================================
// 汇总计数
// =========================================================

#[test]
fn test_summary_counts_paid_revenue_only() {
    let mut paid = order("a", None, "120.50");
    paid.payment_status = PaymentStatus::Paid;
    paid.status = OrderStatus::Approved;

    let mut unpaid = order("b", None, "99.00");
    unpaid.payment_status = PaymentStatus::Unpaid;
    unpaid.status = OrderStatus::Processing;

    let mut processing_paid = order("c", None, "10.00");
    processing_paid.payment_status = PaymentStatus::Paid;
    processing_paid.status = OrderStatus::Processing;

    let summary = summarize(&[paid, unpaid, processing_paid]);

    assert_eq!(summary.total_orders, 3);
    assert_eq!(summary.paid_orders, 2);
    assert_eq!(summary.processing_orders, 2);
    assert_eq!(summary.revenue, dec("130.50"));
}

#[test]
fn test_malformed_amount_is_counted_with_zero_revenue() {
    let raw = json!({
        "order_id": "bad",
        "payment_status": "Paid",
        "total_amount": "N/A"
    });
    let bad: Order = serde_json::from_value(raw).unwrap();
    let mut good = order("good", None, "25.00");
    good.payment_status = PaymentStatus::Paid;

    let summary = summarize(&[bad, good]);

    assert_eq!(summary.total_orders, 2);
    assert_eq!(summary.paid_orders, 2);
    assert_eq!(summary.revenue, dec("25.00"));
}

#[test]
fn test_empty_input_yields_zeroes() {
    let metrics = DashboardMetrics::compute(&[], ymd(2024, 3, 1), utc());
    assert_eq!(metrics.summary, SummaryCounters::default());
    assert!(metrics.monthly.is_empty());
    assert!(metrics.payment_methods.is_empty());
    assert!(metrics.recent.is_empty());
    assert_eq!(metrics, DashboardMetrics::default());
}

// =========================================================
// 月度序列
// =========================================================

#[test]
fn test_monthly_series_is_chronological() {
    let orders = [
        order("mar", Some(ymd(2024, 3, 1)), "30"),
        order("jan", Some(ymd(2024, 1, 1)), "10"),
        order("feb", Some(ymd(2024, 2, 1)), "20"),
    ];

    let keys: Vec<_> = monthly_series(&orders, utc())
        .into_iter()
        .map(|b| b.month_key)
        .collect();

    assert_eq!(keys, vec!["Jan 2024", "Feb 2024", "Mar 2024"]);
}

#[test]
fn test_monthly_series_crosses_years_by_date_not_name() {
    let orders = [
        order("a", Some(ymd(2024, 1, 5)), "1"),
        order("b", Some(ymd(2023, 12, 5)), "2"),
        order("c", Some(ymd(2023, 4, 5)), "3"),
    ];

    let keys: Vec<_> = monthly_series(&orders, utc())
        .into_iter()
        .map(|b| b.month_key)
        .collect();

    assert_eq!(keys, vec!["Apr 2023", "Dec 2023", "Jan 2024"]);
}

#[test]
fn test_monthly_bucket_sums_all_orders_regardless_of_payment() {
    let mut paid = order("a", Some(ymd(2024, 5, 2)), "40.00");
    paid.payment_status = PaymentStatus::Paid;
    let unpaid = order("b", Some(ymd(2024, 5, 20)), "15.00");
    let undated = order("c", None, "1000.00");

    let series = monthly_series(&[paid, unpaid, undated], utc());

    assert_eq!(series.len(), 1);
    assert_eq!(series[0].month_key, "May 2024");
    assert_eq!(series[0].order_count, 2);
    assert_eq!(series[0].revenue, dec("55.00"));
}

#[test]
fn test_monthly_series_uses_local_month() {
    // 2024-03-31 22:00 -05:00 在 UTC 下已是 4 月 1 日
    let raw = json!({"order_id": "late", "order_date": "2024-03-31T22:00:00-05:00"});
    let late: Order = serde_json::from_value(raw).unwrap();
    let new_york = FixedOffset::west_opt(5 * 3600).unwrap();

    let local: Vec<_> = monthly_series(std::slice::from_ref(&late), new_york)
        .into_iter()
        .map(|b| b.month_key)
        .collect();
    assert_eq!(local, vec!["Mar 2024"]);

    let in_utc: Vec<_> = monthly_series(std::slice::from_ref(&late), utc())
        .into_iter()
        .map(|b| b.month_key)
        .collect();
    assert_eq!(in_utc, vec!["Apr 2024"]);
}

#[test]
fn test_monthly_series_east_of_utc_moves_forward() {
    // 2023-12-31 20:00Z 在 +05:30 下是 2024-01-01 01:30
    let o = order("new-year", Some(Utc.with_ymd_and_hms(2023, 12, 31, 20, 0, 0).unwrap()), "5");
    let kolkata = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();

    let series = monthly_series(&[o], kolkata);

    assert_eq!(series.len(), 1);
    assert_eq!(series[0].month_key, "Jan 2024");
    assert_eq!((series[0].year, series[0].month), (2024, 1));
}

// =========================================================
// 状态分布
// =========================================================

#[test]
fn test_status_distribution_always_has_three_entries() {
    let empty = status_distribution(&[]);
    let labels: Vec<_> = empty.iter().map(|s| s.category.label()).collect();
    assert_eq!(labels, vec!["Approved", "Pending", "Cancelled"]);
    assert!(empty.iter().all(|s| s.count == 0));
}

#[test]
fn test_status_distribution_ignores_unknown_statuses() {
    let mut orders = Vec::new();
    for status in ["Approved", "processing", "Processing", "CANCELLED", "Shipped"] {
        let mut o = order(status, None, "1");
        o.status = OrderStatus::from_raw(status);
        orders.push(o);
    }

    let dist = status_distribution(&orders);

    assert_eq!(dist[0].count, 1);
    assert_eq!(dist[1].count, 2);
    assert_eq!(dist[2].count, 1);
}

// =========================================================
// 支付方式分布
// =========================================================

#[test]
fn test_payment_method_percentages() {
    let mut orders = Vec::new();
    for method in ["Card", "Cash", "Card", "Card"] {
        let mut o = order(method, None, "1");
        o.payment_method = Some(method.to_string());
        orders.push(o);
    }

    let slices = payment_method_distribution(&orders);

    assert_eq!(slices.len(), 2);
    assert_eq!(slices[0].method, "Card");
    assert_eq!(slices[0].count, 3);
    assert_eq!(slices[0].percentage, dec("75.0"));
    assert_eq!(slices[1].method, "Cash");
    assert_eq!(slices[1].percentage, dec("25.0"));
}

#[test]
fn test_missing_payment_method_groups_as_unknown() {
    let mut momo = order("a", None, "1");
    momo.payment_method = Some("Mobile Money".to_string());
    let unknown_a = order("b", None, "1");
    let unknown_b = order("c", None, "1");

    let slices = payment_method_distribution(&[momo, unknown_a, unknown_b]);

    assert_eq!(slices[0].method, "Mobile Money");
    assert_eq!(slices[0].percentage, dec("33.3"));
    assert_eq!(slices[1].method, "Unknown");
    assert_eq!(slices[1].count, 2);
    assert_eq!(slices[1].percentage, dec("66.7"));
}

#[test]
fn test_payment_percentages_sum_to_hundred() {
    let splits: [&[usize]; 5] = [&[1, 1, 1], &[2, 3, 2], &[1, 2], &[1, 2, 4], &[5, 1, 1]];

    for split in splits {
        let mut orders = Vec::new();
        for (group, &count) in split.iter().enumerate() {
            for n in 0..count {
                let mut o = order(&format!("{}-{}", group, n), None, "1");
                o.payment_method = Some(format!("Method {}", group));
                orders.push(o);
            }
        }

        let slices = payment_method_distribution(&orders);
        let sum: Decimal = slices.iter().map(|s| s.percentage).sum();

        assert_eq!(slices.len(), split.len());
        assert!(
            (sum - Decimal::ONE_HUNDRED).abs() <= dec("0.1"),
            "split {:?} summed to {}",
            split,
            sum
        );
    }
}

// =========================================================
// 最近订单
// =========================================================

#[test]
fn test_recent_window_boundary() {
    let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
    let inside = order("inside", Some(now - Duration::hours(23) - Duration::minutes(59)), "1");
    let outside = order("outside", Some(now - Duration::hours(24) - Duration::minutes(1)), "1");
    let exact = order("exact", Some(now - Duration::hours(24)), "1");
    let undated = order("undated", None, "1");

    let orders = [inside, outside, exact, undated];
    let ids: Vec<_> = recent_orders(&orders, now)
        .into_iter()
        .map(|o| o.order_id.as_str())
        .collect();

    assert_eq!(ids, vec!["inside"]);
}

#[test]
fn test_compute_is_deterministic_for_fixed_now() {
    let now = ymd(2024, 6, 10);
    let mut a = order("a", Some(now - Duration::hours(1)), "12.00");
    a.payment_status = PaymentStatus::Paid;
    a.payment_method = Some("Card".to_string());
    let orders = vec![a, order("b", Some(ymd(2024, 5, 1)), "8.00")];

    let first = DashboardMetrics::compute(&orders, now, utc());
    let second = DashboardMetrics::compute(&orders, now, utc());

    assert_eq!(first, second);
    assert_eq!(first.recent.len(), 1);
    assert_eq!(first.monthly.len(), 2);
}
