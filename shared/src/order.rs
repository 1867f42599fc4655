//! 订单领域模型

use crate::serde_helper::{
    count_or_zero, decimal_or_zero, non_empty_string, null_as_default, string_lenient,
    timestamp_lenient,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 未提供支付方式时使用的分类名
pub const UNKNOWN_PAYMENT_METHOD: &str = "Unknown";

// =========================================================
// 状态枚举
// =========================================================

/// 订单状态
///
/// 后端返回的大小写不固定（`"Processing"` / `"processing"`），解析时忽略大小写。
/// 无法识别的值原样保存在 `Other` 中，不参与任何按状态的统计。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Processing,
    Approved,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "processing" => Self::Processing,
            "approved" => Self::Approved,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Processing => "Processing",
            Self::Approved => "Approved",
            Self::Cancelled => "Cancelled",
            Self::Other(raw) => raw,
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

/// 支付状态
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Other(String),
}

impl PaymentStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "paid" => Self::Paid,
            "unpaid" => Self::Unpaid,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Paid => "Paid",
            Self::Unpaid => "Unpaid",
            Self::Other(raw) => raw,
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

macro_rules! impl_status_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                Ok(Option::<String>::deserialize(deserializer)?
                    .map(|raw| Self::from_raw(&raw))
                    .unwrap_or_default())
            }
        }
    };
}

impl_status_serde!(OrderStatus);
impl_status_serde!(PaymentStatus);

// =========================================================
// 标签映射 (Status Tags)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagColor {
    Green,
    Red,
    Gold,
}

/// 表格中状态/支付状态列使用的标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTag {
    pub label: &'static str,
    pub color: TagColor,
}

impl StatusTag {
    /// 根据原始状态字符串选择标签，未知状态一律显示为 Processing
    pub fn for_status(raw: &str) -> Self {
        let (label, color) = match raw.trim().to_ascii_lowercase().as_str() {
            "approved" => ("Approved", TagColor::Green),
            "cancelled" | "canceled" => ("Cancelled", TagColor::Red),
            "paid" => ("Paid", TagColor::Green),
            "unpaid" => ("Unpaid", TagColor::Red),
            _ => ("Processing", TagColor::Gold),
        };
        Self { label, color }
    }
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCategory {
    #[serde(default, deserialize_with = "string_lenient")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(default, deserialize_with = "string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub product_image: Option<String>,
    #[serde(default, deserialize_with = "string_lenient")]
    pub slug: String,
    #[serde(default)]
    pub sub_category: Option<SubCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_details: ProductDetails,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub quantity: u64,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub price_at_purchase: Decimal,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub subtotal: Decimal,
}

/// 订单
///
/// `total_amount` 由服务端提供，聚合统计直接信任它；
/// 明细视图使用 [`Order::items_subtotal`]，两者互不推导。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, deserialize_with = "string_lenient")]
    pub order_id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub placed_by: String,
    #[serde(default, deserialize_with = "timestamp_lenient")]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub total_amount: Decimal,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub shipping_address: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_items: Vec<OrderItem>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// 已取消的订单不可再被选中操作
    pub fn is_selectable(&self) -> bool {
        self.status != OrderStatus::Cancelled
    }

    /// 支付方式分类名，缺失时为 "Unknown"
    pub fn payment_method_label(&self) -> &str {
        self.payment_method.as_deref().unwrap_or(UNKNOWN_PAYMENT_METHOD)
    }

    /// 订单号前 8 位，用于表格展示
    pub fn short_id(&self) -> &str {
        match self.order_id.char_indices().nth(8) {
            Some((idx, _)) => &self.order_id[..idx],
            None => &self.order_id,
        }
    }

    /// 明细小计之和（订单表格与详情抽屉中显示的总额）
    pub fn items_subtotal(&self) -> Decimal {
        self.order_items.iter().map(|item| item.subtotal).sum()
    }

    /// 服务端总额与明细小计之和的差额
    ///
    /// 两者一致时返回 `None`。这两个数字来源不同，这里只报告差异，不做统一。
    pub fn total_discrepancy(&self) -> Option<Decimal> {
        let diff = self.total_amount - self.items_subtotal();
        (!diff.is_zero()).then_some(diff)
    }
}

/// 按下单时间倒序排列，没有日期的订单排在最后
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_order() {
        let order: Order = serde_json::from_value(json!({
            "order_id": "3f2a9c1e-77aa-4b1c-9d1e-0a1b2c3d4e5f",
            "placed_by": "ama@example.com",
            "order_date": "2024-05-02T14:03:00Z",
            "status": "processing",
            "payment_status": "Paid",
            "payment_method": "Mobile Money",
            "total_amount": "120.50",
            "shipping_address": "12 Ring Road, Accra",
            "order_items": [
                {
                    "product_details": {
                        "name": "Shea Butter",
                        "product_image": "https://cdn.example.com/shea.png",
                        "slug": "shea-butter",
                        "sub_category": { "name": "Skin Care" }
                    },
                    "quantity": 2,
                    "price_at_purchase": "30.00",
                    "subtotal": "60.00"
                },
                {
                    "product_details": { "name": "Black Soap", "slug": "black-soap" },
                    "quantity": 3,
                    "price_at_purchase": 20,
                    "subtotal": 60
                }
            ]
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::Processing);
        assert!(order.is_paid());
        assert_eq!(order.payment_method_label(), "Mobile Money");
        assert_eq!(order.total_amount, Decimal::new(12050, 2));
        assert_eq!(order.order_items.len(), 2);
        assert_eq!(order.items_subtotal(), Decimal::from(120));
        assert_eq!(order.short_id(), "3f2a9c1e");
        assert_eq!(
            order.order_items[0]
                .product_details
                .sub_category
                .as_ref()
                .map(|s| s.name.as_str()),
            Some("Skin Care")
        );
    }

    #[test]
    fn test_decode_tolerates_missing_and_malformed_fields() {
        let order: Order = serde_json::from_value(json!({
            "order_id": 42,
            "placed_by": null,
            "order_date": "not a date",
            "status": "Shipped",
            "payment_status": null,
            "payment_method": "",
            "total_amount": "n/a",
            "order_items": null
        }))
        .unwrap();

        assert_eq!(order.order_id, "42");
        assert_eq!(order.placed_by, "");
        assert!(order.order_date.is_none());
        assert_eq!(order.status, OrderStatus::Other("Shipped".to_string()));
        assert!(!order.is_paid());
        assert_eq!(order.payment_method_label(), UNKNOWN_PAYMENT_METHOD);
        assert_eq!(order.total_amount, Decimal::ZERO);
        assert!(order.order_items.is_empty());
    }

    #[test]
    fn test_total_discrepancy_is_reported_not_unified() {
        let mut order = Order {
            total_amount: Decimal::from(100),
            ..Default::default()
        };
        order.order_items.push(OrderItem {
            subtotal: Decimal::from(90),
            ..Default::default()
        });
        assert_eq!(order.total_discrepancy(), Some(Decimal::from(10)));
        assert_eq!(order.total_amount, Decimal::from(100));

        order.order_items[0].subtotal = Decimal::from(100);
        assert_eq!(order.total_discrepancy(), None);
    }

    #[test]
    fn test_cancelled_orders_are_not_selectable() {
        let order = Order {
            status: OrderStatus::from_raw("cancelled"),
            ..Default::default()
        };
        assert!(!order.is_selectable());
        assert!(Order::default().is_selectable());
    }

    #[test]
    fn test_status_tags() {
        assert_eq!(StatusTag::for_status("APPROVED").color, TagColor::Green);
        assert_eq!(StatusTag::for_status("Unpaid").label, "Unpaid");
        assert_eq!(StatusTag::for_status("cancelled").color, TagColor::Red);
        assert_eq!(StatusTag::for_status("on hold").label, "Processing");
        assert_eq!(StatusTag::for_status("").color, TagColor::Gold);
    }

    #[test]
    fn test_sort_newest_first_puts_undated_last() {
        let dated = |id: &str, date: &str| Order {
            order_id: id.to_string(),
            order_date: crate::serde_helper::parse_timestamp(date),
            ..Default::default()
        };
        let mut orders = vec![
            dated("old", "2024-01-01T00:00:00Z"),
            Order {
                order_id: "undated".to_string(),
                ..Default::default()
            },
            dated("new", "2024-06-01T08:00:00Z"),
        ];

        sort_newest_first(&mut orders);

        let ids: Vec<_> = orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old", "undated"]);
    }

    #[test]
    fn test_short_id_handles_short_ids() {
        let order = Order {
            order_id: "abc".to_string(),
            ..Default::default()
        };
        assert_eq!(order.short_id(), "abc");
    }
}
