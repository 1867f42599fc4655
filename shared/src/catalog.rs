//! 商品目录模型：分类、子分类、商品、优惠券
//!
//! 列表记录使用宽松解码；提交给后端的 `*Draft` 结构只负责序列化。

use crate::serde_helper::{
    count_or_zero, decimal_or_zero, non_empty_string, null_as_default, parse_decimal,
    string_lenient, timestamp_lenient,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =========================================================
// 分类 (Categories)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub category_image: Option<String>,
}

/// 新建或修改分类的请求体（图片不在这里上传）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
}

impl From<&Category> for CategoryDraft {
    fn from(c: &Category) -> Self {
        Self {
            name: c.name.clone(),
            description: c.description.clone(),
        }
    }
}

// =========================================================
// 子分类 (Sub-categories)
// =========================================================

/// 子分类列表记录
///
/// 列表接口中 `category` 是父分类的名称，而写接口需要父分类的 id。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCategory {
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub category: String,
}

impl SubCategory {
    /// 由父分类名称反查 id，找不到时为 `None`
    pub fn category_id<'a>(&self, categories: &'a [Category]) -> Option<&'a str> {
        categories
            .iter()
            .find(|c| c.name == self.category)
            .map(|c| c.id.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubCategoryDraft {
    pub name: String,
    pub description: String,
    /// 父分类 id
    pub category: String,
}

impl SubCategoryDraft {
    pub fn from_existing(sub: &SubCategory, categories: &[Category]) -> Self {
        Self {
            name: sub.name.clone(),
            description: sub.description.clone(),
            category: sub.category_id(categories).unwrap_or_default().to_string(),
        }
    }
}

// =========================================================
// 商品 (Products)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub product_sku: String,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub stock: u64,
    /// 子分类 id
    #[serde(default, deserialize_with = "sub_category_ref")]
    pub sub_category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_available: bool,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub product_image: Option<String>,
    #[serde(default, deserialize_with = "timestamp_lenient")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp_lenient")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `sub_category` 可能是 id，也可能是嵌套对象 `{id, name, ..}`
fn sub_category_ref<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Object(map)) => match map.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        },
        _ => String::new(),
    })
}

impl Product {
    /// 子分类名称，未找到时为 "N/A"
    pub fn sub_category_name<'a>(&self, subs: &'a [SubCategory]) -> &'a str {
        subs.iter()
            .find(|s| s.id == self.sub_category)
            .map(|s| s.name.as_str())
            .unwrap_or("N/A")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub product_sku: String,
    pub price: Decimal,
    pub stock: u64,
    pub sub_category: String,
    pub is_available: bool,
}

impl From<&Product> for ProductDraft {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            product_sku: p.product_sku.clone(),
            price: p.price,
            stock: p.stock,
            sub_category: p.sub_category.clone(),
            is_available: p.is_available,
        }
    }
}

// =========================================================
// 优惠券 (Coupons)
// =========================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    #[default]
    Percent,
    Fixed,
    #[serde(other)]
    Unknown,
}

impl DiscountType {
    pub const CHOICES: [DiscountType; 2] = [Self::Percent, Self::Fixed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percent => "percent",
            Self::Fixed => "fixed",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "percent" => Self::Percent,
            "fixed" => Self::Fixed,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Percent => "Percentage",
            Self::Fixed => "Fixed Amount",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub code: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub discount_type: DiscountType,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub value: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, deserialize_with = "timestamp_lenient")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp_lenient")]
    pub valid_to: Option<DateTime<Utc>>,
}

impl Coupon {
    /// 代码包含搜索词（忽略大小写）
    pub fn matches(&self, term: &str) -> bool {
        contains_ignore_case(&self.code, term)
    }
}

/// 按优惠码过滤，保持原有顺序
pub fn filter_coupons<'a>(coupons: &'a [Coupon], term: &str) -> Vec<&'a Coupon> {
    coupons.iter().filter(|c| c.matches(term)).collect()
}

/// 手动创建单张优惠券
///
/// 可选字段未填写时以 `null` 提交，日期格式为 `YYYY-MM-DD`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CouponDraft {
    pub code: String,
    pub description: String,
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub min_order_total: Option<Decimal>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub max_uses: Option<u64>,
    pub max_uses_per_user: Option<u64>,
}

/// 批量生成优惠券
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponBatch {
    pub count: u64,
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub max_uses: u64,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
}

impl Default for CouponBatch {
    fn default() -> Self {
        Self {
            count: 1,
            discount_type: DiscountType::Percent,
            value: Decimal::ZERO,
            max_uses: 1,
            valid_from: None,
            valid_to: None,
        }
    }
}

// =========================================================
// 表单输入解析
// =========================================================

/// 列表搜索：去掉首尾空白后忽略大小写匹配，空搜索词匹配一切
pub fn contains_ignore_case(haystack: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty() || haystack.to_lowercase().contains(&term)
}

/// 金额输入框：空白为 `None`
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    parse_decimal(&Value::String(raw.to_string()))
}

/// 数量输入框：空白、负数或非整数为 `None`
pub fn parse_count(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

/// 日期输入框（`<input type="date">` 的 `YYYY-MM-DD`）
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_decode_category_with_numeric_id() {
        let category: Category = serde_json::from_value(json!({
            "id": 3,
            "name": "Beverages",
            "description": null,
            "category_image": ""
        }))
        .unwrap();

        assert_eq!(category.id, "3");
        assert_eq!(category.name, "Beverages");
        assert!(category.description.is_empty());
        assert!(category.category_image.is_none());
    }

    #[test]
    fn test_sub_category_resolves_parent_id_by_name() {
        let categories = vec![
            Category {
                id: "1".to_string(),
                name: "Dairy".to_string(),
                ..Default::default()
            },
            Category {
                id: "2".to_string(),
                name: "Bakery".to_string(),
                ..Default::default()
            },
        ];
        let sub: SubCategory = serde_json::from_value(json!({
            "id": 9, "name": "Bread", "description": "Loaves", "category": "Bakery"
        }))
        .unwrap();

        assert_eq!(sub.category_id(&categories), Some("2"));
        let draft = SubCategoryDraft::from_existing(&sub, &categories);
        assert_eq!(draft.category, "2");
        assert_eq!(draft.name, "Bread");

        let orphan = SubCategory {
            category: "Frozen".to_string(),
            ..Default::default()
        };
        assert_eq!(orphan.category_id(&categories), None);
        assert!(SubCategoryDraft::from_existing(&orphan, &categories).category.is_empty());
    }

    #[test]
    fn test_product_sub_category_accepts_id_or_object() {
        let by_id: Product = serde_json::from_value(json!({
            "id": 1, "name": "Milk", "price": "12.50", "stock": 4, "sub_category": 7
        }))
        .unwrap();
        assert_eq!(by_id.sub_category, "7");
        assert_eq!(by_id.price, Decimal::from_str("12.50").unwrap());

        let nested: Product = serde_json::from_value(json!({
            "id": 2, "sub_category": {"id": 8, "name": "Yoghurt"}, "price": null
        }))
        .unwrap();
        assert_eq!(nested.sub_category, "8");
        assert_eq!(nested.price, Decimal::ZERO);
        assert_eq!(nested.stock, 0);

        let subs = vec![SubCategory {
            id: "7".to_string(),
            name: "Fresh Milk".to_string(),
            ..Default::default()
        }];
        assert_eq!(by_id.sub_category_name(&subs), "Fresh Milk");
        assert_eq!(nested.sub_category_name(&subs), "N/A");
    }

    #[test]
    fn test_product_draft_serializes_decimal_price() {
        let draft = ProductDraft {
            name: "Milk".to_string(),
            price: Decimal::from_str("12.50").unwrap(),
            stock: 3,
            sub_category: "7".to_string(),
            is_available: true,
            ..Default::default()
        };
        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["price"], json!("12.50"));
        assert_eq!(body["stock"], json!(3));
        assert_eq!(body["sub_category"], json!("7"));
        assert_eq!(body["is_available"], json!(true));
    }

    #[test]
    fn test_discount_type_is_lenient() {
        let coupon: Coupon = serde_json::from_value(json!({
            "code": "SAVE10", "discount_type": "fixed", "value": 10, "active": true,
            "valid_from": "2024-05-01", "valid_to": null
        }))
        .unwrap();
        assert_eq!(coupon.discount_type, DiscountType::Fixed);
        assert!(coupon.valid_from.is_some());
        assert!(coupon.valid_to.is_none());

        let odd: Coupon = serde_json::from_value(json!({"discount_type": "bogof"})).unwrap();
        assert_eq!(odd.discount_type, DiscountType::Unknown);
        assert_eq!(DiscountType::from_raw(" Percent "), DiscountType::Percent);
    }

    #[test]
    fn test_coupon_draft_sends_nulls_and_plain_dates() {
        let draft = CouponDraft {
            code: "WELCOME".to_string(),
            discount_type: DiscountType::Percent,
            value: Decimal::from(15),
            valid_from: parse_date("2024-06-01"),
            ..Default::default()
        };
        let body = serde_json::to_value(&draft).unwrap();

        assert_eq!(body["discount_type"], json!("percent"));
        assert_eq!(body["valid_from"], json!("2024-06-01"));
        assert_eq!(body["valid_to"], Value::Null);
        assert_eq!(body["max_uses"], Value::Null);
        assert_eq!(body["min_order_total"], Value::Null);
    }

    #[test]
    fn test_coupon_batch_defaults_to_single_use() {
        let batch = CouponBatch::default();
        assert_eq!(batch.count, 1);
        assert_eq!(batch.max_uses, 1);
    }

    #[test]
    fn test_filter_coupons_by_code() {
        let coupons = vec![
            Coupon {
                code: "SUMMER24".to_string(),
                ..Default::default()
            },
            Coupon {
                code: "WELCOME".to_string(),
                ..Default::default()
            },
        ];
        let hits: Vec<_> = filter_coupons(&coupons, "summ")
            .into_iter()
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(hits, vec!["SUMMER24"]);
        assert_eq!(filter_coupons(&coupons, "  ").len(), 2);
    }

    #[test]
    fn test_form_input_parsing() {
        assert_eq!(parse_amount(" 4.50 "), Some(Decimal::from_str("4.50").unwrap()));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("ten"), None);
        assert_eq!(parse_count("12"), Some(12));
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("1.5"), None);
        assert!(parse_date("2024-02-30").is_none());
        assert!(parse_date("2024-02-29").is_some());
    }
}
