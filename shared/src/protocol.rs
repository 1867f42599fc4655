use crate::catalog::{
    Category, CategoryDraft, Coupon, CouponBatch, CouponDraft, Product, ProductDraft, SubCategory,
    SubCategoryDraft,
};
use crate::error::{ApiError, ApiResult, ShapeError};
use crate::order::Order;
use crate::query::QueryKey;
use crate::user::{Credentials, Customer, ModeratorDraft, TokenResponse, UserAnalytics};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use tracing::warn;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

// =========================================================
// 响应形状归一化 (Shape Normalization)
// =========================================================

/// 集合响应形状不符合预期时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapePolicy {
    /// 直接报错（开发与测试）
    Strict,
    /// 记录警告并退化为空集合，跳过无法解码的元素（生产环境）
    Lenient,
}

impl Default for ShapePolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            ShapePolicy::Strict
        } else {
            ShapePolicy::Lenient
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object without a data/results array",
    }
}

/// 将集合响应归一化为 `Vec<T>`
///
/// 接受三种形状：裸数组、`{data: [..]}`、`{results: [..]}`（分页）。
pub fn normalize_collection<T: DeserializeOwned>(
    value: Value,
    policy: ShapePolicy,
) -> Result<Vec<T>, ShapeError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match (map.remove("data"), map.remove("results")) {
            (Some(Value::Array(items)), _) | (_, Some(Value::Array(items))) => items,
            _ => return shape_mismatch(ShapeError::NotACollection(describe(&Value::Object(map))), policy),
        },
        other => return shape_mismatch(ShapeError::NotACollection(describe(&other)), policy),
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(decoded) => out.push(decoded),
            Err(e) => {
                let err = ShapeError::BadElement {
                    index,
                    reason: e.to_string(),
                };
                match policy {
                    ShapePolicy::Strict => return Err(err),
                    ShapePolicy::Lenient => warn!(error = %err, "skipping undecodable element"),
                }
            }
        }
    }
    Ok(out)
}

fn shape_mismatch<T>(err: ShapeError, policy: ShapePolicy) -> Result<Vec<T>, ShapeError> {
    match policy {
        ShapePolicy::Strict => Err(err),
        ShapePolicy::Lenient => {
            warn!(error = %err, "unexpected collection shape, treating as empty");
            Ok(Vec::new())
        }
    }
}

/// 单个对象响应：接受 `{data: {...}}` 或裸对象
pub fn unwrap_data<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    let inner = match value {
        Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(inner).map_err(|e| ApiError::decode(e.to_string()))
}

// =========================================================
// Request Definitions
// =========================================================

/// 接口定义：方法、路径、请求体以及响应的解码方式
pub trait ApiRequest {
    /// The response type returned by this request.
    type Response;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// 相对于 API 根地址的路径
    fn path(&self) -> String;

    /// JSON 请求体，默认无
    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        Ok(None)
    }

    /// 成功后需要失效的查询
    fn invalidates(&self) -> Vec<QueryKey> {
        Vec::new()
    }

    /// 将响应 JSON 解码为响应类型（空响应体为 `Value::Null`）
    fn decode(value: Value, policy: ShapePolicy) -> ApiResult<Self::Response>;
}

/// 订单列表
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOrdersRequest;

impl ApiRequest for ListOrdersRequest {
    type Response = Vec<Order>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/v1/list/".to_string()
    }

    fn decode(value: Value, policy: ShapePolicy) -> ApiResult<Self::Response> {
        Ok(normalize_collection(value, policy)?)
    }
}

/// 订单详情
#[derive(Debug, Clone)]
pub struct OrderDetailRequest {
    pub order_id: String,
}

impl ApiRequest for OrderDetailRequest {
    type Response = Order;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/v1/{}/", self.order_id)
    }

    fn decode(value: Value, _policy: ShapePolicy) -> ApiResult<Self::Response> {
        unwrap_data(value)
    }
}

/// 批准订单
#[derive(Debug, Clone)]
pub struct ApproveOrderRequest {
    pub order_id: String,
}

impl ApiRequest for ApproveOrderRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("/v1/{}/approve/", self.order_id)
    }

    fn invalidates(&self) -> Vec<QueryKey> {
        vec![QueryKey::Orders, QueryKey::Order(self.order_id.clone())]
    }

    fn decode(_value: Value, _policy: ShapePolicy) -> ApiResult<Self::Response> {
        Ok(())
    }
}

/// 取消订单
#[derive(Debug, Clone)]
pub struct CancelOrderRequest {
    pub order_id: String,
}

impl ApiRequest for CancelOrderRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Patch;

    fn path(&self) -> String {
        format!("/v1/{}/cancel/", self.order_id)
    }

    fn invalidates(&self) -> Vec<QueryKey> {
        vec![QueryKey::Orders, QueryKey::Order(self.order_id.clone())]
    }

    fn decode(_value: Value, _policy: ShapePolicy) -> ApiResult<Self::Response> {
        Ok(())
    }
}

/// 登录，换取 JWT
impl ApiRequest for Credentials {
    type Response = TokenResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/auth/jwt/create/".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        serde_json::to_string(self).map(Some)
    }

    fn decode(value: Value, _policy: ShapePolicy) -> ApiResult<Self::Response> {
        unwrap_data(value)
    }
}

/// 用户列表
#[derive(Debug, Clone, Copy, Default)]
pub struct ListCustomersRequest;

impl ApiRequest for ListCustomersRequest {
    type Response = Vec<Customer>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/auth/users/all/".to_string()
    }

    fn decode(value: Value, policy: ShapePolicy) -> ApiResult<Self::Response> {
        Ok(normalize_collection(value, policy)?)
    }
}

/// 用户统计
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAnalyticsRequest;

impl ApiRequest for UserAnalyticsRequest {
    type Response = UserAnalytics;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/auth/admin/analytics/users/".to_string()
    }

    fn decode(value: Value, _policy: ShapePolicy) -> ApiResult<Self::Response> {
        unwrap_data(value)
    }
}

/// 创建协管员
impl ApiRequest for ModeratorDraft {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/auth/create-moderator/".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        serde_json::to_string(self).map(Some)
    }

    fn invalidates(&self) -> Vec<QueryKey> {
        vec![QueryKey::Customers, QueryKey::UserAnalytics]
    }

    fn decode(_value: Value, _policy: ShapePolicy) -> ApiResult<Self::Response> {
        Ok(())
    }
}

// =========================================================
// 目录资源 (Catalog Resources)
// =========================================================

/// 标准 REST 集合：`GET`/`POST` 集合路径，`PUT`/`DELETE` `{集合路径}{id}/`
pub trait Resource {
    /// 列表中的一条记录
    type Item: DeserializeOwned;
    /// 新建与修改时提交的请求体
    type Draft: Serialize;
    /// 集合路径，以 `/` 结尾
    const COLLECTION: &'static str;

    fn list_key() -> QueryKey;

    /// 任一写操作成功后需要失效的查询
    fn affected() -> Vec<QueryKey> {
        vec![Self::list_key()]
    }

    fn item_path(id: &str) -> String {
        format!("{}{}/", Self::COLLECTION, id)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Categories;

impl Resource for Categories {
    type Item = Category;
    type Draft = CategoryDraft;
    const COLLECTION: &'static str = "/categories/";

    fn list_key() -> QueryKey {
        QueryKey::Categories
    }

    /// 子分类列表显示父分类名称
    fn affected() -> Vec<QueryKey> {
        vec![QueryKey::Categories, QueryKey::SubCategories]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubCategories;

impl Resource for SubCategories {
    type Item = SubCategory;
    type Draft = SubCategoryDraft;
    const COLLECTION: &'static str = "/subcategories/";

    fn list_key() -> QueryKey {
        QueryKey::SubCategories
    }

    /// 删除子分类可能级联删除其下商品
    fn affected() -> Vec<QueryKey> {
        vec![QueryKey::SubCategories, QueryKey::Products]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Products;

impl Resource for Products {
    type Item = Product;
    type Draft = ProductDraft;
    const COLLECTION: &'static str = "/products/";

    fn list_key() -> QueryKey {
        QueryKey::Products
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Coupons;

impl Resource for Coupons {
    type Item = Coupon;
    type Draft = CouponDraft;
    const COLLECTION: &'static str = "/v1/coupons/";

    fn list_key() -> QueryKey {
        QueryKey::Coupons
    }
}

/// 集合列表
pub struct ListRequest<R>(PhantomData<R>);

impl<R> ListRequest<R> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<R> Default for ListRequest<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ApiRequest for ListRequest<R> {
    type Response = Vec<R::Item>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        R::COLLECTION.to_string()
    }

    fn decode(value: Value, policy: ShapePolicy) -> ApiResult<Self::Response> {
        Ok(normalize_collection(value, policy)?)
    }
}

/// 新建记录
pub struct CreateRequest<R: Resource> {
    pub draft: R::Draft,
}

impl<R: Resource> ApiRequest for CreateRequest<R> {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        R::COLLECTION.to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        serde_json::to_string(&self.draft).map(Some)
    }

    fn invalidates(&self) -> Vec<QueryKey> {
        R::affected()
    }

    fn decode(_value: Value, _policy: ShapePolicy) -> ApiResult<Self::Response> {
        Ok(())
    }
}

/// 整体替换一条记录
pub struct UpdateRequest<R: Resource> {
    pub id: String,
    pub draft: R::Draft,
}

impl<R: Resource> ApiRequest for UpdateRequest<R> {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        R::item_path(&self.id)
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        serde_json::to_string(&self.draft).map(Some)
    }

    fn invalidates(&self) -> Vec<QueryKey> {
        R::affected()
    }

    fn decode(_value: Value, _policy: ShapePolicy) -> ApiResult<Self::Response> {
        Ok(())
    }
}

/// 删除一条记录
pub struct DeleteRequest<R> {
    pub id: String,
    resource: PhantomData<R>,
}

impl<R> DeleteRequest<R> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource: PhantomData,
        }
    }
}

impl<R: Resource> ApiRequest for DeleteRequest<R> {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        R::item_path(&self.id)
    }

    fn invalidates(&self) -> Vec<QueryKey> {
        R::affected()
    }

    fn decode(_value: Value, _policy: ShapePolicy) -> ApiResult<Self::Response> {
        Ok(())
    }
}

/// 批量生成优惠券
impl ApiRequest for CouponBatch {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/v1/generate/coupons/".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        serde_json::to_string(self).map(Some)
    }

    fn invalidates(&self) -> Vec<QueryKey> {
        Coupons::affected()
    }

    fn decode(_value: Value, _policy: ShapePolicy) -> ApiResult<Self::Response> {
        Ok(())
    }
}
