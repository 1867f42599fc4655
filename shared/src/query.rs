//! 查询缓存键
//!
//! 每个读取请求对应一个键；写操作成功后返回需要失效的键，
//! 前端据此重新拉取完整数据，而不是就地修改缓存。

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKey {
    /// 订单列表
    Orders,
    /// 单个订单详情
    Order(String),
    /// 用户列表
    Customers,
    /// 用户统计
    UserAnalytics,
    /// 分类列表
    Categories,
    /// 子分类列表
    SubCategories,
    /// 商品列表
    Products,
    /// 优惠券列表
    Coupons,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orders => write!(f, "orders"),
            Self::Order(id) => write!(f, "order:{}", id),
            Self::Customers => write!(f, "customers"),
            Self::UserAnalytics => write!(f, "users"),
            Self::Categories => write!(f, "categories"),
            Self::SubCategories => write!(f, "subcategories"),
            Self::Products => write!(f, "products"),
            Self::Coupons => write!(f, "coupons"),
        }
    }
}
