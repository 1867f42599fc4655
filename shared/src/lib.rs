//! MartDesk 共享核心
//!
//! 不依赖 DOM 的纯 Rust 部分，前端和测试共用：
//! - `order` / `user` / `catalog`: 领域模型（宽松解码）
//! - `protocol`: 接口定义与响应形状归一化
//! - `session`: 会话存储
//! - `gateway`: 统一请求出口（附加凭据、处理 401）
//! - `route`: 路由定义与守卫
//! - `metrics`: 仪表盘指标聚合

pub mod catalog;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod order;
pub mod protocol;
pub mod query;
pub mod route;
pub mod serde_helper;
pub mod session;
pub mod user;

pub use error::{ApiError, ApiErrorKind, ApiResult, ShapeError, TransportError};
pub use gateway::{GatewayClient, HttpRequest, HttpResponse, Navigator, Transport};
pub use metrics::DashboardMetrics;
pub use order::{Order, OrderItem, OrderStatus, PaymentStatus};
pub use protocol::{ApiRequest, HttpMethod, Resource, ShapePolicy};
pub use query::QueryKey;
pub use route::{AppRoute, GuardDecision, GuardState, RouteGuard};
pub use session::{MemoryStorage, SessionStorage, SessionStore};
pub use user::{Customer, ModeratorDraft, Session, SessionUser, UserAnalytics};

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";
