//! 路由定义与守卫 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、哪些路由需要认证，以及每次导航的守卫判定。

use crate::session::SessionStore;
use std::fmt::Display;
use tracing::debug;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppRoute {
    /// 登录页面
    #[default]
    Login,
    /// 根路径，已认证时转到控制面板
    Home,
    /// 控制面板 (需要认证)
    Dashboard,
    /// 订单管理 (需要认证)
    Orders,
    /// 用户管理 (需要认证)
    Users,
    /// 分类管理 (需要认证)
    Categories,
    /// 子分类管理 (需要认证)
    SubCategories,
    /// 商品管理 (需要认证)
    Products,
    /// 优惠券管理 (需要认证)
    Coupons,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举（忽略末尾斜杠）
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            "/login" => Self::Login,
            "/dashboard" => Self::Dashboard,
            "/orders" => Self::Orders,
            "/users" => Self::Users,
            "/categories" => Self::Categories,
            "/subcategories" => Self::SubCategories,
            "/products" => Self::Products,
            "/coupons" => Self::Coupons,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Home => "/",
            Self::Dashboard => "/dashboard",
            Self::Orders => "/orders",
            Self::Users => "/users",
            Self::Categories => "/categories",
            Self::SubCategories => "/subcategories",
            Self::Products => "/products",
            Self::Coupons => "/coupons",
            Self::NotFound => "/404",
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::NotFound)
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Home)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }

    /// 侧边栏中显示的标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign In",
            Self::Home | Self::Dashboard => "Dashboard",
            Self::Orders => "Orders",
            Self::Users => "Users",
            Self::Categories => "Categories",
            Self::SubCategories => "Sub Categories",
            Self::Products => "Products",
            Self::Coupons => "Coupons",
            Self::NotFound => "Not Found",
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// 守卫 (Route Guard)
// =========================================================

/// 每次导航的守卫状态：`Checking -> {Authenticated, Unauthenticated}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    #[default]
    Checking,
    Authenticated,
    Unauthenticated,
}

impl GuardState {
    /// 根据会话是否存在完成状态转移
    pub fn resolve(session_present: bool) -> Self {
        if session_present {
            Self::Authenticated
        } else {
            Self::Unauthenticated
        }
    }
}

/// 守卫判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// 渲染目标路由
    Render(AppRoute),
    /// 重定向，原目标被丢弃（不做"登录后返回"）
    Redirect(AppRoute),
}

impl GuardDecision {
    /// 最终落地的路由
    pub fn route(&self) -> AppRoute {
        match self {
            Self::Render(route) | Self::Redirect(route) => *route,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

/// 纯函数形式的守卫判定
pub fn decide(target: AppRoute, state: GuardState) -> GuardDecision {
    let authenticated = state == GuardState::Authenticated;

    if target.requires_auth() && !authenticated {
        return GuardDecision::Redirect(AppRoute::auth_failure_redirect());
    }
    if target.should_redirect_when_authenticated() && authenticated {
        return GuardDecision::Redirect(AppRoute::auth_success_redirect());
    }
    GuardDecision::Render(target)
}

/// 路由守卫
///
/// 只检查本地会话是否存在，不向服务端验证 token；
/// 过期但仍在本地的 token 会通过守卫，在第一次请求时由网关发现。
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionStore,
}

impl RouteGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// 同步读取会话，完成 `Checking` 状态
    pub fn state(&self) -> GuardState {
        GuardState::resolve(self.session.is_present())
    }

    pub fn check(&self, target: AppRoute) -> GuardDecision {
        let decision = decide(target, self.state());
        if decision.is_redirect() {
            debug!(target = %target, redirect = %decision.route(), "navigation redirected by guard");
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;
    use crate::user::Session;

    const PROTECTED: [AppRoute; 8] = [
        AppRoute::Home,
        AppRoute::Dashboard,
        AppRoute::Orders,
        AppRoute::Users,
        AppRoute::Categories,
        AppRoute::SubCategories,
        AppRoute::Products,
        AppRoute::Coupons,
    ];

    fn guard_with_session(present: bool) -> RouteGuard {
        let store = SessionStore::new(MemoryStorage::new());
        if present {
            store.set(&Session {
                access_token: "stale-but-present".to_string(),
                ..Default::default()
            });
        }
        RouteGuard::new(store)
    }

    #[test]
    fn test_from_path_round_trips_known_routes() {
        for route in PROTECTED.into_iter().skip(1).chain([AppRoute::Login]) {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
        assert_eq!(AppRoute::from_path("/"), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/orders/"), AppRoute::Orders);
        assert_eq!(AppRoute::from_path("/subcategories/"), AppRoute::SubCategories);
        assert_eq!(AppRoute::from_path("/reports"), AppRoute::NotFound);
    }

    #[test]
    fn test_no_session_redirects_every_protected_route_to_login() {
        let guard = guard_with_session(false);
        assert_eq!(guard.state(), GuardState::Unauthenticated);
        for route in PROTECTED {
            assert_eq!(guard.check(route), GuardDecision::Redirect(AppRoute::Login));
        }
    }

    #[test]
    fn test_session_renders_protected_routes() {
        let guard = guard_with_session(true);
        assert_eq!(guard.state(), GuardState::Authenticated);
        for route in PROTECTED.into_iter().skip(1) {
            assert_eq!(guard.check(route), GuardDecision::Render(route));
        }
    }

    #[test]
    fn test_root_and_login_forward_to_dashboard_when_authenticated() {
        let guard = guard_with_session(true);
        assert_eq!(
            guard.check(AppRoute::Home),
            GuardDecision::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(
            guard.check(AppRoute::Login),
            GuardDecision::Redirect(AppRoute::Dashboard)
        );
    }

    #[test]
    fn test_public_routes_render_without_session() {
        let guard = guard_with_session(false);
        assert_eq!(guard.check(AppRoute::Login), GuardDecision::Render(AppRoute::Login));
        assert_eq!(
            guard.check(AppRoute::NotFound),
            GuardDecision::Render(AppRoute::NotFound)
        );
    }

    #[test]
    fn test_guard_sees_session_cleared_elsewhere() {
        let store = SessionStore::new(MemoryStorage::new());
        store.set(&Session {
            access_token: "t".to_string(),
            ..Default::default()
        });
        let guard = RouteGuard::new(store.clone());
        assert_eq!(guard.check(AppRoute::Orders), GuardDecision::Render(AppRoute::Orders));

        store.clear();
        assert_eq!(guard.check(AppRoute::Orders), GuardDecision::Redirect(AppRoute::Login));
    }

    #[test]
    fn test_checking_state_is_treated_as_unauthenticated() {
        assert_eq!(
            decide(AppRoute::Dashboard, GuardState::Checking),
            GuardDecision::Redirect(AppRoute::Login)
        );
    }
}
