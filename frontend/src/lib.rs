//! MartDesk 后台管理前端
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::router`: 路由服务（核心引擎），守卫逻辑在共享层的 `RouteGuard`
//! - `auth`: 认证状态管理（会话存储的响应式镜像）
//! - `query`: 查询与失效
//! - `mutation`: 写操作（提示 + 失效）
//! - `components`: UI 组件层

mod api;
mod auth;
pub mod config;
mod format;
pub mod logging;
mod mutation;
mod query;
mod components {
    pub mod categories;
    pub mod coupons;
    pub mod dashboard;
    pub mod dialog;
    pub mod layout;
    pub mod login;
    pub mod orders;
    pub mod products;
    pub mod subcategories;
    pub mod table;
    pub mod tags;
    pub mod toast;
    pub mod users;
}

// 原生 Web API 封装模块
pub(crate) mod web;

use crate::api::MartDeskApi;
use crate::auth::AuthContext;
use crate::components::categories::CategoriesPage;
use crate::components::coupons::CouponsPage;
use crate::components::dashboard::DashboardPage;
use crate::components::layout::Shell;
use crate::components::login::LoginPage;
use crate::components::orders::OrdersPage;
use crate::components::products::ProductsPage;
use crate::components::subcategories::SubCategoriesPage;
use crate::components::toast::{ToastContext, ToastHost};
use crate::components::users::UsersPage;
use crate::config::AppConfig;
use crate::query::QueryClient;

use leptos::prelude::*;
use martdesk_shared::{AppRoute, RouteGuard};
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。受保护的路由已经过守卫。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Home | AppRoute::Dashboard => view! { <Shell><DashboardPage /></Shell> }.into_any(),
        AppRoute::Orders => view! { <Shell><OrdersPage /></Shell> }.into_any(),
        AppRoute::Products => view! { <Shell><ProductsPage /></Shell> }.into_any(),
        AppRoute::Categories => view! { <Shell><CategoriesPage /></Shell> }.into_any(),
        AppRoute::SubCategories => view! { <Shell><SubCategoriesPage /></Shell> }.into_any(),
        AppRoute::Coupons => view! { <Shell><CouponsPage /></Shell> }.into_any(),
        AppRoute::Users => view! { <Shell><UsersPage /></Shell> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App(config: AppConfig) -> impl IntoView {
    // 1. 创建认证上下文（从会话存储恢复）
    let api = MartDeskApi::new(&config);
    let guard = RouteGuard::new(api.session().clone());
    let auth_ctx = AuthContext::new(api);
    provide_context(auth_ctx);

    // 2. 查询失效与提示消息
    provide_context(QueryClient::new());
    provide_context(ToastContext::new());

    // 3. 获取认证状态信号，用于注入路由服务
    let is_authenticated = auth_ctx.is_authenticated_signal();

    view! {
        <ToastHost />
        // 4. 路由器组件：注入守卫和认证信号
        <Router guard=guard is_authenticated=is_authenticated>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
