//! 认证模块
//!
//! 管理用户认证状态，与路由系统解耦。
//! 会话存储是唯一的事实来源；这里的信号只是它的响应式镜像，
//! 路由服务通过注入的认证信号在登录/注销后调整当前页面。

use crate::api::MartDeskApi;
use leptos::prelude::*;
use martdesk_shared::{ApiResult, SessionUser};
use tracing::debug;

/// 认证上下文
///
/// 全部字段都是 `Copy` 的句柄，可以直接在闭包间传递。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// API 客户端
    pub api: StoredValue<MartDeskApi>,
    /// 是否已认证
    pub is_authenticated: RwSignal<bool>,
    /// 当前登录用户
    pub user: RwSignal<Option<SessionUser>>,
}

impl AuthContext {
    /// 创建认证上下文，并从会话存储恢复状态（同一标签页内刷新后仍保持登录）
    pub fn new(api: MartDeskApi) -> Self {
        let session = api.session().get();
        debug!(restored = session.is_some(), "auth context initialised");

        Self {
            is_authenticated: RwSignal::new(session.is_some()),
            user: RwSignal::new(session.map(|s| s.user)),
            api: StoredValue::new(api),
        }
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        self.is_authenticated.into()
    }

    /// 取出 API 客户端的克隆，供异步任务使用
    pub fn api(&self) -> MartDeskApi {
        self.api.get_value()
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 登录并写入会话
///
/// 成功后更新认证信号，路由服务会把登录页带到控制面板。
pub async fn login(ctx: &AuthContext, email: String, password: String) -> ApiResult<()> {
    let session = ctx.api().login(&email, &password).await?;

    ctx.user.set(Some(session.user));
    ctx.is_authenticated.set(true);
    Ok(())
}

/// 注销并清除状态
///
/// 导航将由路由服务的认证状态监听自动处理。
pub fn logout(ctx: &AuthContext) {
    ctx.api.with_value(|api| api.logout());
    ctx.user.set(None);
    ctx.is_authenticated.set(false);
}
