//! 会话存储
//!
//! 会话是"当前是否已登录"的唯一来源，由路由守卫和网关共同持有（显式注入，无全局状态）。
//! 具体的键值后端通过 [`SessionStorage`] 抽象：浏览器中是 `sessionStorage`，测试中是内存表。

use crate::user::{Session, SessionUser};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

pub const KEY_ACCESS: &str = "access";
pub const KEY_REFRESH: &str = "refresh";
pub const KEY_USER: &str = "user";

// =========================================================
// 存储后端抽象
// =========================================================

/// 键值存储后端
///
/// 写入和删除返回是否成功；读取失败与键不存在同样返回 `None`。
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> bool;
    fn remove_item(&self, key: &str) -> bool;
}

/// 内存存储
///
/// 克隆共享同一张表，可用来模拟同一标签页内的"刷新"。
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> bool {
        self.items().insert(key.to_string(), value.to_string());
        true
    }

    fn remove_item(&self, key: &str) -> bool {
        self.items().remove(key);
        true
    }
}

// =========================================================
// 会话存储
// =========================================================

/// 会话存储
///
/// 克隆共享同一后端，网关清除会话后守卫立即可见。
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage + Send + Sync>,
}

impl SessionStore {
    pub fn new<S>(storage: S) -> Self
    where
        S: SessionStorage + Send + Sync + 'static,
    {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// 保存会话，覆盖已有会话
    pub fn set(&self, session: &Session) {
        let user = match serde_json::to_string(&session.user) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to encode session user");
                String::new()
            }
        };

        let ok = self.storage.set_item(KEY_ACCESS, &session.access_token)
            & self.storage.set_item(KEY_REFRESH, &session.refresh_token)
            & self.storage.set_item(KEY_USER, &user);
        if ok {
            debug!(user = %session.user.email, "session stored");
        } else {
            warn!("session storage rejected a write; session may not survive a reload");
        }
    }

    /// 读取当前会话
    ///
    /// 当且仅当存在非空的 access token 时返回 `Some`。不会 panic，也不会返回错误。
    pub fn get(&self) -> Option<Session> {
        let access_token = self
            .storage
            .get_item(KEY_ACCESS)
            .filter(|token| !token.is_empty())?;
        let refresh_token = self.storage.get_item(KEY_REFRESH).unwrap_or_default();
        let user = self
            .storage
            .get_item(KEY_USER)
            .and_then(|raw| match serde_json::from_str::<SessionUser>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "stored session user is unreadable");
                    None
                }
            })
            .unwrap_or_default();

        Some(Session {
            access_token,
            refresh_token,
            user,
        })
    }

    /// 是否存在会话（守卫的同步检查）
    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }

    /// 清除会话，可重复调用
    pub fn clear(&self) {
        for key in [KEY_ACCESS, KEY_REFRESH, KEY_USER] {
            self.storage.remove_item(key);
        }
        debug!("session cleared");
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("present", &self.is_present())
            .finish()
    }
}
