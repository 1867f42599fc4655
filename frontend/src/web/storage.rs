//! SessionStorage 封装模块
//!
//! 会话只在当前标签页内有效，关闭标签页即失效，因此使用 `window.sessionStorage`。

use martdesk_shared::SessionStorage;

/// 浏览器 `sessionStorage` 后端
///
/// 不持有任何 JS 对象，每次操作时重新获取，因此可以放进 Context。
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSessionStorage;

impl BrowserSessionStorage {
    /// 获取 SessionStorage 实例
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.session_storage().ok()?
    }
}

impl SessionStorage for BrowserSessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set_item(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn remove_item(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}
