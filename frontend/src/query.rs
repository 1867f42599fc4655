//! 查询与失效
//!
//! 每个查询键对应一个递增的 epoch。写操作成功后对返回的键执行 `invalidate`，
//! 依赖这些键的查询会重新拉取完整数据。

use leptos::prelude::*;
use leptos::task::spawn_local;
use martdesk_shared::{ApiError, ApiResult, QueryKey};
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, warn};

/// 查询失效中心，通过 Context 共享
#[derive(Clone, Copy)]
pub struct QueryClient {
    epochs: RwSignal<HashMap<QueryKey, u64>>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self {
            epochs: RwSignal::new(HashMap::new()),
        }
    }

    /// 某个键当前的 epoch（响应式读取）
    pub fn epoch(&self, key: &QueryKey) -> u64 {
        self.epochs.with(|map| map.get(key).copied().unwrap_or_default())
    }

    /// 只在该键失效时才通知订阅者
    pub fn watch(&self, key: QueryKey) -> Memo<u64> {
        let client = *self;
        Memo::new(move |_| client.epoch(&key))
    }

    pub fn invalidate(&self, keys: &[QueryKey]) {
        if keys.is_empty() {
            return;
        }
        debug!(keys = ?keys, "invalidating queries");
        self.epochs.update(|map| {
            for key in keys {
                *map.entry(key.clone()).or_default() += 1;
            }
        });
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_query_client() -> QueryClient {
    use_context::<QueryClient>().expect("QueryClient should be provided")
}

/// 一次查询的响应式状态
pub struct QueryState<T: Send + Sync + 'static> {
    pub data: RwSignal<Option<T>>,
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<ApiError>>,
}

impl<T: Send + Sync + 'static> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for QueryState<T> {}

/// 注册一个查询：挂载时拉取一次，之后每次键失效时重新拉取
///
/// 只有最后一次发出的请求能写回结果，较早返回的旧请求会被丢弃。
pub fn use_query<T, F, Fut>(key: QueryKey, fetch: F) -> QueryState<T>
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = ApiResult<T>> + 'static,
{
    let client = use_query_client();
    let epoch = client.watch(key.clone());

    let state = QueryState {
        data: RwSignal::new(None),
        loading: RwSignal::new(true),
        error: RwSignal::new(None),
    };
    let generation = StoredValue::new(0u64);

    Effect::new(move |_| {
        epoch.track();
        let ticket = generation.get_value() + 1;
        generation.set_value(ticket);

        state.loading.set(true);
        let key = key.clone();
        let pending = fetch();
        spawn_local(async move {
            let result = pending.await;
            if generation.try_get_value() != Some(ticket) {
                debug!(key = %key, "discarding stale response");
                return;
            }
            match result {
                Ok(data) => {
                    state.data.set(Some(data));
                    state.error.set(None);
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "query failed");
                    state.error.set(Some(e));
                }
            }
            state.loading.set(false);
        });
    });

    state
}
