//! 写操作
//!
//! 成功：提示 + 失效返回的查询键；失败：提示后端给出的消息，表单内容保持不变。

use crate::components::toast::{ToastContext, use_toast};
use crate::query::{QueryClient, use_query_client};
use leptos::prelude::*;
use leptos::task::spawn_local;
use martdesk_shared::{ApiResult, QueryKey};
use std::future::Future;
use tracing::warn;

#[derive(Clone, Copy)]
pub struct Mutations {
    toast: ToastContext,
    queries: QueryClient,
}

/// 在组件初始化时获取，事件回调中直接使用
pub fn use_mutations() -> Mutations {
    Mutations {
        toast: use_toast(),
        queries: use_query_client(),
    }
}

impl Mutations {
    /// 表单内容不完整，不发请求
    pub fn reject(&self, message: &'static str) {
        self.toast.error(message);
    }

    /// `busy` 在请求期间为 `true`；`on_success` 在失效之后执行
    pub fn run<Fut, F>(
        &self,
        pending: Fut,
        done_message: &'static str,
        busy: RwSignal<bool>,
        on_success: F,
    ) where
        Fut: Future<Output = ApiResult<Vec<QueryKey>>> + 'static,
        F: FnOnce() + 'static,
    {
        let Mutations { toast, queries } = *self;
        busy.set(true);
        spawn_local(async move {
            match pending.await {
                Ok(keys) => {
                    toast.success(done_message);
                    queries.invalidate(&keys);
                    on_success();
                }
                Err(e) => {
                    warn!(error = %e, "mutation failed");
                    toast.error(e.message().to_string());
                }
            }
            busy.set(false);
        });
    }
}
