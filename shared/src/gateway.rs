//! 网关客户端
//!
//! 所有后端请求的唯一出口：
//! - 发送前：存在会话时附加 `Authorization: Bearer <access>`
//! - 收到 401：无条件清除会话、跳转登录页，并仍然把错误返回给调用方
//! - 其他失败原样交给调用方处理，不重试、不刷新 token

use crate::error::{ApiError, ApiResult, TransportError};
use crate::protocol::{ApiRequest, HttpMethod, ShapePolicy};
use crate::session::SessionStore;
use crate::user::{Credentials, Session};
use crate::{CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 解析响应体；空响应体视为 `null`
    pub fn json_value(&self) -> ApiResult<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|e| ApiError::decode(e.to_string()))
    }
}

/// HTTP 传输层
/// (?Send) 是因为浏览器 fetch 的 Future 不是 Send 的
#[async_trait::async_trait(?Send)]
pub trait Transport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// 会话失效后的强制跳转
pub trait Navigator {
    /// 硬跳转到登录页
    fn redirect_to_login(&self);
}

// =========================================================
// 网关客户端
// =========================================================

#[derive(Clone)]
pub struct GatewayClient<T, N> {
    base_url: String,
    session: SessionStore,
    transport: T,
    navigator: N,
    policy: ShapePolicy,
}

impl<T: Transport, N: Navigator> GatewayClient<T, N> {
    pub fn new(base_url: impl Into<String>, session: SessionStore, transport: T, navigator: N) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            session,
            transport,
            navigator,
            policy: ShapePolicy::default(),
        }
    }

    /// 指定集合响应形状不符时的处理策略
    pub fn with_shape_policy(mut self, policy: ShapePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送原始请求，经过凭据附加与 401 处理
    pub async fn dispatch(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let mut req = req.with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON);

        let session = self.session.get();
        if let Some(session) = &session {
            req = req.with_header(
                HEADER_AUTHORIZATION,
                &format!("Bearer {}", session.access_token),
            );
        }

        let method = req.method.as_str();
        let url = req.url.clone();
        debug!(method, url = %url, authenticated = session.is_some(), "dispatching request");

        let resp = match self.transport.send(req).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(method, url = %url, error = %e, "request failed before a response arrived");
                return Err(ApiError::from(e));
            }
        };

        if resp.status == 401 {
            info!(method, url = %url, "session rejected by server, signing out");
            self.session.clear();
            self.navigator.redirect_to_login();
            return Err(ApiError::from_status(resp.status, &resp.body));
        }

        if !resp.is_success() {
            let err = ApiError::from_status(resp.status, &resp.body);
            warn!(method, url = %url, status = resp.status, error = %err, "request rejected");
            return Err(err);
        }

        Ok(resp)
    }

    /// 发送强类型请求并解码响应
    pub async fn call<R: ApiRequest>(&self, request: &R) -> ApiResult<R::Response> {
        let mut req = HttpRequest::new(&self.url(&request.path()), R::METHOD);
        if let Some(body) = request.body().map_err(|e| ApiError::encode(e.to_string()))? {
            req = req.with_body(body);
        }

        let resp = self.dispatch(req).await?;
        R::decode(resp.json_value()?, self.policy)
    }

    /// 登录：换取 token 并写入会话存储
    pub async fn authenticate(&self, email: &str, password: &str) -> ApiResult<Session> {
        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let session = Session::from(self.call(&credentials).await?);
        if session.access_token.is_empty() {
            return Err(ApiError::decode("token response did not contain an access token"));
        }

        self.session.set(&session);
        info!(user = %session.user.email, "signed in");
        Ok(session)
    }

    /// 主动注销
    pub fn sign_out(&self) {
        self.session.clear();
        info!("signed out");
    }
}

// =========================================================
// 测试工具: MockTransport / CountingNavigator
// =========================================================

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    pub struct MockTransport {
        // (Method, URL) -> (Status, Response Body)
        responses: RefCell<HashMap<(String, String), (u16, String)>>,
        // 记录发出的请求
        pub requests: RefCell<Vec<HttpRequest>>,
        offline: Cell<bool>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                responses: RefCell::new(HashMap::new()),
                requests: RefCell::new(Vec::new()),
                offline: Cell::new(false),
            }
        }

        pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: Value) {
            let body = if body.is_null() {
                String::new()
            } else {
                body.to_string()
            };
            self.responses
                .borrow_mut()
                .insert((method.as_str().to_string(), url.to_string()), (status, body));
        }

        pub fn go_offline(&self) {
            self.offline.set(true);
        }
    }

    #[async_trait::async_trait(?Send)]
    impl Transport for Rc<MockTransport> {
        async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.borrow_mut().push(req.clone());

            if self.offline.get() {
                return Err(TransportError::NetworkError("offline".to_string()));
            }

            let key = (req.method.as_str().to_string(), req.url.clone());
            match self.responses.borrow().get(&key) {
                Some((status, body)) => Ok(HttpResponse {
                    status: *status,
                    body: body.clone(),
                }),
                None => Ok(HttpResponse {
                    status: 404,
                    body: r#"{"detail": "Not found."}"#.to_string(),
                }),
            }
        }
    }

    /// 记录跳转次数
    #[derive(Clone, Default)]
    pub struct CountingNavigator {
        pub redirects: Rc<Cell<usize>>,
    }

    impl Navigator for CountingNavigator {
        fn redirect_to_login(&self) {
            self.redirects.set(self.redirects.get() + 1);
        }
    }
}
