use serde_json::Value;
use thiserror::Error;

// =========================================================
// 错误分类
// =========================================================

/// 请求失败的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 401: 会话失效，已清除会话并跳转登录页
    Unauthorized,
    /// 其他 4xx: 请求被后端拒绝（参数校验等）
    Validation { status: u16 },
    /// 5xx 及其他非 2xx 状态
    Server { status: u16 },
    /// 网络层失败（离线、DNS、CORS 等）
    Network,
    /// 请求体序列化失败
    Encode,
    /// 响应体无法解码为期望类型
    Decode,
    /// 集合响应的外层结构无法识别
    Shape,
}

impl ApiErrorKind {
    /// 从非 2xx 状态码推导错误类别
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            400..=499 => Self::Validation { status },
            _ => Self::Server { status },
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Validation { status } | Self::Server { status } => Some(*status),
            Self::Network | Self::Encode | Self::Decode | Self::Shape => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Validation { .. } => "REQUEST_REJECTED",
            Self::Server { .. } => "SERVER_ERROR",
            Self::Network => "NETWORK_ERROR",
            Self::Encode => "ENCODE_ERROR",
            Self::Decode => "DECODE_ERROR",
            Self::Shape => "UNEXPECTED_SHAPE",
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 网关返回给调用方的错误
///
/// `message` 优先取自后端响应体中的 `error` / `message` / `detail` 字段，
/// 可以直接展示给用户。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{}] {}", .kind.error_code(), .message)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Encode, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    /// 根据非 2xx 响应构造错误
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_server_message(body)
            .unwrap_or_else(|| format!("request failed with status {}", status));
        Self::new(ApiErrorKind::from_status(status), message)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    pub fn status_code(&self) -> Option<u16> {
        self.kind.status_code()
    }

    /// 给用户看的消息（不带错误代码前缀）
    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// 从错误响应体中提取后端给出的提示
fn extract_server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message", "detail"]
        .iter()
        .find_map(|field| match value.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        })
}

// =========================================================
// 其他错误
// =========================================================

/// 集合响应不是数组、`{data: [..]}` 或 `{results: [..]}` 之一
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("expected a collection, got {0}")]
    NotACollection(&'static str),
    #[error("element {index} could not be decoded: {reason}")]
    BadElement { index: usize, reason: String },
}

impl From<ShapeError> for ApiError {
    fn from(e: ShapeError) -> Self {
        ApiError::new(ApiErrorKind::Shape, e.to_string())
    }
}

/// 传输层错误（请求未得到任何 HTTP 响应）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("failed to build request: {0}")]
    RequestBuildFailed(String),
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("failed to read response: {0}")]
    ResponseParseFailed(String),
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        ApiError::network(e.to_string())
    }
}
