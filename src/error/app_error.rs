use serde::Serialize;
use thiserror::Error;

/// 上游行情数据源错误
///
/// 这是 `get_or_set` 唯一会向调用方传播的错误类别，
/// 每个变体对应一个不同的对外结果（见 [`UpstreamError::to_response`]）。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// 连接失败或请求超时
    #[error("上游服务不可用: {0}")]
    ServiceUnavailable(String),

    /// 请求频率超限 (HTTP 429)
    #[error("上游请求频率超限")]
    RateLimited,

    /// 其他 4xx
    #[error("上游请求错误 {status}: {message}")]
    Client { status: u16, message: String },

    /// 5xx
    #[error("上游服务错误 {status}: {message}")]
    Server { status: u16, message: String },

    /// 响应体无法解析
    #[error("上游响应解析失败: {0}")]
    Decode(String),

    #[error("No volume data available for {coin_id}")]
    NoVolumeData { coin_id: String },
}

impl UpstreamError {
    /// 按 HTTP 状态码归类
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => UpstreamError::RateLimited,
            400..=499 => UpstreamError::Client { status, message },
            _ => UpstreamError::Server { status, message },
        }
    }

    /// 映射为对外可见的错误响应
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            UpstreamError::ServiceUnavailable(_) => ErrorResponse::new(
                503,
                "Service unavailable",
                "Unable to connect to external services",
            ),
            UpstreamError::RateLimited => ErrorResponse::new(
                429,
                "Rate limit exceeded",
                "API rate limit exceeded, please try again later",
            ),
            UpstreamError::Client { status, message } => {
                let message = if message.is_empty() {
                    "Bad request"
                } else {
                    message.as_str()
                };
                ErrorResponse::new(*status, "Client error", message)
            }
            UpstreamError::Server { .. } | UpstreamError::Decode(_) => {
                ErrorResponse::new(500, "Internal server error", "Something went wrong")
            }
            UpstreamError::NoVolumeData { .. } => {
                ErrorResponse::new(500, "Internal server error", &self.to_string())
            }
        }
    }
}

/// 对外错误响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: u16, error: &str, message: &str) -> Self {
        Self {
            status,
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

/// 应用错误
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// 缓存服务不可用（仅运维接口使用，正常读写路径不会产生该错误）
    #[error("缓存服务不可用")]
    CacheUnavailable,

    #[error("缓存错误: {0}")]
    CacheError(String),

    #[error("序列化错误: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// 请求参数错误
    #[error("参数错误: {0}")]
    BadRequest(String),
}

impl AppError {
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            AppError::Upstream(e) => e.to_response(),
            AppError::CacheUnavailable => {
                ErrorResponse::new(503, "Cache service not available", &self.to_string())
            }
            AppError::BadRequest(msg) => ErrorResponse::new(400, "Bad request", msg),
            other => ErrorResponse::new(500, "Internal server error", &other.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
