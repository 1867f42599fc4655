//! 应用配置
//!
//! 静态站点没有运行时环境变量，配置在编译期通过 `option_env!` 读取，缺失时使用默认值。

use tracing::Level;

pub const DEFAULT_API_URL: &str = "https://kwirkmart.expertech.dev/api";
pub const DEFAULT_LOG_LEVEL: Level = Level::INFO;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// 后端 API 根地址（不带末尾斜杠）
    pub api_url: String,
    /// 浏览器控制台日志的最高级别
    pub log_level: Level,
}

impl AppConfig {
    /// 从编译期环境变量加载
    ///
    /// - `MARTDESK_API_URL`
    /// - `MARTDESK_LOG_LEVEL`: trace / debug / info / warn / error
    pub fn from_env() -> Self {
        Self::resolve(
            option_env!("MARTDESK_API_URL"),
            option_env!("MARTDESK_LOG_LEVEL"),
        )
    }

    fn resolve(api_url: Option<&str>, log_level: Option<&str>) -> Self {
        let api_url = api_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();

        let log_level = log_level
            .and_then(|s| s.trim().parse::<Level>().ok())
            .unwrap_or(DEFAULT_LOG_LEVEL);

        Self { api_url, log_level }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::resolve(None, None)
    }
}
