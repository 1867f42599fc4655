//! 原生 Web API 封装模块
//!
//! 此模块提供对浏览器原生 API 的轻量级封装，直接基于 `web_sys` / `js_sys`，
//! 并实现共享层定义的 `Transport` / `SessionStorage` / `Navigator` 抽象。

pub mod clock;
mod http;
pub mod router;
mod storage;

pub use http::FetchTransport;
pub use router::BrowserNavigator;
pub use storage::BrowserSessionStorage;
