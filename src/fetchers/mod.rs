//! 抓取器层
//!
//! 两条抓取路径：轻量 HTTP 优先，拿不到可用内容时由工作流层
//! 升级到浏览器抓取。两者都把失败折算进 `FetchOutcome`，不抛错

pub mod browser;
pub mod light;

pub use browser::BrowserFetcher;
pub use light::LightFetcher;
