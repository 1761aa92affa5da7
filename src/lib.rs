//! 财经新闻抓取器
//!
//! 从 Finnhub 风格的新闻 API 拉取文章列表，对每个 URL 执行
//! "轻量 HTTP 优先、浏览器兜底"的正文获取，并落盘为文本文件。
//!
//! 分层架构（依赖自上而下单向）：
//!
//! ```text
//! orchestrator  应用编排：批处理、并发、统计
//!      │
//! workflow      获取工作流：轻量 → 升级判定 → 浏览器 → 提取
//!      │
//! fetchers      抓取器：轻量 HTTP / 浏览器（验证缓解 + 内容展开）
//!      │
//! mitigation    反爬验证状态机（press & hold / 滑块）
//!      │
//! infrastructure DOM 探针：JS 执行、元素定位、CDP 鼠标事件
//!      │
//! browser       浏览器会话的生命周期
//! ```
//!
//! 横向支撑：`clients`（新闻 API）、`services`（落盘）、
//! `classifier`（跳过策略）、`extractor`（正文提取）、`selectors`
//! （站点模式表）、`models` / `error` / `config` / `logger`

pub mod browser;
pub mod classifier;
pub mod clients;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetchers;
pub mod infrastructure;
pub mod logger;
pub mod mitigation;
pub mod models;
pub mod orchestrator;
pub mod selectors;
pub mod services;
pub mod workflow;

pub use classifier::SiteClassifier;
pub use config::Config;
pub use error::{FailureKind, FetchError};
pub use extractor::ContentExtractor;
pub use models::{ArticleDocument, FetchOutcome, FetchRequest, FetchStrategy, NewsItem};
pub use orchestrator::App;
pub use workflow::FetchOrchestrator;
