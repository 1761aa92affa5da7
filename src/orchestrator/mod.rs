//! 编排层
//!
//! 应用级流程：新闻列表 → 并发抓取 → 落盘 → 统计

pub mod article_processor;
pub mod batch_processor;

pub use article_processor::{process_article, ProcessResult};
pub use batch_processor::{App, RunStats};
