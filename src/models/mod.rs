//! 数据模型

pub mod fetch;
pub mod news;

pub use fetch::{ArticleDocument, ChallengeKind, FetchOutcome, FetchRequest, FetchStrategy, SiteVerdict};
pub use news::NewsItem;
