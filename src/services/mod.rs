//! 业务服务层

pub mod article_sink;

pub use article_sink::ArticleSink;
