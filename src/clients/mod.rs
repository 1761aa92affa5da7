//! 外部接口客户端层

pub mod news_client;

pub use news_client::NewsClient;
