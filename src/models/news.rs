//! 新闻元数据模型

use serde::{Deserialize, Serialize};

/// 单条新闻元数据（来自 Finnhub 风格的新闻 API）
///
/// 核心只依赖 `url` 字段；其余字段用于展示和落盘
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    /// 文章 URL
    #[serde(default)]
    pub url: String,
    /// 标题
    #[serde(default)]
    pub headline: String,
    /// 来源
    #[serde(default)]
    pub source: String,
    /// 发布时间（Unix 秒）
    #[serde(default)]
    pub datetime: i64,
    /// 摘要
    #[serde(default)]
    pub summary: String,
}

impl NewsItem {
    /// 发布时间的可读格式
    pub fn published_at(&self) -> String {
        chrono::DateTime::from_timestamp(self.datetime, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "未知时间".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_news_item() {
        let json = r#"{
            "category": "company",
            "datetime": 1714521600,
            "headline": "Apple Reports Second Quarter Results",
            "id": 12345,
            "image": "",
            "related": "AAPL",
            "source": "Yahoo",
            "summary": "...",
            "url": "https://finance.yahoo.com/news/apple-reports.html"
        }"#;

        let item: NewsItem = serde_json::from_str(json).expect("解析失败");
        assert_eq!(item.url, "https://finance.yahoo.com/news/apple-reports.html");
        assert_eq!(item.source, "Yahoo");
        assert!(item.published_at().starts_with("2024-"));
    }

    #[test]
    fn test_missing_fields_default() {
        let item: NewsItem = serde_json::from_str("{}").expect("解析失败");
        assert!(item.url.is_empty());
        assert_eq!(item.datetime, 0);
    }
}
