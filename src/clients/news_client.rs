//! Finnhub 新闻列表客户端
//!
//! 只负责拿文章元数据（URL / 标题 / 来源 / 时间），正文获取
//! 由工作流层完成

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use tracing::info;

use crate::config::Config;
use crate::models::NewsItem;

/// 新闻列表客户端
pub struct NewsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("构造 HTTP 客户端失败")?;
        Ok(Self {
            client,
            base_url: config.finnhub_api_base_url.clone(),
            api_key: config.finnhub_api_key.clone(),
        })
    }

    /// 拉取公司新闻列表
    ///
    /// 日期未指定时默认取最近 7 天
    pub async fn company_news(
        &self,
        symbol: &str,
        from_date: Option<&str>,
        to_date: Option<&str>,
    ) -> Result<Vec<NewsItem>> {
        let (from, to) = resolve_window(from_date, to_date);
        info!("📡 拉取 {} 的新闻列表 ({} ~ {})", symbol, from, to);

        let url = format!("{}/company-news", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("token", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("请求公司新闻接口失败")?
            .error_for_status()
            .context("公司新闻接口返回错误状态")?;

        let items: Vec<NewsItem> = response.json().await.context("解析新闻列表失败")?;
        info!("📦 拿到 {} 条新闻", items.len());
        Ok(items)
    }

    /// 拉取市场新闻列表（category: general / forex / crypto / merger）
    pub async fn market_news(&self, category: &str) -> Result<Vec<NewsItem>> {
        info!("📡 拉取市场新闻列表 (类别: {})", category);

        let url = format!("{}/news", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("category", category), ("token", self.api_key.as_str())])
            .send()
            .await
            .context("请求市场新闻接口失败")?
            .error_for_status()
            .context("市场新闻接口返回错误状态")?;

        let items: Vec<NewsItem> = response.json().await.context("解析新闻列表失败")?;
        info!("📦 拿到 {} 条新闻", items.len());
        Ok(items)
    }
}

/// 解析日期窗口：未指定时取最近 7 天（UTC）
pub fn resolve_window(from_date: Option<&str>, to_date: Option<&str>) -> (String, String) {
    let today = Utc::now().date_naive();
    let from = from_date
        .map(str::to_string)
        .unwrap_or_else(|| (today - ChronoDuration::days(7)).format("%Y-%m-%d").to_string());
    let to = to_date
        .map(str::to_string)
        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());
    (from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_explicit_window_passes_through() {
        let (from, to) = resolve_window(Some("2025-08-01"), Some("2025-08-15"));
        assert_eq!(from, "2025-08-01");
        assert_eq!(to, "2025-08-15");
    }

    #[test]
    fn test_default_window_is_seven_days() {
        let (from, to) = resolve_window(None, None);
        let from = NaiveDate::parse_from_str(&from, "%Y-%m-%d").expect("from 格式错误");
        let to = NaiveDate::parse_from_str(&to, "%Y-%m-%d").expect("to 格式错误");
        assert_eq!((to - from).num_days(), 7);
    }

    #[test]
    fn test_partial_window() {
        let (from, to) = resolve_window(Some("2025-08-01"), None);
        assert_eq!(from, "2025-08-01");
        assert!(NaiveDate::parse_from_str(&to, "%Y-%m-%d").is_ok());
    }
}
