//! 批处理编排
//!
//! 拉取新闻列表后按并发上限分批处理，每篇文章一个任务。
//! 单篇失败不影响其他文章，最后汇总统计

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::classifier::SiteClassifier;
use crate::clients::news_client::resolve_window;
use crate::clients::NewsClient;
use crate::config::Config;
use crate::models::NewsItem;
use crate::orchestrator::article_processor::{process_article, ProcessResult};
use crate::services::ArticleSink;
use crate::workflow::FetchOrchestrator;

/// 一次运行的统计
#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunStats {
    fn record(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Succeeded => self.succeeded += 1,
            ProcessResult::Skipped => self.skipped += 1,
            ProcessResult::Failed => self.failed += 1,
        }
    }
}

/// 应用入口
pub struct App {
    config: Config,
    news_client: NewsClient,
    orchestrator: Arc<FetchOrchestrator>,
    sink: Arc<ArticleSink>,
}

impl App {
    /// 初始化：创建客户端、编排器和输出目录
    pub async fn initialize(config: Config) -> Result<Self> {
        info!("🚀 初始化新闻抓取器...");

        let classifier = SiteClassifier::new(&config.extra_skip_domains);
        let news_client = NewsClient::new(&config)?;
        let orchestrator = Arc::new(
            FetchOrchestrator::new(&config).map_err(|e| anyhow::anyhow!("初始化抓取器失败: {e}"))?,
        );

        let (from, to) = resolve_window(config.from_date.as_deref(), config.to_date.as_deref());
        let run_label = match &config.news_category {
            Some(category) => format!("market_{}_{}_to_{}", category, from, to),
            None => format!("{}_{}_to_{}", config.symbol, from, to),
        };
        let sink = Arc::new(
            ArticleSink::create(
                &config.output_dir,
                &run_label,
                &config.output_log_file,
                classifier,
            )
            .await?,
        );

        Ok(Self {
            config,
            news_client,
            orchestrator,
            sink,
        })
    }

    /// 运行完整批处理流程
    pub async fn run(&self) -> Result<RunStats> {
        let items = self.load_news_list().await?;
        if items.is_empty() {
            warn!("新闻列表为空，结束运行");
            return Ok(RunStats::default());
        }
        info!(
            "📊 共 {} 条新闻，并发上限 {}",
            items.len(),
            self.config.max_concurrent_fetches
        );

        // 统计以列表长度为准，缺 URL 的条目计为失败，不会从汇总里消失
        let mut stats = RunStats {
            total: items.len(),
            ..RunStats::default()
        };
        let (fetchable, dropped) = Self::partition_fetchable(items);
        if dropped > 0 {
            warn!("{} 条新闻缺少 URL，计为失败", dropped);
            stats.failed += dropped;
        }

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches));
        let mut handles = Vec::with_capacity(fetchable.len());

        for (index, item) in fetchable {
            let semaphore = Arc::clone(&semaphore);
            let orchestrator = Arc::clone(&self.orchestrator);
            let sink = Arc::clone(&self.sink);
            let config = self.config.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await;
                process_article(&orchestrator, &sink, &config, index, &item).await
            }));
        }
        for handle in handles {
            match handle.await {
                Ok(Ok(result)) => stats.record(result),
                Ok(Err(e)) => {
                    error!("文章处理出错: {}", e);
                    stats.failed += 1;
                }
                Err(e) => {
                    error!("任务异常退出: {}", e);
                    stats.failed += 1;
                }
            }
        }

        self.log_summary(&stats).await;
        Ok(stats)
    }

    /// 过滤掉缺 URL 的条目，保留 1 起始的列表序号（文件编号用），
    /// 返回 (可抓取条目, 丢弃数)
    fn partition_fetchable(items: Vec<NewsItem>) -> (Vec<(usize, NewsItem)>, usize) {
        let mut fetchable = Vec::with_capacity(items.len());
        let mut dropped = 0;
        for (i, item) in items.into_iter().enumerate() {
            if item.url.trim().is_empty() {
                dropped += 1;
            } else {
                fetchable.push((i + 1, item));
            }
        }
        (fetchable, dropped)
    }

    async fn load_news_list(&self) -> Result<Vec<NewsItem>> {
        match &self.config.news_category {
            Some(category) => self
                .news_client
                .market_news(category)
                .await
                .context("拉取市场新闻失败"),
            None => self
                .news_client
                .company_news(
                    &self.config.symbol,
                    self.config.from_date.as_deref(),
                    self.config.to_date.as_deref(),
                )
                .await
                .context("拉取公司新闻失败"),
        }
    }

    async fn log_summary(&self, stats: &RunStats) {
        info!(
            "📊 运行结束: 共 {} 条，成功 {}，跳过 {}，失败 {}",
            stats.total, stats.succeeded, stats.skipped, stats.failed
        );
        let summary = format!(
            "\n===== 汇总 =====\n共 {} 条，成功 {}，跳过 {}，失败 {}",
            stats.total, stats.succeeded, stats.skipped, stats.failed
        );
        if let Err(e) = self.sink.append_log(&summary).await {
            warn!("写汇总日志失败: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str) -> NewsItem {
        NewsItem {
            url: url.to_string(),
            headline: String::new(),
            source: String::new(),
            datetime: 0,
            summary: String::new(),
        }
    }

    #[test]
    fn test_partition_keeps_list_indices_and_counts_dropped() {
        let items = vec![item("https://a.example/1"), item("  "), item("https://c.example/3")];
        let (fetchable, dropped) = App::partition_fetchable(items);

        // 序号跟列表位置走，中间缺 URL 的条目留下空号并计入丢弃数
        assert_eq!(dropped, 1);
        assert_eq!(fetchable.len(), 2);
        assert_eq!(fetchable[0].0, 1);
        assert_eq!(fetchable[1].0, 3);
    }

    #[test]
    fn test_stats_record() {
        let mut stats = RunStats {
            total: 3,
            ..RunStats::default()
        };
        stats.record(ProcessResult::Succeeded);
        stats.record(ProcessResult::Skipped);
        stats.record(ProcessResult::Failed);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 1);
    }
}
