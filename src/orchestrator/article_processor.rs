//! 单篇文章处理
//!
//! 批处理中的最小工作单元：礼貌性延迟 → 获取 → 落盘。
//! 返回处理结论供批处理统计；落盘失败才向上抛错

use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{FetchRequest, NewsItem};
use crate::services::ArticleSink;
use crate::workflow::FetchOrchestrator;

/// 单篇处理结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 正文已落盘
    Succeeded,
    /// 命中跳过策略，写了提示文件
    Skipped,
    /// 抓取失败，写了提示文件
    Failed,
}

/// 处理单篇文章（index 从 1 开始，对应 news{N}.txt）
pub async fn process_article(
    orchestrator: &FetchOrchestrator,
    sink: &ArticleSink,
    config: &Config,
    index: usize,
    item: &NewsItem,
) -> Result<ProcessResult> {
    // 礼貌性延迟，避免并发任务同时压向同一站点
    let delay_ms = rand::thread_rng().gen_range(1_000..=3_000);
    sleep(Duration::from_millis(delay_ms)).await;

    let request = FetchRequest::new(
        &item.url,
        config.allow_browser_escalation,
        Duration::from_millis(config.render_timeout_ms),
    );
    let (outcome, document) = orchestrator.acquire(&request).await;

    if let Some(document) = document {
        let path = sink.write_article(index, item, &outcome, &document).await?;
        info!("✓ [{}] 已保存: {}", index, path.display());
        sink.append_log(&format!("news{}: 成功 - {}", index, outcome.final_url))
            .await?;
        return Ok(ProcessResult::Succeeded);
    }

    sink.write_notice(index, item, &outcome).await?;
    if outcome.is_skipped() {
        info!("⏭️ [{}] 已跳过: {}", index, outcome.final_url);
        sink.append_log(&format!("news{}: 跳过 - {}", index, outcome.final_url))
            .await?;
        Ok(ProcessResult::Skipped)
    } else {
        warn!("✗ [{}] 抓取失败: {} ({:?})", index, item.url, outcome.failure);
        sink.append_log(&format!(
            "news{}: 失败 ({:?}) - {}",
            index, outcome.failure, item.url
        ))
        .await?;
        Ok(ProcessResult::Failed)
    }
}
