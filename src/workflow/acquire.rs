//! 获取工作流
//!
//! 单篇文章的完整获取流程：轻量抓取 → （必要且允许时）浏览器升级 →
//! 正文提取。`acquire` 永不失败：所有故障都折算进 `FetchOutcome`，
//! 调用方只需要看结果字段

use tokio::time::timeout;
use tracing::{info, warn};

use crate::classifier::SiteClassifier;
use crate::config::Config;
use crate::error::{FailureKind, FetchError};
use crate::extractor::ContentExtractor;
use crate::fetchers::{BrowserFetcher, LightFetcher};
use crate::models::{ArticleDocument, FetchOutcome, FetchRequest, FetchStrategy};

/// 获取编排器
///
/// 无状态（除配置外），可在并发任务间以 Arc 共享
pub struct FetchOrchestrator {
    light: LightFetcher,
    browser: BrowserFetcher,
    extractor: ContentExtractor,
    browser_budget: std::time::Duration,
}

impl FetchOrchestrator {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let classifier = SiteClassifier::new(&config.extra_skip_domains);
        Ok(Self {
            light: LightFetcher::new(config, classifier.clone())?,
            browser: BrowserFetcher::new(config, classifier),
            extractor: ContentExtractor::new(),
            browser_budget: config.browser_budget(),
        })
    }

    /// 获取单篇文章
    ///
    /// 返回 (抓取结果, 提取出的文档)；文档仅在拿到非空正文时存在
    pub async fn acquire(&self, request: &FetchRequest) -> (FetchOutcome, Option<ArticleDocument>) {
        info!("🔍 开始抓取: {}", request.url);
        let light_outcome = self.light.fetch(&request.url).await;

        let outcome = if should_escalate(&light_outcome, request.allow_browser_escalation) {
            info!("⬆️ 轻量抓取不足，升级到浏览器: {}", request.url);
            // 浏览器阶段整体受预算约束；超时取消时会话随 Drop 释放
            match timeout(
                self.browser_budget,
                self.browser.fetch(&request.url, request.render_timeout),
            )
            .await
            {
                Ok(browser_outcome) => browser_outcome,
                Err(_) => {
                    warn!("浏览器阶段超出预算 ({:?}): {}", self.browser_budget, request.url);
                    FetchOutcome::new(&request.url, FetchStrategy::Browser)
                        .mark_failed(FailureKind::SessionFault)
                }
            }
        } else {
            light_outcome
        };

        let document = self.extractor.extract_from_outcome(&outcome).map(
            |(title, body_text)| ArticleDocument {
                title,
                body_text,
                source_chain: outcome.source_chain.clone(),
            },
        );

        // 拿到了 HTML 但提取不出正文：按提取失败记录
        let outcome = if outcome.succeeded && document.is_none() {
            warn!("正文提取结果为空: {}", outcome.final_url);
            outcome.mark_failed(FailureKind::ExtractionEmpty)
        } else {
            outcome
        };

        (outcome, document)
    }
}

/// 升级判定：允许升级、且轻量阶段既没判跳过也没拿到可用内容
pub fn should_escalate(light_outcome: &FetchOutcome, allow: bool) -> bool {
    allow && !light_outcome.is_skipped() && !light_outcome.has_usable_html()
}
