//! 浏览器抓取
//!
//! 每个请求独享一个浏览器会话：启动 → 导航 → 验证缓解 →
//! 内容展开（Story Continues 就地展开 / Continue Reading 跳转 /
//! load-more 补点）→ 取 HTML。会话在所有路径上都会被关闭。
//!
//! 三种内容展开手段互斥，按固定优先级取其一：就地展开成功就
//! 直接收当前页面（Yahoo 类页面展开后 DOM 里仍留着外跳按钮，
//! 此时外跳会把刚展开的正文丢掉）；否则找到 Continue Reading
//! 控件就只做跳转；两者都没有才补点 load-more

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::browser::BrowserSession;
use crate::classifier::SiteClassifier;
use crate::config::Config;
use crate::error::FailureKind;
use crate::infrastructure::{DomProbe, ElementHit};
use crate::mitigation::AntiBotMitigator;
use crate::models::{FetchOutcome, FetchStrategy};
use crate::selectors::{load_more_patterns_for, CONTINUE_READING_PATTERNS, STORY_CONTINUES_PATTERNS};

use super::light::resolve_href;

/// 就地展开循环的点击上限（按钮点击后通常消失；不消失的页面靠它止损）
const STORY_CONTINUES_CLICK_CAP: usize = 10;

/// 互斥的内容展开步骤
#[derive(Debug)]
enum ExpansionStep {
    /// 就地展开已发生，直接收当前页面
    ReturnExpanded,
    /// 跟随 Continue Reading 控件（跳转后不再补点）
    FollowContinueReading(ElementHit),
    /// 没有展开控件，补点 load-more
    ClickLoadMore,
}

/// 展开步骤的选择：就地展开压过一切，其次 Continue Reading，最后 load-more
fn plan_expansion(story_expanded: bool, continue_hit: Option<ElementHit>) -> ExpansionStep {
    if story_expanded {
        ExpansionStep::ReturnExpanded
    } else if let Some(hit) = continue_hit {
        ExpansionStep::FollowContinueReading(hit)
    } else {
        ExpansionStep::ClickLoadMore
    }
}

/// 浏览器抓取器
pub struct BrowserFetcher {
    classifier: SiteClassifier,
    mitigator: AntiBotMitigator,
    headless: bool,
    executable: Option<String>,
    quiesce: Duration,
    max_clicks_per_pattern: usize,
}

impl BrowserFetcher {
    pub fn new(config: &Config, classifier: SiteClassifier) -> Self {
        Self {
            classifier,
            mitigator: AntiBotMitigator::new(config),
            headless: config.effective_headless(),
            executable: config.browser_executable.clone(),
            quiesce: Duration::from_millis(config.quiesce_timeout_ms),
            max_clicks_per_pattern: config.max_clicks_per_pattern,
        }
    }

    /// 抓取单个 URL，失败以 `FetchOutcome` 字段的形式上报
    ///
    /// `render_timeout` 是单次导航的超时，由请求携带
    pub async fn fetch(&self, url: &str, render_timeout: Duration) -> FetchOutcome {
        let outcome = FetchOutcome::new(url, FetchStrategy::Browser);
        if self.classifier.is_skip(url) {
            return outcome.mark_skipped();
        }

        let session = match BrowserSession::launch(self.headless, self.executable.as_deref()).await
        {
            Ok(session) => session,
            Err(e) => {
                warn!("启动浏览器会话失败: {}", e);
                return outcome.mark_failed(FailureKind::SessionFault);
            }
        };

        let result = self.drive(&session, url, render_timeout, outcome).await;
        session.close().await;
        result
    }

    async fn drive(
        &self,
        session: &BrowserSession,
        url: &str,
        render_timeout: Duration,
        mut outcome: FetchOutcome,
    ) -> FetchOutcome {
        let probe = DomProbe::new(session.page().clone());

        if let Err(e) = session.navigate(url, render_timeout).await {
            warn!("浏览器导航失败: {}", e);
            return outcome.mark_failed(FailureKind::Network);
        }
        let current = probe.current_url(url).await;
        outcome.visit(&current);
        if self.classifier.is_skip(&current) {
            info!("⏭️ 重定向落在跳过站点: {}", current);
            return outcome.mark_skipped();
        }

        // 验证缓解：失败不中止抓取，带着可能不完整的页面继续
        let mitigation = self.mitigator.run(&probe).await;
        let challenge_unresolved = mitigation.is_unresolved();
        let current = probe.current_url(&current).await;
        outcome.visit(&current);
        if self.classifier.is_skip(&current) {
            return outcome.mark_skipped();
        }

        // 内容展开；中途命中跳过站点时整篇按跳过处理
        match self
            .expand_content(session, &probe, render_timeout, &mut outcome)
            .await
        {
            Ok(true) => return outcome.mark_skipped(),
            Ok(false) => {}
            Err(e) => debug!("展开内容时出错（保留当前页）: {}", e),
        }

        match probe.content().await {
            Ok(html) if !html.trim().is_empty() => {
                let mut outcome = outcome.mark_succeeded(html);
                if challenge_unresolved {
                    // 内容可能被验证页拦截，调用方据此判断完整性
                    outcome.failure = Some(FailureKind::ChallengeUnresolved);
                }
                outcome
            }
            Ok(_) => outcome.mark_failed(FailureKind::ExtractionEmpty),
            Err(e) => {
                warn!("读取页面 HTML 失败: {}", e);
                outcome.mark_failed(FailureKind::SessionFault)
            }
        }
    }

    /// 展开被折叠的正文，返回是否应判跳过
    async fn expand_content(
        &self,
        session: &BrowserSession,
        probe: &DomProbe,
        render_timeout: Duration,
        outcome: &mut FetchOutcome,
    ) -> Result<bool> {
        let story_expanded = self.expand_story_continues(probe).await?;
        let continue_hit = probe.first_match(CONTINUE_READING_PATTERNS).await?;

        match plan_expansion(story_expanded, continue_hit) {
            ExpansionStep::ReturnExpanded => {
                info!("📖 就地展开完成，收当前页面");
                Ok(false)
            }
            ExpansionStep::FollowContinueReading(hit) => {
                self.follow_continue_reading(session, probe, render_timeout, outcome, hit)
                    .await
            }
            ExpansionStep::ClickLoadMore => self.click_load_more(probe, outcome).await,
        }
    }

    /// 点完页面上所有可见的 Story Continues 按钮，返回是否点到过
    async fn expand_story_continues(&self, probe: &DomProbe) -> Result<bool> {
        let mut clicked = 0;
        while clicked < STORY_CONTINUES_CLICK_CAP {
            if !probe.click_first(STORY_CONTINUES_PATTERNS).await? {
                break;
            }
            clicked += 1;
            info!("📖 点击 Story Continues 就地展开 ({})", clicked);
            probe.wait_for_quiescence(self.quiesce).await;
        }
        Ok(clicked > 0)
    }

    /// 跟随 Continue Reading 控件：优先取 href 直接导航，没有 href 再点击
    async fn follow_continue_reading(
        &self,
        session: &BrowserSession,
        probe: &DomProbe,
        render_timeout: Duration,
        outcome: &mut FetchOutcome,
        hit: ElementHit,
    ) -> Result<bool> {
        let before = probe.current_url(&outcome.final_url).await;
        let href = hit.href.filter(|h| !h.trim().is_empty());
        if let Some(href) = href {
            let dest = resolve_href(&before, &href);
            if self.classifier.is_skip(&dest) {
                info!("⏭️ Continue Reading 指向跳过站点: {}", dest);
                outcome.visit(&dest);
                return Ok(true);
            }
            info!("🔗 Continue Reading 直接导航: {}", dest);
            session.navigate(&dest, render_timeout).await?;
        } else {
            info!("🖱️ Continue Reading 无 href，模拟点击");
            probe.click_first(CONTINUE_READING_PATTERNS).await?;
        }
        probe.wait_for_quiescence(self.quiesce).await;
        let now = probe.current_url(&before).await;
        outcome.visit(&now);
        Ok(self.classifier.is_skip(&now))
    }

    /// 补点 load-more：站点专属表在前，每个模式点击次数有界，URL 变化即停
    async fn click_load_more(&self, probe: &DomProbe, outcome: &mut FetchOutcome) -> Result<bool> {
        let current = outcome.final_url.clone();
        let patterns = load_more_patterns_for(&current);
        'patterns: for pattern in &patterns {
            for _ in 0..self.max_clicks_per_pattern {
                if !probe.click_first(std::slice::from_ref(pattern)).await? {
                    break;
                }
                probe.wait_for_quiescence(self.quiesce).await;
                let now = probe.current_url(&current).await;
                if now != current {
                    debug!("load-more 点击后 URL 变化: {}", now);
                    outcome.visit(&now);
                    if self.classifier.is_skip(&now) {
                        return Ok(true);
                    }
                    break 'patterns;
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn continue_hit() -> ElementHit {
        ElementHit {
            x: 100.0,
            y: 200.0,
            width: 80.0,
            height: 24.0,
            href: Some("https://partner.example/full".to_string()),
            text: "Continue Reading".to_string(),
        }
    }

    #[test]
    fn test_expanded_page_wins_over_continue_control() {
        // Yahoo 类页面：就地展开后外跳按钮仍在 DOM 里，必须收当前页面
        let step = plan_expansion(true, Some(continue_hit()));
        assert!(matches!(step, ExpansionStep::ReturnExpanded));
    }

    #[test]
    fn test_continue_control_wins_over_load_more() {
        let step = plan_expansion(false, Some(continue_hit()));
        assert!(matches!(step, ExpansionStep::FollowContinueReading(_)));
    }

    #[test]
    fn test_load_more_only_without_other_controls() {
        let step = plan_expansion(false, None);
        assert!(matches!(step, ExpansionStep::ClickLoadMore));
    }
}
