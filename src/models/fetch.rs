//! 抓取相关数据模型
//!
//! 每个请求恰好产生一个 `FetchOutcome`；`html` 仅在两种策略都失败
//! 或判定为跳过时缺席

use std::time::Duration;

use crate::error::FailureKind;

/// 抓取请求（创建后不可变）
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 文章 URL
    pub url: String,
    /// 是否允许升级到浏览器抓取
    pub allow_browser_escalation: bool,
    /// 浏览器单步操作超时
    pub render_timeout: Duration,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, allow_browser_escalation: bool, render_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            allow_browser_escalation,
            render_timeout,
        }
    }
}

/// 站点判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteVerdict {
    /// 继续抓取
    Proceed,
    /// 付费站点，跳过（携带命中的域名子串）
    SkipPaywalled { domain: String },
}

impl SiteVerdict {
    pub fn is_skip(&self) -> bool {
        matches!(self, SiteVerdict::SkipPaywalled { .. })
    }
}

/// 反爬验证类型（每次页面加载时扫描文本判定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeKind {
    /// 无验证
    None,
    /// 按住按钮验证
    PressAndHold,
    /// 滑块拖动验证
    SliderDrag,
}

/// 实际使用的抓取策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// 轻量 HTTP 抓取
    Light,
    /// 浏览器抓取
    Browser,
    /// 命中跳过策略，未抓取
    Skipped,
}

/// 抓取结果
///
/// `source_chain` 按访问顺序只增不减，最后一个元素始终是 `final_url`
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// 原始 URL
    pub original_url: String,
    /// 最终 URL（重定向 / continue-reading 跳转之后）
    pub final_url: String,
    /// 页面 HTML（跳过或两种策略都失败时为 None）
    pub html: Option<String>,
    /// 实际使用的策略
    pub strategy_used: FetchStrategy,
    /// 是否成功拿到内容
    pub succeeded: bool,
    /// 失败分类（成功时为 None；验证未通过时即使拿到内容也会记录）
    pub failure: Option<FailureKind>,
    /// 实际访问过的 URL 链
    pub source_chain: Vec<String>,
}

impl FetchOutcome {
    /// 创建初始结果（尚未访问任何页面）
    pub fn new(original_url: impl Into<String>, strategy: FetchStrategy) -> Self {
        let url = original_url.into();
        Self {
            original_url: url.clone(),
            final_url: url.clone(),
            html: None,
            strategy_used: strategy,
            succeeded: false,
            failure: None,
            source_chain: vec![url],
        }
    }

    /// 记录一次 URL 变更（重定向、点击跳转、验证后跳转）
    ///
    /// 连续重复的 URL 不会重复入链
    pub fn visit(&mut self, url: impl Into<String>) {
        let url = url.into();
        if self.source_chain.last().map(|u| u.as_str()) != Some(url.as_str()) {
            self.source_chain.push(url.clone());
        }
        self.final_url = url;
    }

    /// 标记为跳过（html 缺席）
    pub fn mark_skipped(mut self) -> Self {
        self.strategy_used = FetchStrategy::Skipped;
        self.succeeded = false;
        self.html = None;
        self.failure = Some(FailureKind::SkipPolicy);
        self
    }

    /// 标记为失败
    pub fn mark_failed(mut self, kind: FailureKind) -> Self {
        self.succeeded = false;
        self.failure = Some(kind);
        self
    }

    /// 标记为成功并携带 HTML
    pub fn mark_succeeded(mut self, html: String) -> Self {
        self.succeeded = true;
        self.html = Some(html);
        self
    }

    /// 是否判定为跳过
    pub fn is_skipped(&self) -> bool {
        self.strategy_used == FetchStrategy::Skipped
    }

    /// 是否拿到了可用内容（非空 HTML）
    pub fn has_usable_html(&self) -> bool {
        self.html
            .as_ref()
            .map(|h| !h.trim().is_empty())
            .unwrap_or(false)
    }
}

/// 提取后的文章文档（交给调用方，核心自身不落盘）
#[derive(Debug, Clone)]
pub struct ArticleDocument {
    /// 文章标题
    pub title: String,
    /// 归一化后的正文
    pub body_text: String,
    /// 实际访问过的 URL 链（按访问顺序）
    pub source_chain: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_chain_ends_with_final_url() {
        let mut outcome = FetchOutcome::new("https://a.example/x", FetchStrategy::Light);
        outcome.visit("https://b.example/y");
        outcome.visit("https://c.example/z");

        assert_eq!(outcome.final_url, "https://c.example/z");
        assert_eq!(outcome.source_chain.last().unwrap(), &outcome.final_url);
        assert_eq!(outcome.source_chain.len(), 3);
    }

    #[test]
    fn test_source_chain_dedupes_consecutive() {
        let mut outcome = FetchOutcome::new("https://a.example/x", FetchStrategy::Browser);
        outcome.visit("https://a.example/x");
        assert_eq!(outcome.source_chain.len(), 1);
    }

    #[test]
    fn test_skipped_outcome_has_no_html() {
        let outcome = FetchOutcome::new("https://wsj.com/a", FetchStrategy::Light)
            .mark_succeeded("<html></html>".to_string())
            .mark_skipped();

        assert!(outcome.is_skipped());
        assert!(outcome.html.is_none());
        assert!(!outcome.succeeded);
    }

    #[test]
    fn test_usable_html_rejects_whitespace() {
        let outcome = FetchOutcome::new("https://a.example", FetchStrategy::Light)
            .mark_succeeded("   \n  ".to_string());
        assert!(!outcome.has_usable_html());
    }
}
