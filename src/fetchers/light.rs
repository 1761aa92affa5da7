//! 轻量 HTTP 抓取
//!
//! 带浏览器头部伪装的普通 HTTP 请求，开 cookie 罐但不执行脚本。
//! 拿到 HTML 后只做一件"半动态"的事：扫描静态 DOM 中的
//! Continue Reading 锚点，最多追一跳

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::classifier::SiteClassifier;
use crate::config::Config;
use crate::error::{FailureKind, FetchError};
use crate::models::{FetchOutcome, FetchStrategy};
use crate::selectors::{random_user_agent, LIGHT_CONTINUE_READING_SELECTORS};

/// 轻量抓取器
pub struct LightFetcher {
    client: reqwest::Client,
    classifier: SiteClassifier,
}

impl LightFetcher {
    pub fn new(config: &Config, classifier: SiteClassifier) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(std::time::Duration::from_millis(config.light_timeout_ms))
            .build()?;
        Ok(Self { client, classifier })
    }

    /// 抓取单个 URL，失败以 `FetchOutcome` 字段的形式上报
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let outcome = FetchOutcome::new(url, FetchStrategy::Light);

        // 访问前判定
        if self.classifier.is_skip(url) {
            info!("⏭️ 命中跳过站点，放弃抓取: {}", url);
            return outcome.mark_skipped();
        }

        match self.fetch_inner(url, outcome).await {
            Ok(outcome) => outcome,
            Err((outcome, e)) => {
                warn!("轻量抓取失败 ({}): {}", url, e);
                outcome.mark_failed(e.kind())
            }
        }
    }

    async fn fetch_inner(
        &self,
        url: &str,
        mut outcome: FetchOutcome,
    ) -> Result<FetchOutcome, (FetchOutcome, FetchError)> {
        let (final_url, html) = match self.get_page(url).await {
            Ok(pair) => pair,
            // 错误状态但落点已在跳过站点：按跳过处理，不算失败
            Err(FetchError::Network { url: err_url, .. }) if self.classifier.is_skip(&err_url) => {
                info!("⏭️ 跳过站点返回错误状态: {}", err_url);
                outcome.visit(&err_url);
                return Ok(outcome.mark_skipped());
            }
            Err(e) => return Err((outcome, e)),
        };
        outcome.visit(&final_url);

        // 重定向后的落点可能换了域，重新判定
        if self.classifier.is_skip(&final_url) {
            info!("⏭️ 重定向落在跳过站点: {}", final_url);
            return Ok(outcome.mark_skipped());
        }

        // 静态 HTML 中的 Continue Reading 锚点：最多追一跳
        if let Some(href) = find_continue_reading_href(&html) {
            let dest = resolve_href(&final_url, &href);
            if self.classifier.is_skip(&dest) {
                // 跳转目标是付费站点，整篇按跳过处理
                info!("⏭️ Continue Reading 指向跳过站点: {}", dest);
                outcome.visit(&dest);
                return Ok(outcome.mark_skipped());
            }
            debug!("轻量阶段追 Continue Reading 链接: {}", dest);
            match self.get_page(&dest).await {
                Ok((hop_url, hop_html)) => {
                    outcome.visit(&hop_url);
                    if self.classifier.is_skip(&hop_url) {
                        return Ok(outcome.mark_skipped());
                    }
                    return Ok(outcome.mark_succeeded(hop_html));
                }
                Err(e) => {
                    // 追跳失败不致命，保留原页内容
                    debug!("追 Continue Reading 失败，保留原页: {}", e);
                }
            }
        }

        Ok(outcome.mark_succeeded(html))
    }

    /// GET 一个页面，返回 (重定向后的最终 URL, HTML)
    async fn get_page(&self, url: &str) -> Result<(String, String), FetchError> {
        let response = self
            .client
            .get(url)
            .headers(spoofed_headers(url))
            .send()
            .await?;

        let final_url = response.url().to_string();
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network {
                url: final_url,
                message: format!("HTTP 状态 {}", status),
            });
        }
        let html = response.text().await?;
        Ok((final_url, html))
    }
}

/// 构造浏览器伪装头部（每次请求换 User-Agent，Referer 指向站点首页）
fn spoofed_headers(url: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(random_user_agent()) {
        headers.insert(USER_AGENT, value);
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert("DNT", HeaderValue::from_static("1"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    if let Some(origin) = Url::parse(url).ok().and_then(|u| {
        u.host_str()
            .map(|host| format!("{}://{}/", u.scheme(), host))
    }) {
        if let Ok(value) = HeaderValue::from_str(&origin) {
            headers.insert(REFERER, value);
        }
    }
    headers
}

/// 在静态 HTML 中找第一个 Continue Reading 锚点的 href
///
/// 纯函数，不碰网络；选择器表序即优先级
pub fn find_continue_reading_href(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    for selector_str in LIGHT_CONTINUE_READING_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                let href = href.trim();
                if !href.is_empty() {
                    return Some(href.to_string());
                }
            }
        }
    }
    None
}

/// 相对 href 解析为绝对 URL；解析不了就原样返回
pub(crate) fn resolve_href(base: &str, href: &str) -> String {
    Url::parse(base)
        .ok()
        .and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_continue_reading_anchor() {
        let html = r#"<html><body>
            <p>Preview paragraph.</p>
            <a class="secondary-btn-link continue-reading-button"
               title="Continue Reading"
               href="https://partner.example.com/full-story">Continue Reading</a>
        </body></html>"#;
        assert_eq!(
            find_continue_reading_href(html),
            Some("https://partner.example.com/full-story".to_string())
        );
    }

    #[test]
    fn test_read_more_anchor_also_matches() {
        let html = r#"<a title="Read More" href="/story/full">Read More</a>"#;
        assert_eq!(find_continue_reading_href(html), Some("/story/full".to_string()));
    }

    #[test]
    fn test_plain_links_do_not_match() {
        let html = r#"<html><body><a href="/other">其他新闻</a></body></html>"#;
        assert_eq!(find_continue_reading_href(html), None);
    }

    #[test]
    fn test_empty_href_is_ignored() {
        let html = r#"<a title="Continue Reading" href="  ">Continue Reading</a>"#;
        assert_eq!(find_continue_reading_href(html), None);
    }

    #[test]
    fn test_resolve_relative_href() {
        assert_eq!(
            resolve_href("https://finance.yahoo.com/news/a.html", "/m/uuid/full.html"),
            "https://finance.yahoo.com/m/uuid/full.html"
        );
        assert_eq!(
            resolve_href("https://a.example/x", "https://b.example/y"),
            "https://b.example/y"
        );
    }

    #[test]
    fn test_spoofed_headers_have_referer_origin() {
        let headers = spoofed_headers("https://www.cnbc.com/2025/08/30/story.html");
        assert_eq!(
            headers.get(REFERER).and_then(|v| v.to_str().ok()),
            Some("https://www.cnbc.com/")
        );
        assert!(headers.get(USER_AGENT).is_some());
    }
}
