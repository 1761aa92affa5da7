//! 集成测试
//!
//! 依赖真实外网 / 真实浏览器的用例标 ignore，运行方式:
//! cargo test --test integration_test -- --ignored --nocapture
//! 其余用例只走本地回环或根本不碰网络，默认运行

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use finnews_crawler::clients::NewsClient;
use finnews_crawler::fetchers::{BrowserFetcher, LightFetcher};
use finnews_crawler::workflow::FetchOrchestrator;
use finnews_crawler::{Config, FetchRequest, FetchStrategy, SiteClassifier};

fn test_config() -> Config {
    Config {
        headless: true,
        max_slider_attempts: 1,
        press_hold_dwell_secs: 2,
        ..Config::default()
    }
}

/// 起一个回环 HTTP 服务，按路径返回固定 HTML，返回 base URL
async fn spawn_site(routes: Vec<(&'static str, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("绑定回环端口失败");
    let addr = listener.local_addr().expect("取本地地址失败");
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                // 读到请求头结束即可应答
                while read < buf.len() {
                    let Ok(n) = stream.read(&mut buf[read..]).await else {
                        return;
                    };
                    if n == 0 {
                        break;
                    }
                    read += n;
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let request = String::from_utf8_lossy(&buf[..read]);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let body = routes
                    .iter()
                    .find(|(p, _)| *p == path)
                    .map(|(_, b)| b.clone())
                    .unwrap_or_default();
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
            });
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_light_fetch_skips_paywalled_site_without_network() {
    let config = test_config();
    let fetcher = LightFetcher::new(&config, SiteClassifier::default()).expect("创建失败");

    // 判定在任何网络访问之前发生；若真发起了请求，结果就不会是跳过
    let outcome = fetcher.fetch("https://www.wsj.com/articles/anything").await;
    assert!(outcome.is_skipped());
    assert!(outcome.html.is_none());
    assert!(!outcome.succeeded);
}

#[tokio::test]
async fn test_light_fetch_follows_continue_reading_one_hop() {
    let article = r#"<html><body>
        <p>Preview paragraph only.</p>
        <a title="Continue Reading" href="/full">Continue Reading</a>
    </body></html>"#
        .to_string();
    let full = "<html><body><article><p>完整正文在这里。</p></article></body></html>".to_string();
    let base = spawn_site(vec![("/article", article), ("/full", full)]).await;

    let config = test_config();
    let fetcher = LightFetcher::new(&config, SiteClassifier::default()).expect("创建失败");

    let origin = format!("{}/article", base);
    let outcome = fetcher.fetch(&origin).await;

    assert!(outcome.succeeded);
    assert!(outcome.html.as_deref().expect("应有 HTML").contains("完整正文"));
    // 恰好追一跳：访问链 = [原始, 跳转目标]
    assert_eq!(outcome.source_chain.len(), 2);
    assert_eq!(outcome.source_chain[0], origin);
    assert_eq!(outcome.final_url, format!("{}/full", base));
    assert_eq!(outcome.source_chain.last().unwrap(), &outcome.final_url);
}

#[tokio::test]
async fn test_light_fetch_plain_page_has_single_chain_entry() {
    let page = "<html><body><article><p>没有外跳按钮的普通文章。</p></article></body></html>"
        .to_string();
    let base = spawn_site(vec![("/plain", page)]).await;

    let config = test_config();
    let fetcher = LightFetcher::new(&config, SiteClassifier::default()).expect("创建失败");

    let origin = format!("{}/plain", base);
    let outcome = fetcher.fetch(&origin).await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.source_chain, vec![origin]);
}

#[tokio::test]
#[ignore]
async fn test_light_fetch_real_page() {
    let config = test_config();
    let fetcher = LightFetcher::new(&config, SiteClassifier::default()).expect("创建失败");

    let outcome = fetcher.fetch("https://example.com/").await;
    println!("策略: {:?}, 成功: {}", outcome.strategy_used, outcome.succeeded);
    assert_eq!(outcome.strategy_used, FetchStrategy::Light);
    assert!(outcome.has_usable_html());
}

#[tokio::test]
#[ignore]
async fn test_browser_fetch_real_page() {
    let config = test_config();
    let fetcher = BrowserFetcher::new(&config, SiteClassifier::default());

    let outcome = fetcher
        .fetch("https://example.com/", Duration::from_secs(10))
        .await;
    println!("最终URL: {}, 失败: {:?}", outcome.final_url, outcome.failure);
    assert_eq!(outcome.strategy_used, FetchStrategy::Browser);
    assert!(outcome.has_usable_html());
    assert_eq!(outcome.source_chain.last().unwrap(), &outcome.final_url);
}

#[tokio::test]
#[ignore]
async fn test_acquire_yahoo_article_end_to_end() {
    let config = test_config();
    let orchestrator = FetchOrchestrator::new(&config).expect("创建失败");

    // 需要换成当前有效的文章 URL
    let request = FetchRequest::new(
        "https://finance.yahoo.com/news/apple-earnings.html",
        true,
        Duration::from_secs(10),
    );
    let (outcome, document) = orchestrator.acquire(&request).await;
    println!("访问链: {:?}", outcome.source_chain);
    if let Some(document) = document {
        println!("标题: {}", document.title);
        println!("正文长度: {}", document.body_text.chars().count());
        assert!(!document.body_text.is_empty());
    }
}

#[tokio::test]
#[ignore]
async fn test_company_news_list() {
    let config = Config::from_env();
    assert!(!config.finnhub_api_key.is_empty(), "需要设置 FINNHUB_API_KEY");

    let client = NewsClient::new(&config).expect("创建失败");
    let items = client.company_news("AAPL", None, None).await.expect("拉取失败");
    println!("拿到 {} 条新闻", items.len());
    for item in items.iter().take(3) {
        println!("- [{}] {}", item.published_at(), item.headline);
        assert!(!item.url.is_empty());
    }
}
