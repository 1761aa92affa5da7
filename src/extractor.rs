//! 正文提取器
//!
//! 基于 readability 主内容启发式（文本密度 / 链接密度 / 标签打分）
//! 定位文章子树，再做空白归一化。纯转换：相同输入必然得到相同输出，
//! 不依赖网络和浏览器

use anyhow::Result;
use url::Url;

use crate::models::FetchOutcome;

/// 提取结果为空时的最短正文长度
const MIN_BODY_CHARS: usize = 1;

/// 正文提取器
#[derive(Debug, Clone, Default)]
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 从 HTML 中提取 (标题, 归一化正文)
    ///
    /// `base_url` 用于解析相对链接；无法解析时退化为固定占位 URL，
    /// 以保持确定性
    pub fn extract(&self, html: &str, base_url: &str) -> Result<(String, String)> {
        let url = Url::parse(base_url)
            .or_else(|_| Url::parse("https://example.com"))
            .map_err(|e| anyhow::anyhow!("无法构造基准 URL: {e}"))?;

        let product = readability::extractor::extract(&mut html.as_bytes(), &url)
            .map_err(|e| anyhow::anyhow!("正文提取失败: {e}"))?;

        let body = normalize_text(&product.text);
        Ok((product.title, body))
    }

    /// 从抓取结果中提取正文
    ///
    /// HTML 缺席或正文为空时返回 None
    pub fn extract_from_outcome(&self, outcome: &FetchOutcome) -> Option<(String, String)> {
        let html = outcome.html.as_ref()?;
        match self.extract(html, &outcome.final_url) {
            Ok((title, body)) if body.chars().count() >= MIN_BODY_CHARS => Some((title, body)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("正文提取失败 ({}): {}", outcome.final_url, e);
                None
            }
        }
    }
}

/// 空白归一化
///
/// 逐行修剪，按双空格切块，丢弃空块后以换行重组
pub fn normalize_text(raw: &str) -> String {
    let lines = raw.lines().map(str::trim);
    let chunks = lines.flat_map(|line| line.split("  ").map(str::trim));
    chunks
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"<html>
        <head><title>测试文章标题</title></head>
        <body>
            <nav><a href="/a">首页</a><a href="/b">财经</a><a href="/c">科技</a></nav>
            <article>
                <h1>测试文章标题</h1>
                <p>这是正文的第一段，长度必须足够让主内容启发式把它当作文章主体。
                市场在周三出现了明显的波动，分析师们对此给出了不同的解读。</p>
                <p>这是第二段。多数机构认为短期波动不改变长期趋势，
                但也有声音提醒投资者注意流动性风险。</p>
            </article>
            <footer>版权所有</footer>
        </body>
    </html>"#;

    #[test]
    fn test_extract_is_idempotent() {
        let extractor = ContentExtractor::new();
        let first = extractor
            .extract(SAMPLE_HTML, "https://news.example.com/a")
            .expect("提取失败");
        let second = extractor
            .extract(SAMPLE_HTML, "https://news.example.com/a")
            .expect("提取失败");
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_finds_body_text() {
        let extractor = ContentExtractor::new();
        let (_, body) = extractor
            .extract(SAMPLE_HTML, "https://news.example.com/a")
            .expect("提取失败");
        assert!(body.contains("第一段"));
    }

    #[test]
    fn test_normalize_collapses_blank_lines() {
        let raw = "  第一行  \n\n\n   第二行\n \n第三行  带  双空格";
        let normalized = normalize_text(raw);
        assert_eq!(normalized, "第一行\n第二行\n第三行\n带\n双空格");
    }

    #[test]
    fn test_normalize_empty_input() {
        assert_eq!(normalize_text("   \n  \n"), "");
    }
}
