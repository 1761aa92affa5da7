//! 文章落盘服务
//!
//! 负责把抓取结果写成 news{N}.txt：成功时写全文，跳过 / 失败时
//! 写提示文件（文件编号与新闻列表顺序一致，缺号说明该条没拿到）。
//! 另维护一个运行日志文件，记录每条的处理结论

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::classifier::SiteClassifier;
use crate::error::FailureKind;
use crate::models::{ArticleDocument, FetchOutcome, NewsItem, SiteVerdict};

/// 文章落盘服务
pub struct ArticleSink {
    dir: PathBuf,
    log_file: PathBuf,
    classifier: SiteClassifier,
}

impl ArticleSink {
    /// 创建输出目录（`output_dir/run_label/`）并初始化运行日志
    pub async fn create(
        output_dir: &str,
        run_label: &str,
        log_file: &str,
        classifier: SiteClassifier,
    ) -> Result<Self> {
        let dir = Path::new(output_dir).join(run_label);
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("创建输出目录失败: {}", dir.display()))?;
        info!("📁 输出目录: {}", dir.display());

        let sink = Self {
            dir: dir.clone(),
            log_file: dir.join(log_file),
            classifier,
        };
        sink.write_log_header().await?;
        Ok(sink)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn article_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("news{}.txt", index))
    }

    /// 写成功抓到的文章
    pub async fn write_article(
        &self,
        index: usize,
        item: &NewsItem,
        outcome: &FetchOutcome,
        document: &ArticleDocument,
    ) -> Result<PathBuf> {
        let path = self.article_path(index);
        let record = render_article(item, outcome, document);
        fs::write(&path, record)
            .await
            .with_context(|| format!("写文章文件失败: {}", path.display()))?;
        debug!("📤 已写入: {}", path.display());
        Ok(path)
    }

    /// 写跳过 / 失败提示文件
    pub async fn write_notice(
        &self,
        index: usize,
        item: &NewsItem,
        outcome: &FetchOutcome,
    ) -> Result<PathBuf> {
        let path = self.article_path(index);
        let record = render_notice(item, outcome, &self.classifier);
        fs::write(&path, record)
            .await
            .with_context(|| format!("写提示文件失败: {}", path.display()))?;
        Ok(path)
    }

    async fn write_log_header(&self) -> Result<()> {
        let header = format!(
            "===== 抓取运行日志 =====\n开始时间: {}\n\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        fs::write(&self.log_file, header)
            .await
            .with_context(|| format!("初始化运行日志失败: {}", self.log_file.display()))?;
        Ok(())
    }

    /// 追加一行运行日志
    pub async fn append_log(&self, line: &str) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&self.log_file)
            .await
            .with_context(|| format!("打开运行日志失败: {}", self.log_file.display()))?;
        file.write_all(format!("{}\n", line).as_bytes())
            .await
            .context("写运行日志失败")?;
        Ok(())
    }
}

/// 渲染成功文章的落盘内容
pub fn render_article(item: &NewsItem, outcome: &FetchOutcome, document: &ArticleDocument) -> String {
    let mut record = String::new();
    record.push_str(&format!("标题: {}\n", pick_title(item, document)));
    record.push_str(&format!("来源: {}\n", item.source));
    record.push_str(&format!("发布时间: {}\n", item.published_at()));
    record.push_str(&format!("原始URL: {}\n", outcome.original_url));
    record.push_str(&format!("最终URL: {}\n", outcome.final_url));
    if outcome.source_chain.len() > 2 {
        record.push_str(&format!("访问链: {}\n", outcome.source_chain.join(" -> ")));
    }
    if outcome.failure == Some(FailureKind::ChallengeUnresolved) {
        record.push_str("提示: 页面存在未通过的反爬验证，正文可能不完整\n");
    }
    record.push('\n');
    record.push_str(&document.body_text);
    record.push('\n');
    record
}

/// 渲染跳过 / 失败提示文件的内容
pub fn render_notice(item: &NewsItem, outcome: &FetchOutcome, classifier: &SiteClassifier) -> String {
    let mut record = String::new();
    record.push_str(&format!("标题: {}\n", item.headline));
    record.push_str(&format!("原始URL: {}\n", outcome.original_url));
    if outcome.final_url != outcome.original_url {
        record.push_str(&format!("最终URL: {}\n", outcome.final_url));
    }
    record.push('\n');

    if outcome.is_skipped() {
        let site = match classifier.classify(&outcome.final_url) {
            SiteVerdict::SkipPaywalled { domain } => {
                SiteClassifier::display_name(&domain).to_string()
            }
            SiteVerdict::Proceed => "付费站点".to_string(),
        };
        record.push_str(&format!(
            "此文章来自 {}（付费/需登录站点），已按策略跳过，未抓取正文。\n",
            site
        ));
        return record;
    }

    let reason = match outcome.failure {
        Some(FailureKind::Network) => "网络请求失败",
        Some(FailureKind::ChallengeUnresolved) => "反爬验证未通过",
        Some(FailureKind::ExtractionEmpty) => "页面中提取不到正文",
        Some(FailureKind::SessionFault) => "浏览器会话异常",
        Some(FailureKind::SkipPolicy) | None => "未知原因",
    };
    record.push_str(&format!("抓取失败: {}。\n", reason));
    record
}

/// 标题优先取提取结果，提取不到标题时退回列表里的 headline
fn pick_title<'a>(item: &'a NewsItem, document: &'a ArticleDocument) -> &'a str {
    if document.title.trim().is_empty() {
        &item.headline
    } else {
        &document.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FetchStrategy;

    fn sample_item() -> NewsItem {
        NewsItem {
            url: "https://finance.yahoo.com/news/a.html".to_string(),
            headline: "列表标题".to_string(),
            source: "Yahoo".to_string(),
            datetime: 1_714_521_600,
            summary: String::new(),
        }
    }

    #[test]
    fn test_article_record_contains_chain_and_body() {
        let mut outcome = FetchOutcome::new("https://finance.yahoo.com/news/a.html", FetchStrategy::Browser);
        outcome.visit("https://finance.yahoo.com/m/uuid/a.html");
        outcome.visit("https://partner.example.com/full");
        let outcome = outcome.mark_succeeded("<html></html>".to_string());
        let document = ArticleDocument {
            title: "提取标题".to_string(),
            body_text: "正文第一段\n正文第二段".to_string(),
            source_chain: outcome.source_chain.clone(),
        };

        let record = render_article(&sample_item(), &outcome, &document);
        assert!(record.contains("标题: 提取标题"));
        assert!(record.contains("原始URL: https://finance.yahoo.com/news/a.html"));
        assert!(record.contains("最终URL: https://partner.example.com/full"));
        assert!(record.contains("访问链: "));
        assert!(record.ends_with("正文第一段\n正文第二段\n"));
    }

    #[test]
    fn test_article_record_falls_back_to_list_headline() {
        let outcome = FetchOutcome::new("https://a.example/x", FetchStrategy::Light)
            .mark_succeeded("<html></html>".to_string());
        let document = ArticleDocument {
            title: "  ".to_string(),
            body_text: "正文".to_string(),
            source_chain: outcome.source_chain.clone(),
        };
        let record = render_article(&sample_item(), &outcome, &document);
        assert!(record.contains("标题: 列表标题"));
    }

    #[test]
    fn test_unresolved_challenge_adds_completeness_note() {
        let mut outcome = FetchOutcome::new("https://a.example/x", FetchStrategy::Browser)
            .mark_succeeded("<html></html>".to_string());
        outcome.failure = Some(FailureKind::ChallengeUnresolved);
        let document = ArticleDocument {
            title: "t".to_string(),
            body_text: "部分正文".to_string(),
            source_chain: outcome.source_chain.clone(),
        };
        let record = render_article(&sample_item(), &outcome, &document);
        assert!(record.contains("正文可能不完整"));
    }

    #[test]
    fn test_skip_notice_names_the_site() {
        let outcome =
            FetchOutcome::new("https://www.wsj.com/articles/x", FetchStrategy::Light).mark_skipped();
        let record = render_notice(&sample_item(), &outcome, &SiteClassifier::default());
        assert!(record.contains("Wall Street Journal"));
        assert!(record.contains("已按策略跳过"));
    }

    #[test]
    fn test_failure_notice_names_the_reason() {
        let outcome = FetchOutcome::new("https://a.example/x", FetchStrategy::Browser)
            .mark_failed(FailureKind::Network);
        let record = render_notice(&sample_item(), &outcome, &SiteClassifier::default());
        assert!(record.contains("抓取失败: 网络请求失败"));
    }
}
