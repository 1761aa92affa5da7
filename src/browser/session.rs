//! 浏览器会话
//!
//! 按请求启动独立的无头浏览器实例并导航到目标 URL。
//! `close()` 负责正常路径的释放；提前返回 / 超时取消时
//! Browser 的 Drop 会结束子进程，不会泄漏会话

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::selectors::random_user_agent;

/// 单个请求的浏览器会话
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// 启动浏览器并导航到 about:blank
    ///
    /// # 参数
    /// - `headless`: 是否无头模式（调用方已做过 X server 回退判断）
    /// - `executable`: 浏览器可执行文件路径，None 时自动探测
    pub async fn launch(headless: bool, executable: Option<&str>) -> Result<Self> {
        info!("🚀 启动浏览器会话 ({})", if headless { "无头模式" } else { "有头模式" });

        let mut builder = BrowserConfig::builder();
        builder = if headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        if let Some(path) = executable {
            builder = builder.chrome_executable(Path::new(path));
        }

        let config = builder
            .args(vec![
                "--disable-gpu",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--disable-extensions",
                "--disable-background-networking",
                "--window-size=1920,1080",
                "--remote-debugging-port=0",
            ])
            .arg(format!("--user-agent={}", random_user_agent()))
            .build()
            .map_err(|e| {
                error!("配置浏览器失败: {}", e);
                anyhow::anyhow!("配置浏览器失败: {}", e)
            })?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            error!("启动浏览器失败: {}", e);
            anyhow::anyhow!("启动浏览器失败: {}", e)
        })?;
        debug!("浏览器启动成功");

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        // 短暂等待浏览器状态同步
        sleep(Duration::from_millis(300)).await;

        let page = browser.new_page("about:blank").await.map_err(|e| {
            error!("创建页面失败: {}", e);
            anyhow::anyhow!("创建页面失败: {}", e)
        })?;

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 带超时导航，只等待 DOM 构建完成（不等全部网络静默）
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        debug!("正在导航到: {}", url);
        let nav = tokio::time::timeout(timeout, self.page.goto(url)).await;
        match nav {
            Ok(Ok(_)) => {
                // goto 返回即 DOM 可用；wait_for_navigation 失败不致命
                let _ = tokio::time::timeout(timeout, self.page.wait_for_navigation()).await;
                Ok(())
            }
            Ok(Err(e)) => anyhow::bail!("导航到 {} 失败: {}", url, e),
            Err(_) => anyhow::bail!("导航到 {} 超时 ({:?})", url, timeout),
        }
    }

    /// 关闭会话并等待事件处理任务退出
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("关闭浏览器时出错（忽略）: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        debug!("浏览器会话已释放");
    }
}
