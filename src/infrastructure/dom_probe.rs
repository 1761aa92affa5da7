//! DOM 探针 - 基础设施层
//!
//! 持有唯一的 page 资源，向上暴露能力：
//! - 执行 JS 并取回 JSON
//! - 在优先级模式表中找第一个可见命中（共享的 first-match 能力）
//! - JS 点击 / 滚动
//! - CDP 原生鼠标事件（手势模拟用，JS click 无法表达按住和拖动）
//! - 有界的页面静默等待
//!
//! 不认识文章 / 验证码 / 抓取策略，不处理业务流程

use std::time::Duration;

use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::selectors::Pattern;

/// 页面元素命中信息（中心坐标 + 几何 + 属性）
#[derive(Debug, Clone, Deserialize)]
pub struct ElementHit {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub href: Option<String>,
    #[serde(default)]
    pub text: String,
}

/// DOM 探针
pub struct DomProbe {
    page: Page,
}

impl DomProbe {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 当前页面完整 HTML
    pub async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    /// 当前页面文本（小写，用于验证标记扫描）
    pub async fn page_text_lower(&self) -> Result<String> {
        Ok(self.content().await?.to_lowercase())
    }

    /// 当前 URL；取不到时退回 `fallback`
    pub async fn current_url(&self, fallback: &str) -> String {
        self.page
            .url()
            .await
            .unwrap_or_default()
            .map(|u| u.to_string())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// 在优先级模式表中查找第一个可见命中
    ///
    /// 表序即优先级：先命中的模式赢
    pub async fn first_match(&self, patterns: &[Pattern]) -> Result<Option<ElementHit>> {
        let patterns_json = serde_json::to_string(patterns)?;
        let js = format!(
            r#"
            (() => {{
                const patterns = {patterns_json};
                const visible = (el) => {{
                    const rect = el.getBoundingClientRect();
                    if (rect.width <= 0 || rect.height <= 0) return false;
                    const style = window.getComputedStyle(el);
                    return style.visibility !== 'hidden' && style.display !== 'none';
                }};
                const hit = (el) => {{
                    const rect = el.getBoundingClientRect();
                    return {{
                        x: rect.x + rect.width / 2,
                        y: rect.y + rect.height / 2,
                        width: rect.width,
                        height: rect.height,
                        href: el.getAttribute ? el.getAttribute('href') : null,
                        text: (el.textContent || '').trim().slice(0, 200)
                    }};
                }};
                for (const p of patterns) {{
                    try {{
                        if (p.kind === 'css') {{
                            for (const el of document.querySelectorAll(p.value)) {{
                                if (visible(el)) return hit(el);
                            }}
                        }} else if (p.kind === 'anytext') {{
                            // 不限元素类型，取包含文本的最深可见元素
                            const needle = p.value.toLowerCase();
                            for (const el of document.querySelectorAll('body *')) {{
                                if (!visible(el)) continue;
                                if (!(el.textContent || '').toLowerCase().includes(needle)) continue;
                                let deepest = true;
                                for (const child of el.children) {{
                                    if ((child.textContent || '').toLowerCase().includes(needle)) {{
                                        deepest = false;
                                        break;
                                    }}
                                }}
                                if (deepest) return hit(el);
                            }}
                        }} else {{
                            const needle = p.value.toLowerCase();
                            for (const el of document.querySelectorAll('a, button, [role="button"]')) {{
                                if (visible(el) && (el.textContent || '').toLowerCase().includes(needle)) {{
                                    return hit(el);
                                }}
                            }}
                        }}
                    }} catch (e) {{ /* 非法选择器直接尝试下一个 */ }}
                }}
                return null;
            }})()
            "#
        );
        self.eval_as(js).await
    }

    /// 点击优先级表中的第一个可见命中（JS click）
    ///
    /// 返回是否点到了元素
    pub async fn click_first(&self, patterns: &[Pattern]) -> Result<bool> {
        let patterns_json = serde_json::to_string(patterns)?;
        let js = format!(
            r#"
            (() => {{
                const patterns = {patterns_json};
                const visible = (el) => {{
                    const rect = el.getBoundingClientRect();
                    if (rect.width <= 0 || rect.height <= 0) return false;
                    const style = window.getComputedStyle(el);
                    return style.visibility !== 'hidden' && style.display !== 'none';
                }};
                for (const p of patterns) {{
                    try {{
                        let candidates = [];
                        if (p.kind === 'css') {{
                            candidates = document.querySelectorAll(p.value);
                        }} else {{
                            const needle = p.value.toLowerCase();
                            candidates = Array.from(
                                document.querySelectorAll('a, button, [role="button"]')
                            ).filter(el => (el.textContent || '').toLowerCase().includes(needle));
                        }}
                        for (const el of candidates) {{
                            if (visible(el)) {{
                                el.scrollIntoView({{ block: 'center' }});
                                el.click();
                                return true;
                            }}
                        }}
                    }} catch (e) {{}}
                }}
                return false;
            }})()
            "#
        );
        self.eval_as(js).await
    }

    /// 视口中心坐标
    pub async fn viewport_center(&self) -> Result<(f64, f64)> {
        let center: (f64, f64) = self
            .eval_as("[window.innerWidth / 2, window.innerHeight / 2]")
            .await?;
        Ok(center)
    }

    /// 滚动到指定纵向位置
    pub async fn scroll_to(&self, y: i64) -> Result<()> {
        self.eval(format!("window.scrollTo(0, {y})")).await?;
        Ok(())
    }

    /// 等待页面静默（有界，超时不视为错误）
    ///
    /// 以 readyState 轮询近似网络静默，到达 complete 后再短暂等 DOM 安定
    pub async fn wait_for_quiescence(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let state: String = self
                .eval_as("document.readyState")
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            if state == "complete" {
                sleep(Duration::from_millis(500)).await;
                return true;
            }
            if Instant::now() >= deadline {
                debug!("等待页面静默超时（{:?}），继续执行", timeout);
                return false;
            }
            sleep(Duration::from_millis(250)).await;
        }
    }

    // ========== CDP 原生鼠标事件 ==========

    /// 移动鼠标到指定坐标
    pub async fn mouse_move(&self, x: f64, y: f64) -> Result<()> {
        self.dispatch_mouse(DispatchMouseEventType::MouseMoved, x, y)
            .await
    }

    /// 在指定坐标按下左键
    pub async fn mouse_down(&self, x: f64, y: f64) -> Result<()> {
        self.dispatch_mouse(DispatchMouseEventType::MousePressed, x, y)
            .await
    }

    /// 在指定坐标释放左键
    pub async fn mouse_up(&self, x: f64, y: f64) -> Result<()> {
        self.dispatch_mouse(DispatchMouseEventType::MouseReleased, x, y)
            .await
    }

    async fn dispatch_mouse(&self, kind: DispatchMouseEventType, x: f64, y: f64) -> Result<()> {
        let params = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(|e| anyhow::anyhow!("构造鼠标事件失败: {e}"))?;
        self.page.execute(params).await?;
        Ok(())
    }
}
