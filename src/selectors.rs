//! 选择器与 User-Agent 静态表
//!
//! 各站点的按钮形态以"优先级表"的形式建模为数据而不是分支逻辑：
//! 匹配时按表序取第一个可见命中（共享的 first-match 能力在
//! `infrastructure::DomProbe` 中实现）

use rand::seq::SliceRandom;
use serde::Serialize;

/// 页面元素匹配模式
///
/// - `Css`: 标准 CSS 选择器，直接 querySelector
/// - `Text`: 按可点击元素（a / button / [role=button]）的文本内容匹配，
///   对应 Playwright 的 `:has-text()` 写法
/// - `AnyText`: 不限元素类型的文本匹配，取包含该文本的最深元素，
///   对应 Playwright 的 `text=` 定位器；用于提示文案在普通
///   div / span 里的场景（如 press & hold 的提示条）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Pattern {
    Css(&'static str),
    Text(&'static str),
    AnyText(&'static str),
}

/// 常见桌面浏览器 User-Agent 池
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.7103.25 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36 Edg/134.0.0.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
];

/// 随机选取一个 User-Agent
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// 轻量抓取阶段扫描 "Continue Reading" 锚点用的 CSS 选择器
/// （不执行脚本，只认静态 HTML 中的 a 标签）
pub const LIGHT_CONTINUE_READING_SELECTORS: &[&str] = &[
    r#"a.secondary-btn-link.continue-reading-button[title="Continue Reading"]"#,
    r#"a[aria-label="Continue Reading"][title="Continue Reading"]"#,
    r#"a[title="Continue Reading"]"#,
    r#"a[title="Read More"]"#,
    r#"a.continue-reading-button"#,
];

/// "Story Continues" 就地展开按钮（点击后当前页面展开，不跳转）
pub const STORY_CONTINUES_PATTERNS: &[Pattern] = &[
    Pattern::Css(r#"button.readmore-button[title="Story Continues"]"#),
    Pattern::Css(r#"button[aria-label="Story Continues"]"#),
    Pattern::Css("button.secondary-btn.readmore-button"),
    Pattern::Css("button.readmore-button"),
    Pattern::Text("Story Continues"),
];

/// "Continue Reading" / "Read More" 跳转按钮（优先取 href 直接导航）
pub const CONTINUE_READING_PATTERNS: &[Pattern] = &[
    Pattern::Css(r#"a[title="Continue Reading"]"#),
    Pattern::Css(r#"button[title="Continue Reading"]"#),
    Pattern::Css(r#"a[aria-label="Continue Reading"][title="Continue Reading"]"#),
    Pattern::Css(r#"a.secondary-btn-link.continue-reading-button[title="Continue Reading"]"#),
    Pattern::Css(r#"a[title="Read More"]"#),
    Pattern::Css(r#"button[title="Read More"]"#),
    Pattern::Css(r#"a.continue-reading-button"#),
    Pattern::Css(r#"a[data-ylk*="partnercta"]"#),
    Pattern::Css("a.caas-button"),
    Pattern::Css("a.js-content-viewer"),
    Pattern::Text("Continue Reading"),
    Pattern::Text("Read More"),
];

/// 通用 "load more" 按钮表
pub const LOAD_MORE_PATTERNS: &[Pattern] = &[
    Pattern::Css(r#"[id*="show-more"]"#),
    Pattern::Css(r#"[class*="load-more"]"#),
    Pattern::Css(r#"[class*="show-more"]"#),
    Pattern::Css(r#"[data-testid*="load-more"]"#),
    Pattern::Text("Show more"),
    Pattern::Text("Load more"),
    Pattern::Text("Read more"),
    Pattern::Text("Continue reading"),
    Pattern::Css("a.more-link"),
];

/// 站点专属的 load-more 补充表：(域名子串, 额外模式)
///
/// 匹配命中的条目排在通用表之前
pub const SITE_LOAD_MORE_PATTERNS: &[(&str, &[Pattern])] = &[
    (
        "marketwatch.com",
        &[
            Pattern::Text("Agree and Continue"),
            Pattern::Text("Continue reading"),
        ],
    ),
    (
        "cnbc.com",
        &[
            Pattern::Css(r#"button[id*="accept"]"#),
            Pattern::Text("Accept All Cookies"),
        ],
    ),
    (
        "bloomberg.com",
        &[
            Pattern::Text("Accept cookies"),
            Pattern::Text("I Accept"),
        ],
    ),
    (
        "finance.yahoo.com",
        &[
            Pattern::Css("button.readmore-button"),
            Pattern::Css(r#"button[aria-label="Story Continues"]"#),
            Pattern::Css("a.continue-reading-button"),
            Pattern::Css(r#"a[aria-label="Continue Reading"]"#),
        ],
    ),
];

/// 汇总某个 URL 适用的 load-more 模式（站点专属在前，通用在后）
pub fn load_more_patterns_for(url: &str) -> Vec<Pattern> {
    let mut patterns = Vec::new();
    for (domain, site_patterns) in SITE_LOAD_MORE_PATTERNS {
        if url.contains(domain) {
            patterns.extend_from_slice(site_patterns);
        }
    }
    patterns.extend_from_slice(LOAD_MORE_PATTERNS);
    patterns
}

// ========== 反爬验证相关 ==========

/// press & hold 提示文本的精确定位串
pub const PRESS_HOLD_ANCHOR_TEXT: &str = "Press & Hold to confirm you are";

/// 滑块验证的提示词（页面文本中任一出现即判定存在滑块）
pub const SLIDER_MARKER_TERMS: &[&str] = &["slide to continue", "drag", "slider", "verify you are human"];

/// 滑动后用于复检的提示词（比检测词更收敛，"drag" 之类太泛）
pub const SLIDER_VERIFY_TERMS: &[&str] = &["slide to continue", "verify you are human", "captcha"];

/// 滑块手柄的候选选择器（按命中概率排序）
pub const SLIDER_HANDLE_PATTERNS: &[Pattern] = &[
    Pattern::Css(".captcha-slider"),
    Pattern::Css(".slider-button"),
    Pattern::Css(".slide-to-verify"),
    Pattern::Css(".verification-slider"),
    Pattern::Css(r#"[role="slider"]"#),
    Pattern::Css(".recaptcha-slider"),
    Pattern::Css(r#"div[class*="slider"]"#),
    Pattern::Css(r#"div[class*="captcha"] span"#),
    Pattern::Css(r#"div[class*="verify"] span"#),
];

/// 滑动终点区域的候选选择器
pub const SLIDER_TARGET_PATTERNS: &[Pattern] = &[
    Pattern::Css(".slider-target"),
    Pattern::Css(".captcha-target"),
    Pattern::Css(".target-zone"),
    Pattern::Css(r#"div[class*="target"]"#),
];

/// 滑轨容器的候选选择器（估算滑动距离用）
pub const SLIDER_CONTAINER_PATTERNS: &[Pattern] = &[
    Pattern::Css(r#"div[class*="captcha-container"]"#),
    Pattern::Css(r#"div[class*="slider-container"]"#),
    Pattern::Css(r#"div[class*="verification"]"#),
];

/// 验证通过后可能出现的"继续"按钮
pub const CHALLENGE_CONTINUE_PATTERNS: &[Pattern] = &[
    Pattern::Text("Continue"),
    Pattern::Text("Proceed"),
    Pattern::Text("Next"),
];
