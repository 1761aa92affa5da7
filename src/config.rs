/// 程序配置
///
/// 所有配置项均可通过环境变量覆盖，未设置时使用默认值
#[derive(Clone, Debug)]
pub struct Config {
    // --- 新闻元数据 ---
    /// 公司股票代码
    pub symbol: String,
    /// 起始日期 (YYYY-MM-DD)，未设置时为 7 天前
    pub from_date: Option<String>,
    /// 结束日期 (YYYY-MM-DD)，未设置时为今天
    pub to_date: Option<String>,
    /// 市场新闻类别（设置后抓市场新闻而非公司新闻，如 general / forex / crypto / merger）
    pub news_category: Option<String>,
    // --- 抓取策略 ---
    /// 是否允许升级到浏览器抓取
    pub allow_browser_escalation: bool,
    /// 浏览器单步操作超时（毫秒）
    pub render_timeout_ms: u64,
    /// 轻量 HTTP 抓取超时（毫秒）
    pub light_timeout_ms: u64,
    /// 交互后等待页面静默的超时（毫秒）
    pub quiesce_timeout_ms: u64,
    /// press & hold 按住时长（秒）
    pub press_hold_dwell_secs: u64,
    /// 滑块验证最大尝试次数
    pub max_slider_attempts: usize,
    /// 每种 load-more 按钮最多点击次数
    pub max_clicks_per_pattern: usize,
    /// 是否使用无头模式
    pub headless: bool,
    /// 浏览器可执行文件路径（未设置时由 chromiumoxide 自动探测）
    pub browser_executable: Option<String>,
    /// 额外的跳过站点（逗号分隔，叠加在内置清单之上）
    pub extra_skip_domains: Vec<String>,
    // --- 并发与输出 ---
    /// 同时抓取的文章数量
    pub max_concurrent_fetches: usize,
    /// 文章保存目录
    pub output_dir: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 新闻 API ---
    pub finnhub_api_base_url: String,
    pub finnhub_api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol: "AAPL".to_string(),
            from_date: None,
            to_date: None,
            news_category: None,
            allow_browser_escalation: true,
            render_timeout_ms: 5_000,
            light_timeout_ms: 15_000,
            quiesce_timeout_ms: 5_000,
            press_hold_dwell_secs: 8,
            max_slider_attempts: 3,
            max_clicks_per_pattern: 2,
            headless: true,
            browser_executable: None,
            extra_skip_domains: Vec::new(),
            max_concurrent_fetches: 4,
            output_dir: "downloaded_articles".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
            finnhub_api_base_url: "https://finnhub.io/api/v1".to_string(),
            finnhub_api_key: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            symbol: std::env::var("SYMBOL").unwrap_or(default.symbol),
            from_date: std::env::var("FROM_DATE").ok(),
            to_date: std::env::var("TO_DATE").ok(),
            news_category: std::env::var("NEWS_CATEGORY").ok(),
            allow_browser_escalation: std::env::var("ALLOW_BROWSER_ESCALATION").ok().and_then(|v| v.parse().ok()).unwrap_or(default.allow_browser_escalation),
            render_timeout_ms: std::env::var("RENDER_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.render_timeout_ms),
            light_timeout_ms: std::env::var("LIGHT_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.light_timeout_ms),
            quiesce_timeout_ms: std::env::var("QUIESCE_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.quiesce_timeout_ms),
            press_hold_dwell_secs: std::env::var("PRESS_HOLD_DWELL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.press_hold_dwell_secs),
            max_slider_attempts: std::env::var("MAX_SLIDER_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_slider_attempts),
            max_clicks_per_pattern: std::env::var("MAX_CLICKS_PER_PATTERN").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_clicks_per_pattern),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            browser_executable: std::env::var("BROWSER_EXECUTABLE").ok(),
            extra_skip_domains: std::env::var("SKIP_DOMAINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
                .unwrap_or(default.extra_skip_domains),
            max_concurrent_fetches: std::env::var("MAX_CONCURRENT_FETCHES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_fetches),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            finnhub_api_base_url: std::env::var("FINNHUB_API_BASE_URL").unwrap_or(default.finnhub_api_base_url),
            finnhub_api_key: std::env::var("FINNHUB_API_KEY").unwrap_or(default.finnhub_api_key),
        }
    }

    /// 计算实际生效的无头模式
    ///
    /// 请求有头模式但没有 X server 时自动回退到无头模式
    pub fn effective_headless(&self) -> bool {
        if !self.headless && std::env::var("DISPLAY").is_err() {
            tracing::warn!("⚠️ 请求了有头模式，但未检测到 X server，自动切换到无头模式");
            return true;
        }
        self.headless
    }

    /// 浏览器阶段的总预算：render_timeout × 2 + 手势与静默等待的固定上界
    ///
    /// 保证单个请求不会无限阻塞 worker
    pub fn browser_budget(&self) -> std::time::Duration {
        let gesture_bound = self.press_hold_dwell_secs * 2
            + self.max_slider_attempts as u64 * 5
            + self.quiesce_timeout_ms / 1_000 * 6
            + 15;
        std::time::Duration::from_millis(self.render_timeout_ms * 2)
            + std::time::Duration::from_secs(gesture_bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.allow_browser_escalation);
        assert_eq!(config.render_timeout_ms, 5_000);
        assert_eq!(config.max_slider_attempts, 3);
        assert_eq!(config.press_hold_dwell_secs, 8);
        assert!(config.headless);
    }

    #[test]
    fn test_browser_budget_is_bounded() {
        let config = Config::default();
        // 预算必须覆盖两次导航 + 两次按住 + 滑块重试，同时有限
        let budget = config.browser_budget();
        assert!(budget >= std::time::Duration::from_secs(30));
        assert!(budget <= std::time::Duration::from_secs(300));
    }
}
