//! 站点分类器
//!
//! 纯函数：把 URL 映射为"跳过付费站点 / 继续抓取"的判定。
//! 必须在任何网络访问之前调用一次，并且在抓取过程中每次观察到
//! URL 变化（HTTP 重定向、页内跳转、验证后跳转）后再调用一次

use crate::models::SiteVerdict;

/// 内置的付费 / 需登录站点清单（子串匹配）
pub const DEFAULT_SKIP_DOMAINS: &[&str] = &[
    "seekingalpha.com",
    "wsj.com",
    "barrons.com",
    "ft.com",
    "fool.com/premium",
    "morningstar.com/insights/",
    "investors.com/premium",
    "marketwatch.com",
];

/// 付费站点的展示名称（落盘提示文件用）
static SITE_NAMES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "seekingalpha.com" => "SeekingAlpha",
    "wsj.com" => "Wall Street Journal",
    "barrons.com" => "Barron's",
    "ft.com" => "Financial Times",
    "fool.com/premium" => "Motley Fool Premium",
    "morningstar.com/insights/" => "Morningstar Insights",
    "investors.com/premium" => "Investor's Business Daily",
    "marketwatch.com" => "MarketWatch",
};

/// 站点分类器
///
/// 持有只读的跳过清单，可在并发任务间安全共享
#[derive(Debug, Clone)]
pub struct SiteClassifier {
    skip_domains: Vec<String>,
}

impl SiteClassifier {
    /// 使用内置清单 + 额外清单创建分类器
    pub fn new(extra_domains: &[String]) -> Self {
        let mut skip_domains: Vec<String> =
            DEFAULT_SKIP_DOMAINS.iter().map(|s| s.to_string()).collect();
        skip_domains.extend(extra_domains.iter().cloned());
        Self { skip_domains }
    }

    /// 判定 URL（无副作用，幂等）
    pub fn classify(&self, url: &str) -> SiteVerdict {
        for domain in &self.skip_domains {
            if url.contains(domain.as_str()) {
                return SiteVerdict::SkipPaywalled {
                    domain: domain.clone(),
                };
            }
        }
        SiteVerdict::Proceed
    }

    /// 是否命中跳过清单
    pub fn is_skip(&self, url: &str) -> bool {
        self.classify(url).is_skip()
    }

    /// 命中域名的展示名称
    pub fn display_name(domain: &str) -> &str {
        SITE_NAMES.get(domain).copied().unwrap_or(domain)
    }
}

impl Default for SiteClassifier {
    fn default() -> Self {
        Self::new(&[])
    }
}
