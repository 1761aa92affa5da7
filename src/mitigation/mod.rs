//! 反爬验证缓解 - 状态机
//!
//! 每次页面加载后对渲染文本做标记扫描，判定验证类型并尝试破解：
//!
//! ```text
//! Idle -> Detect -> (None: Idle)
//!                 | (PressAndHold: Hold -> Verify -> {Resolved, Retry≤1 -> Hold, Failed})
//!                 | (SliderDrag:  Locate -> Drag -> Verify -> {Resolved, Retry≤N, Failed})
//! ```
//!
//! 所有结局都以"是否通过 + 终态"上报，绝不向上抛错——
//! 验证失败对调用方呈现为"未破解"，由它决定带着可能被拦截的
//! 页面继续，还是放弃本次抓取

pub mod press_hold;
pub mod slider;

use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::DomProbe;
use crate::models::ChallengeKind;
use crate::selectors::SLIDER_MARKER_TERMS;

/// 一次缓解尝试的终态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MitigationOutcome {
    /// 未检测到验证
    NotPresent,
    /// 验证已通过
    Resolved(ChallengeKind),
    /// 尝试后仍未通过（页面内容可能不完整）
    Unresolved(ChallengeKind),
}

impl MitigationOutcome {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, MitigationOutcome::Unresolved(_))
    }
}

/// 扫描页面文本（小写），判定验证类型
///
/// press & hold 的标记是 "press" 与 "hold" 共现；
/// 滑块验证的标记是 slide / drag / verify you are human 等提示词
pub fn detect(page_text_lower: &str) -> ChallengeKind {
    if page_text_lower.contains("press") && page_text_lower.contains("hold") {
        return ChallengeKind::PressAndHold;
    }
    if SLIDER_MARKER_TERMS
        .iter()
        .any(|term| page_text_lower.contains(term))
    {
        return ChallengeKind::SliderDrag;
    }
    ChallengeKind::None
}

/// 反爬验证缓解器
pub struct AntiBotMitigator {
    dwell: std::time::Duration,
    max_slider_attempts: usize,
    quiesce_timeout: std::time::Duration,
}

impl AntiBotMitigator {
    pub fn new(config: &Config) -> Self {
        Self {
            dwell: std::time::Duration::from_secs(config.press_hold_dwell_secs),
            max_slider_attempts: config.max_slider_attempts,
            quiesce_timeout: std::time::Duration::from_millis(config.quiesce_timeout_ms),
        }
    }

    /// 检测并尝试破解当前页面上的验证
    ///
    /// 内部错误（会话断开等）一律折算为 Unresolved，不向上抛
    pub async fn run(&self, probe: &DomProbe) -> MitigationOutcome {
        let page_text = match probe.page_text_lower().await {
            Ok(text) => text,
            Err(e) => {
                warn!("读取页面文本失败，跳过验证检测: {}", e);
                return MitigationOutcome::NotPresent;
            }
        };

        match detect(&page_text) {
            ChallengeKind::None => MitigationOutcome::NotPresent,
            ChallengeKind::PressAndHold => {
                info!("🤖 检测到 press & hold 反爬机制，尝试按住 {:?}...", self.dwell);
                match press_hold::run(probe, self.dwell, self.quiesce_timeout).await {
                    Ok(true) => {
                        info!("✓ press & hold 验证已通过");
                        MitigationOutcome::Resolved(ChallengeKind::PressAndHold)
                    }
                    Ok(false) => {
                        warn!("⚠️ press & hold 验证未通过，可能需要真实浏览器");
                        MitigationOutcome::Unresolved(ChallengeKind::PressAndHold)
                    }
                    Err(e) => {
                        warn!("⚠️ 处理 press & hold 时出错: {}", e);
                        MitigationOutcome::Unresolved(ChallengeKind::PressAndHold)
                    }
                }
            }
            ChallengeKind::SliderDrag => {
                info!("🤖 检测到滑块验证，最多尝试 {} 次...", self.max_slider_attempts);
                match slider::run(probe, self.max_slider_attempts, self.quiesce_timeout).await {
                    Ok(true) => {
                        info!("✓ 滑块验证已通过");
                        MitigationOutcome::Resolved(ChallengeKind::SliderDrag)
                    }
                    Ok(false) => {
                        warn!("⚠️ 滑块验证未通过");
                        MitigationOutcome::Unresolved(ChallengeKind::SliderDrag)
                    }
                    Err(e) => {
                        warn!("⚠️ 处理滑块验证时出错: {}", e);
                        MitigationOutcome::Unresolved(ChallengeKind::SliderDrag)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_press_and_hold() {
        let text = "please press & hold the button to confirm you are human";
        assert_eq!(detect(text), ChallengeKind::PressAndHold);
    }

    #[test]
    fn test_detect_none_after_resolution() {
        // 通过验证后的文章页不再含标记
        let text = "apple reported quarterly earnings that beat expectations";
        assert_eq!(detect(text), ChallengeKind::None);
    }

    #[test]
    fn test_detect_slider() {
        let text = "slide to continue to the article";
        assert_eq!(detect(text), ChallengeKind::SliderDrag);

        let text = "verify you are human by completing the action below";
        assert_eq!(detect(text), ChallengeKind::SliderDrag);
    }

    #[test]
    fn test_press_hold_wins_over_slider_markers() {
        // 两类标记共现时按住优先（共现条件更特异）
        let text = "press and hold, then drag if asked";
        assert_eq!(detect(text), ChallengeKind::PressAndHold);
    }
}
