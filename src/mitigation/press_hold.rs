//! press & hold 验证破解
//!
//! 定位按钮 → CDP 按下 → 保持 dwell 时长 → 释放 → 等页面静默 →
//! 重扫标记。首次失败时向右下偏移 20px 再试一次

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::infrastructure::DomProbe;
use crate::models::ChallengeKind;
use crate::selectors::{Pattern, PRESS_HOLD_ANCHOR_TEXT};

/// 重试时的坐标偏移（按钮定位可能偏到边缘，往内挪一点）
const RETRY_OFFSET_PX: f64 = 20.0;

/// 执行 press & hold 破解，返回验证是否通过
pub async fn run(probe: &DomProbe, dwell: Duration, quiesce: Duration) -> Result<bool> {
    let (x, y) = locate_button(probe).await?;

    hold_at(probe, x, y, dwell).await?;
    probe.wait_for_quiescence(quiesce).await;
    if is_resolved(probe).await? {
        return Ok(true);
    }

    // 再试一次：偏移后按住
    info!("首次按住未通过，偏移 {}px 重试...", RETRY_OFFSET_PX);
    hold_at(probe, x + RETRY_OFFSET_PX, y + RETRY_OFFSET_PX, dwell).await?;
    probe.wait_for_quiescence(quiesce).await;
    is_resolved(probe).await
}

/// 定位按住按钮：优先按提示文案找，找不到退回视口中心
///
/// 提示文案通常在普通 div 里而不是可点击元素里，必须用不限
/// 元素类型的文本匹配
async fn locate_button(probe: &DomProbe) -> Result<(f64, f64)> {
    let patterns = [Pattern::AnyText(PRESS_HOLD_ANCHOR_TEXT)];
    if let Some(hit) = probe.first_match(&patterns).await? {
        debug!("按文案定位到按住按钮: ({:.0}, {:.0})", hit.x, hit.y);
        return Ok((hit.x, hit.y));
    }
    let center = probe.viewport_center().await?;
    debug!("未定位到按住按钮，使用视口中心: ({:.0}, {:.0})", center.0, center.1);
    Ok(center)
}

/// 在指定坐标按下并保持
async fn hold_at(probe: &DomProbe, x: f64, y: f64, dwell: Duration) -> Result<()> {
    probe.mouse_move(x, y).await?;
    probe.mouse_down(x, y).await?;
    sleep(dwell).await;
    probe.mouse_up(x, y).await?;
    Ok(())
}

/// 重扫标记：页面文本中不再同时出现 press 与 hold 即视为通过
async fn is_resolved(probe: &DomProbe) -> Result<bool> {
    let text = probe.page_text_lower().await?;
    Ok(super::detect(&text) != ChallengeKind::PressAndHold)
}
