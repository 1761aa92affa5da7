//! 滑块验证破解
//!
//! Locate（滑柄 + 目标位）→ Drag（分步带抖动的拖动）→ Verify。
//! 目标位定位顺序：明确的目标元素 → 轨道容器宽度的 85% →
//! 视口宽度的 30%（容器也找不到时的保底）

use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::infrastructure::DomProbe;
use crate::selectors::{
    CHALLENGE_CONTINUE_PATTERNS, SLIDER_CONTAINER_PATTERNS, SLIDER_HANDLE_PATTERNS,
    SLIDER_TARGET_PATTERNS, SLIDER_VERIFY_TERMS,
};

/// 拖动路径的步数
const DRAG_STEPS: usize = 10;
/// 沿轨道拖动到容器宽度的比例
const TRACK_FRACTION: f64 = 0.85;
/// 容器也定位不到时，按视口宽度的比例估算拖动距离
const VIEWPORT_FRACTION: f64 = 0.3;
/// 两次尝试之间的退避
const ATTEMPT_BACKOFF: Duration = Duration::from_secs(1);

/// 执行滑块破解，最多尝试 `max_attempts` 次，返回验证是否通过
pub async fn run(probe: &DomProbe, max_attempts: usize, quiesce: Duration) -> Result<bool> {
    let url_before = probe.current_url("").await;

    for attempt in 1..=max_attempts {
        debug!("滑块尝试 {}/{}", attempt, max_attempts);

        let Some((start_x, start_y)) = locate_handle(probe).await? else {
            warn!("未定位到滑柄，放弃滑块破解");
            return Ok(false);
        };
        let end_x = locate_target_x(probe, start_x).await?;

        drag(probe, start_x, start_y, end_x).await?;
        probe.wait_for_quiescence(quiesce).await;

        if verify(probe, &url_before).await? {
            return Ok(true);
        }
        if attempt < max_attempts {
            sleep(ATTEMPT_BACKOFF).await;
        }
    }
    Ok(false)
}

/// 定位滑柄中心坐标
async fn locate_handle(probe: &DomProbe) -> Result<Option<(f64, f64)>> {
    Ok(probe
        .first_match(SLIDER_HANDLE_PATTERNS)
        .await?
        .map(|hit| (hit.x, hit.y)))
}

/// 计算拖动终点的横坐标
async fn locate_target_x(probe: &DomProbe, start_x: f64) -> Result<f64> {
    if let Some(target) = probe.first_match(SLIDER_TARGET_PATTERNS).await? {
        debug!("按目标元素定位拖动终点: x={:.0}", target.x);
        return Ok(target.x);
    }
    if let Some(track) = probe.first_match(SLIDER_CONTAINER_PATTERNS).await? {
        let track_left = track.x - track.width / 2.0;
        let end_x = track_left + track.width * TRACK_FRACTION;
        debug!("按轨道宽度定位拖动终点: x={:.0}", end_x);
        return Ok(end_x);
    }
    let (viewport_w, _) = probe
        .eval_as::<(f64, f64)>("[window.innerWidth, window.innerHeight]")
        .await?;
    let end_x = start_x + viewport_w * VIEWPORT_FRACTION;
    debug!("轨道未定位到，按视口宽度估算拖动终点: x={:.0}", end_x);
    Ok(end_x)
}

/// 分步拖动：按下后沿规划路径移动，每步之间随机停顿 10~50ms
async fn drag(probe: &DomProbe, start_x: f64, start_y: f64, end_x: f64) -> Result<()> {
    let path = plan_drag_path(start_x, start_y, end_x, DRAG_STEPS, &mut rand::thread_rng());

    probe.mouse_move(start_x, start_y).await?;
    probe.mouse_down(start_x, start_y).await?;
    for (x, y) in path {
        probe.mouse_move(x, y).await?;
        let pause_ms = rand::thread_rng().gen_range(10..=50);
        sleep(Duration::from_millis(pause_ms)).await;
    }
    sleep(Duration::from_millis(100)).await;
    probe.mouse_up(end_x, start_y).await?;
    Ok(())
}

/// 规划拖动路径：等分步长叠加 ±2px 抖动，末点精确落在终点
pub fn plan_drag_path(
    start_x: f64,
    start_y: f64,
    end_x: f64,
    steps: usize,
    rng: &mut impl Rng,
) -> Vec<(f64, f64)> {
    let step = (end_x - start_x) / steps as f64;
    let mut path = Vec::with_capacity(steps);
    for i in 1..steps {
        let jitter_x: f64 = rng.gen_range(-2.0..=2.0);
        let jitter_y: f64 = rng.gen_range(-2.0..=2.0);
        path.push((start_x + step * i as f64 + jitter_x, start_y + jitter_y));
    }
    path.push((end_x, start_y));
    path
}

/// 验证是否通过：标记词消失、URL 变化、或出现可点的 Continue 类按钮
async fn verify(probe: &DomProbe, url_before: &str) -> Result<bool> {
    let text = probe.page_text_lower().await?;
    let markers_gone = !SLIDER_VERIFY_TERMS.iter().any(|term| text.contains(term));
    if markers_gone {
        return Ok(true);
    }

    let url_now = probe.current_url(url_before).await;
    if !url_before.is_empty() && url_now != url_before {
        info!("滑块后 URL 已变化，视为通过");
        return Ok(true);
    }

    if probe.click_first(CHALLENGE_CONTINUE_PATTERNS).await? {
        info!("点击验证后的 Continue 按钮");
        sleep(Duration::from_millis(500)).await;
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_drag_path_ends_exactly_at_target() {
        let mut rng = StdRng::seed_from_u64(7);
        let path = plan_drag_path(100.0, 400.0, 500.0, 10, &mut rng);
        assert_eq!(path.len(), 10);
        assert_eq!(*path.last().unwrap(), (500.0, 400.0));
    }

    #[test]
    fn test_drag_path_is_monotonic_within_jitter() {
        let mut rng = StdRng::seed_from_u64(42);
        let path = plan_drag_path(0.0, 300.0, 400.0, 10, &mut rng);
        // 步长 40px，抖动 ±2px，相邻点仍应单调右移
        for pair in path.windows(2) {
            assert!(pair[1].0 > pair[0].0);
        }
        // 纵向只在起始高度附近抖动
        for (_, y) in &path {
            assert!((y - 300.0).abs() <= 2.0);
        }
    }

    #[test]
    fn test_drag_path_handles_leftward_target() {
        let mut rng = StdRng::seed_from_u64(1);
        let path = plan_drag_path(500.0, 200.0, 100.0, 10, &mut rng);
        assert_eq!(*path.last().unwrap(), (100.0, 200.0));
    }
}
