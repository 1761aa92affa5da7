//! 错误类型
//!
//! 抓取过程中的失败分为五类，全部在组件边界被捕获并转换为
//! `FetchOutcome` 的字段，不会越过 `acquire` 向上传播

use thiserror::Error;

use crate::models::ChallengeKind;

/// 抓取错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 网络错误（超时、连接失败、HTTP 错误状态）
    #[error("网络请求失败 ({url}): {message}")]
    Network { url: String, message: String },

    /// 反爬验证未通过（非致命，降级为部分内容）
    #[error("反爬验证未通过: {kind:?}")]
    ChallengeUnresolved { kind: ChallengeKind },

    /// 命中跳过站点（主动放弃，不算错误）
    #[error("命中跳过站点: {domain}")]
    SkipPolicy { domain: String },

    /// 正文提取结果为空
    #[error("正文提取结果为空: {url}")]
    ExtractionEmpty { url: String },

    /// 浏览器会话异常（仅影响当前请求）
    #[error("浏览器会话异常: {0}")]
    Session(String),
}

impl FetchError {
    /// 映射到结果记录中的失败分类
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Network { .. } => FailureKind::Network,
            FetchError::ChallengeUnresolved { .. } => FailureKind::ChallengeUnresolved,
            FetchError::SkipPolicy { .. } => FailureKind::SkipPolicy,
            FetchError::ExtractionEmpty { .. } => FailureKind::ExtractionEmpty,
            FetchError::Session(_) => FailureKind::SessionFault,
        }
    }
}

/// 失败分类（记录在 FetchOutcome 中，供调用方区分"主动跳过"和"尝试后失败"）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 网络错误
    Network,
    /// 反爬验证未通过（内容可能不完整）
    ChallengeUnresolved,
    /// 命中跳过策略
    SkipPolicy,
    /// 提取不到正文
    ExtractionEmpty,
    /// 浏览器会话故障
    SessionFault,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network {
            url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            message: err.to_string(),
        }
    }
}

impl From<chromiumoxide::error::CdpError> for FetchError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        FetchError::Session(err.to_string())
    }
}
