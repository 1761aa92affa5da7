//! 工作流层
//!
//! 组合抓取器与提取器，编排"轻量优先、浏览器兜底"的获取流程

pub mod acquire;

pub use acquire::{should_escalate, FetchOrchestrator};
