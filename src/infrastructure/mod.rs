//! 基础设施层
//!
//! 持有稀缺资源（Page），只向上暴露能力，不认识业务概念

pub mod dom_probe;

pub use dom_probe::{DomProbe, ElementHit};
