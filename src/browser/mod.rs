//! 浏览器层
//!
//! 每个请求独享一个浏览器会话（独立 cookie / 存储作用域），
//! 会话在所有退出路径上都会被释放

pub mod session;

pub use session::BrowserSession;
