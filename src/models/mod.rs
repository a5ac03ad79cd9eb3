//! 数据模型模块
//! 用户、Chirp、认证令牌与支付回调

pub mod auth;
pub mod chirp;
pub mod user;
pub mod webhook;
